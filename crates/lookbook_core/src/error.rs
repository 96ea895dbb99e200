//! Error types shared by the analysis pipeline and its collaborators.

use thiserror::Error;

/// Result type alias for lookbook operations
pub type Result<T> = std::result::Result<T, LookbookError>;

/// Failures surfaced by the glue around the insight classifier.
///
/// The classifier itself never fails; everything here originates from the
/// vision/search collaborators, the history file, or the caller's input.
#[derive(Error, Debug)]
pub enum LookbookError {
    /// Transport-level failure talking to an external service
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credentials were missing or rejected
    #[error("Authentication failed: {reason}")]
    Auth { reason: String },

    /// The service answered, but with an error
    #[error("Upstream service error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The service answered with something we could not interpret
    #[error("Malformed response: {reason}")]
    Malformed { reason: String },

    /// No image content or reference was supplied
    #[error("Missing image: {reason}")]
    MissingImage { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LookbookError {
    /// Create a network error with context
    pub fn network<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Whether a caller may reasonably try the same request again.
    ///
    /// Only transport failures and 5xx/429 upstream answers qualify. The core
    /// never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            LookbookError::Network { .. } => true,
            LookbookError::Upstream { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            LookbookError::Network { .. } => {
                "Could not reach the analysis service. Check your connection and try again."
                    .to_string()
            }
            LookbookError::Auth { .. } => {
                "The analysis service rejected our credentials. Check the configured API key."
                    .to_string()
            }
            LookbookError::Upstream { status, .. } => {
                format!("The analysis service reported an error (status {status}).")
            }
            LookbookError::MissingImage { .. } => {
                "No image was provided. Capture or upload a photo first.".to_string()
            }
            _ => "Image analysis failed. Please try with a different image.".to_string(),
        }
    }
}
