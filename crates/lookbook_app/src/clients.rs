//! Blocking HTTP implementations of the vision and similar-item services.

use crate::config::AppConfig;
use lookbook_core::{
    AnnotateRequest, AnnotateResponse, Feature, ImageRef, LookbookError, RawAnnotations, Result,
    SimilarItem, SimilarItemSearch, VisionService,
};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LookbookError::network("could not build HTTP client", e))
}

/// Map a non-success answer onto a distinguishable error.
fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(LookbookError::Auth { reason: message })
        }
        _ => Err(LookbookError::Upstream {
            status: status.as_u16(),
            message,
        }),
    }
}

/// Pull `error.message` out of a JSON error body, falling back to the raw
/// text.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }
    match serde_json::from_str::<Envelope>(body) {
        Ok(env) => env.error.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Google Cloud Vision `images:annotate` client.
pub struct GoogleVisionClient {
    http: Client,
    endpoint: String,
    api_key: String,
    features: Vec<Feature>,
}

impl GoogleVisionClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| LookbookError::Auth {
            reason: format!(
                "no vision API key configured (set api_key or {})",
                crate::config::API_KEY_ENV
            ),
        })?;
        Ok(Self {
            http: http_client(config.timeout_secs)?,
            endpoint: config.vision_endpoint.clone(),
            api_key,
            features: config.features.clone(),
        })
    }
}

impl VisionService for GoogleVisionClient {
    fn annotate_image(&self, image: &ImageRef) -> Result<RawAnnotations> {
        let body = AnnotateRequest::new(image, &self.features)?;
        tracing::debug!(endpoint = %self.endpoint, features = self.features.len(), "annotate request");
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| LookbookError::network("vision request failed", e))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| LookbookError::network("could not read vision response", e))?;
        check_status(status, &text)?;
        let envelope: AnnotateResponse = serde_json::from_str(&text)
            .map_err(|e| LookbookError::malformed(format!("vision response: {e}")))?;
        envelope.into_first()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    image_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_query: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SimilarItem>,
}

/// JSON search endpoint answering `{ "results": [SimilarItem...] }`.
pub struct HttpSimilarSearch {
    http: Client,
    endpoint: String,
}

impl HttpSimilarSearch {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout_secs)?,
            endpoint: endpoint.into(),
        })
    }
}

impl SimilarItemSearch for HttpSimilarSearch {
    fn search_similar(&self, image: &ImageRef, query: Option<&str>) -> Result<Vec<SimilarItem>> {
        let ImageRef::Uri(uri) = image else {
            return Err(LookbookError::MissingImage {
                reason: "similar-item search needs an image URL".to_string(),
            });
        };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&SearchRequest {
                image_url: uri,
                search_query: query,
            })
            .send()
            .map_err(|e| LookbookError::network("search request failed", e))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| LookbookError::network("could not read search response", e))?;
        check_status(status, &text)?;
        let parsed: SearchResponse = serde_json::from_str(&text)
            .map_err(|e| LookbookError::malformed(format!("search response: {e}")))?;
        Ok(parsed.results)
    }
}
