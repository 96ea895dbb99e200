//! Boundary with the external vision-annotation service.
//!
//! Holds the wire types of an `images:annotate` exchange, the tolerant raw
//! payload model, and [`normalize`], which maps any raw payload onto a
//! canonical [`VisionResult`] without failing.

use crate::color::Rgb;
use crate::error::{LookbookError, Result};
use crate::insight::generate_insights;
use crate::model::{AnalysisOutcome, ColorSample, DetectedObject, Label, VisionResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// What to annotate: a fetchable URI or inline image bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Uri(String),
    Content(Vec<u8>),
}

impl ImageRef {
    /// Short human-readable form for logs and history records.
    pub fn describe(&self) -> String {
        match self {
            ImageRef::Uri(uri) => uri.clone(),
            ImageRef::Content(bytes) => format!("<inline image, {} bytes>", bytes.len()),
        }
    }

    fn ensure_present(&self) -> Result<()> {
        let empty = match self {
            ImageRef::Uri(uri) => uri.trim().is_empty(),
            ImageRef::Content(bytes) => bytes.is_empty(),
        };
        if empty {
            return Err(LookbookError::MissingImage {
                reason: "image reference is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Annotation features requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    LabelDetection,
    ImageProperties,
    TextDetection,
    ObjectLocalization,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::LabelDetection,
        Feature::ImageProperties,
        Feature::TextDetection,
        Feature::ObjectLocalization,
    ];

    pub fn default_max_results(self) -> u32 {
        match self {
            Feature::LabelDetection => 20,
            _ => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotateRequest {
    pub requests: Vec<ImageRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub image: ImagePayload,
    pub features: Vec<FeatureRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImagePayload {
    Source { source: ImageSource },
    Content { content: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub image_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    #[serde(rename = "type")]
    pub kind: Feature,
    pub max_results: u32,
}

impl AnnotateRequest {
    /// Build a single-image request. Fails only when the image reference is
    /// empty.
    pub fn new(image: &ImageRef, features: &[Feature]) -> Result<Self> {
        image.ensure_present()?;
        let payload = match image {
            ImageRef::Uri(uri) => ImagePayload::Source {
                source: ImageSource {
                    image_uri: uri.clone(),
                },
            },
            ImageRef::Content(bytes) => ImagePayload::Content {
                content: STANDARD.encode(bytes),
            },
        };
        Ok(Self {
            requests: vec![ImageRequest {
                image: payload,
                features: features
                    .iter()
                    .map(|&kind| FeatureRequest {
                        kind,
                        max_results: kind.default_max_results(),
                    })
                    .collect(),
            }],
        })
    }
}

/// Envelope returned by `images:annotate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub responses: Vec<RawAnnotations>,
}

impl AnnotateResponse {
    /// The annotations for the single image we asked about.
    pub fn into_first(self) -> Result<RawAnnotations> {
        let first = self
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| LookbookError::malformed("annotate response contains no results"))?;
        if let Some(status) = &first.error {
            return Err(status.to_error());
        }
        Ok(first)
    }
}

/// Raw per-image annotations. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_annotations: Option<Vec<RawLabel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_properties_annotation: Option<RawImageProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_annotations: Option<Vec<RawText>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_object_annotations: Option<Vec<RawObject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RawStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLabel {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub topicality: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImageProperties {
    #[serde(default)]
    pub dominant_colors: Option<RawDominantColors>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDominantColors {
    #[serde(default)]
    pub colors: Option<Vec<RawColorInfo>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawColorInfo {
    #[serde(default)]
    pub color: Option<RawColor>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub pixel_fraction: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawColor {
    #[serde(default)]
    pub red: Option<f64>,
    #[serde(default)]
    pub green: Option<f64>,
    #[serde(default)]
    pub blue: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawText {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    /// Spatial data; never carried into the canonical model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_poly: Option<serde_json::Value>,
}

/// Per-image error status embedded in an otherwise successful response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStatus {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

const GRPC_PERMISSION_DENIED: i32 = 7;
const GRPC_UNAUTHENTICATED: i32 = 16;

/// HTTP status equivalent of a gRPC status code, so `Upstream.status`
/// always carries HTTP semantics.
fn grpc_to_http(code: i32) -> u16 {
    match code {
        1 => 499,
        3 | 9 | 11 => 400,
        4 => 504,
        5 => 404,
        6 | 10 => 409,
        8 => 429,
        12 => 501,
        14 => 503,
        _ => 500,
    }
}

impl RawStatus {
    fn to_error(&self) -> LookbookError {
        let message = self.message.clone().unwrap_or_default();
        match self.code {
            Some(GRPC_PERMISSION_DENIED | GRPC_UNAUTHENTICATED) => {
                LookbookError::Auth { reason: message }
            }
            code => LookbookError::Upstream {
                status: code.map(grpc_to_http).unwrap_or(500),
                message,
            },
        }
    }
}

/// Map a raw payload onto the canonical model. Total: absent parts become
/// empty sequences or `None`.
pub fn normalize(raw: &RawAnnotations) -> VisionResult {
    let labels = raw
        .label_annotations
        .iter()
        .flatten()
        .map(|label| {
            let score = label.score.unwrap_or(0.0);
            Label {
                description: label.description.clone().unwrap_or_default(),
                score,
                topicality: label.topicality.unwrap_or(score),
            }
        })
        .collect();

    let colors = raw
        .image_properties_annotation
        .as_ref()
        .and_then(|props| props.dominant_colors.as_ref())
        .and_then(|dominant| dominant.colors.as_ref())
        .into_iter()
        .flatten()
        .map(|info| {
            let rgb = info
                .color
                .as_ref()
                .map(|c| {
                    Rgb::from_channels(
                        c.red.unwrap_or(0.0),
                        c.green.unwrap_or(0.0),
                        c.blue.unwrap_or(0.0),
                    )
                })
                .unwrap_or_default();
            ColorSample {
                rgb,
                score: info.score.unwrap_or(0.0),
                pixel_fraction: info.pixel_fraction.unwrap_or(0.0),
            }
        })
        .collect();

    let text = raw
        .text_annotations
        .as_ref()
        .and_then(|texts| texts.first())
        .and_then(|first| first.description.clone());

    let objects = raw
        .localized_object_annotations
        .iter()
        .flatten()
        .map(|obj| DetectedObject {
            name: obj.name.clone().unwrap_or_default(),
            score: obj.score.unwrap_or(0.0),
        })
        .collect();

    VisionResult {
        labels,
        colors,
        text,
        objects,
    }
}

/// Capability interface over the external vision service.
pub trait VisionService {
    fn annotate_image(&self, image: &ImageRef) -> Result<RawAnnotations>;
}

/// Replays a fixed payload regardless of the image.
#[derive(Debug, Clone, Default)]
pub struct StaticAnnotations {
    raw: RawAnnotations,
}

impl StaticAnnotations {
    pub fn new(raw: RawAnnotations) -> Self {
        Self { raw }
    }

    /// Parse either a bare per-image payload or a full `responses` envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let raw = if value.get("responses").is_some() {
            serde_json::from_value::<AnnotateResponse>(value)?.into_first()?
        } else {
            serde_json::from_value(value)?
        };
        Ok(Self::new(raw))
    }
}

impl VisionService for StaticAnnotations {
    fn annotate_image(&self, image: &ImageRef) -> Result<RawAnnotations> {
        image.ensure_present()?;
        Ok(self.raw.clone())
    }
}

/// Annotate, normalize and classify one image.
///
/// Errors from the service are returned as-is; nothing is fabricated in
/// their place.
pub fn analyze_image(service: &dyn VisionService, image: &ImageRef) -> Result<AnalysisOutcome> {
    let raw = service.annotate_image(image)?;
    let analysis = normalize(&raw);
    let fashion_insights = generate_insights(&analysis);
    tracing::info!(
        image = %image.describe(),
        labels = analysis.labels.len(),
        colors = analysis.colors.len(),
        category = %fashion_insights.category,
        "image analyzed"
    );
    Ok(AnalysisOutcome {
        analysis,
        fashion_insights,
    })
}
