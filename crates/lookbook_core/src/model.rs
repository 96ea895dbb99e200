//! Canonical analysis types produced and consumed by the pipeline.

use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One vision-service label for the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub description: String,
    /// Service confidence in [0,1].
    pub score: f64,
    /// Relevance to the image as a whole in [0,1].
    pub topicality: f64,
}

/// One dominant color cluster of the source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSample {
    #[serde(rename = "color")]
    pub rgb: Rgb,
    pub score: f64,
    /// Share of the image covered by this cluster.
    pub pixel_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub name: String,
    pub score: f64,
}

/// Normalized annotations for one image.
///
/// Sequences keep the order in which the service reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionResult {
    pub labels: Vec<Label>,
    pub colors: Vec<ColorSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub objects: Vec<DetectedObject>,
}

/// Top-level garment classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dress,
    Top,
    Bottom,
    Shoes,
    Accessory,
    #[default]
    Unknown,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Dress => "dress",
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Shoes => "shoes",
            Category::Accessory => "accessory",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
    Casual,
    Formal,
    Vintage,
    Modern,
    Bohemian,
    Minimalist,
}

impl StyleTag {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleTag::Casual => "casual",
            StyleTag::Formal => "formal",
            StyleTag::Vintage => "vintage",
            StyleTag::Modern => "modern",
            StyleTag::Bohemian => "bohemian",
            StyleTag::Minimalist => "minimalist",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occasion {
    Work,
    Party,
    Casual,
    Formal,
    Summer,
    Winter,
}

impl Occasion {
    pub fn as_str(self) -> &'static str {
        match self {
            Occasion::Work => "work",
            Occasion::Party => "party",
            Occasion::Casual => "casual",
            Occasion::Formal => "formal",
            Occasion::Summer => "summer",
            Occasion::Winter => "winter",
        }
    }
}

/// Structured summary derived from exactly one [`VisionResult`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FashionInsight {
    pub category: Category,
    /// Unique style tags, in table order.
    pub style: Vec<StyleTag>,
    /// Unique occasion tags, in table order.
    pub occasions: Vec<Occasion>,
    /// Lower-cased, deduplicated material names in first-seen order.
    pub materials: Vec<String>,
    /// Names for at most the first three dominant colors.
    pub colors: Vec<String>,
    /// Accumulated label score of the winning category; 0 when unknown.
    pub confidence: f64,
}

/// Pipeline output as handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub analysis: VisionResult,
    pub fashion_insights: FashionInsight,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_serializes_with_caller_facing_field_names() {
        let outcome = AnalysisOutcome {
            analysis: VisionResult {
                labels: vec![Label {
                    description: "Dress".into(),
                    score: 0.5,
                    topicality: 0.5,
                }],
                colors: vec![ColorSample {
                    rgb: Rgb::new(1, 2, 3),
                    score: 0.25,
                    pixel_fraction: 0.5,
                }],
                text: None,
                objects: vec![],
            },
            fashion_insights: FashionInsight {
                category: Category::Dress,
                style: vec![StyleTag::Vintage],
                occasions: vec![Occasion::Summer],
                materials: vec!["silk".into()],
                colors: vec!["black".into()],
                confidence: 0.5,
            },
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({
                "analysis": {
                    "labels": [{"description": "Dress", "score": 0.5, "topicality": 0.5}],
                    "colors": [{
                        "color": {"red": 1, "green": 2, "blue": 3},
                        "score": 0.25,
                        "pixelFraction": 0.5
                    }],
                    "objects": []
                },
                "fashionInsights": {
                    "category": "dress",
                    "style": ["vintage"],
                    "occasions": ["summer"],
                    "materials": ["silk"],
                    "colors": ["black"],
                    "confidence": 0.5
                }
            })
        );
    }

    #[test]
    fn default_insight_is_unknown() {
        let insight = FashionInsight::default();
        assert_eq!(insight.category, Category::Unknown);
        assert_eq!(insight.category.to_string(), "unknown");
        assert_eq!(insight.confidence, 0.0);
    }
}
