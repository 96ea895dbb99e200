//! Fashion insight pipeline.
//!
//! Normalizes vision-service annotations for a photo, derives a keyword-based
//! [`FashionInsight`] (category, style, occasions, materials, color names) and
//! looks up similar items. The external services sit behind the
//! [`VisionService`] and [`SimilarItemSearch`] traits so the pipeline can run
//! without network access.

pub mod color;
pub mod error;
pub mod history;
pub mod insight;
pub mod model;
pub mod search;
pub mod vision;

pub use color::{NamedColor, PALETTE, Rgb, color_name, nearest_color};
pub use error::{LookbookError, Result};
pub use history::{AnalysisRecord, HistoryStore, export_csv};
pub use insight::{category_scores, generate_insights, search_query};
pub use model::{
    AnalysisOutcome, Category, ColorSample, DetectedObject, FashionInsight, Label, Occasion,
    StyleTag, VisionResult,
};
pub use search::{
    PlaceholderCatalog, ResultSource, SimilarItem, SimilarItemSearch, SimilarItems,
    placeholder_results, search_or_placeholder,
};
pub use vision::{
    AnnotateRequest, AnnotateResponse, Feature, ImageRef, RawAnnotations, StaticAnnotations,
    VisionService, analyze_image, normalize,
};
