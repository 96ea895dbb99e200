//! Similar-item lookup and the curated placeholder catalog.

use crate::error::Result;
use crate::vision::ImageRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarItem {
    pub id: String,
    pub title: String,
    /// Thumbnail URL.
    pub image: String,
    /// Display price including currency symbol.
    pub price: String,
    pub brand: String,
    pub description: String,
    pub url: String,
}

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Live,
    /// Curated stand-in, not derived from the image.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarItems {
    pub source: ResultSource,
    pub items: Vec<SimilarItem>,
}

impl SimilarItems {
    pub fn is_placeholder(&self) -> bool {
        self.source == ResultSource::Placeholder
    }
}

/// Capability interface over the similar-item search service.
pub trait SimilarItemSearch {
    fn search_similar(&self, image: &ImageRef, query: Option<&str>) -> Result<Vec<SimilarItem>>;

    /// How results from this backend should be labeled.
    fn source(&self) -> ResultSource {
        ResultSource::Live
    }
}

const CATALOG: [[&str; 6]; 6] = [
    [
        "1",
        "Elegant Summer Dress",
        "photo-1594633313593-bab3825d0caf",
        "$89.99",
        "Zara",
        "Perfect for summer occasions",
    ],
    [
        "2",
        "Floral Midi Dress",
        "photo-1566479179817-c0f1e5f6b5db",
        "$129.99",
        "H&M",
        "Romantic floral pattern",
    ],
    [
        "3",
        "Casual Day Dress",
        "photo-1572804013309-59a88b7e92f1",
        "$65.99",
        "Forever 21",
        "Comfortable and stylish",
    ],
    [
        "4",
        "Boho Chic Dress",
        "photo-1515372039744-b8f02a3ae446",
        "$149.99",
        "Free People",
        "Bohemian style dress",
    ],
    [
        "5",
        "Classic Black Dress",
        "photo-1539008835657-9e8e9680c956",
        "$199.99",
        "Calvin Klein",
        "Timeless elegance",
    ],
    [
        "6",
        "Polka Dot Dress",
        "photo-1596783074506-d1d6b2a44d3d",
        "$79.99",
        "ASOS",
        "Vintage inspired pattern",
    ],
];

fn item([id, title, photo, price, brand, description]: [&str; 6]) -> SimilarItem {
    SimilarItem {
        id: id.to_string(),
        title: title.to_string(),
        image: format!("https://images.unsplash.com/{photo}?w=400"),
        price: price.to_string(),
        brand: brand.to_string(),
        description: description.to_string(),
        url: format!("https://pinterest.com/mock{id}"),
    }
}

/// The fixed six-item catalog shown when no live search is available.
pub fn placeholder_items() -> Vec<SimilarItem> {
    CATALOG.into_iter().map(item).collect()
}

pub fn placeholder_results() -> SimilarItems {
    SimilarItems {
        source: ResultSource::Placeholder,
        items: placeholder_items(),
    }
}

/// Search backend that always answers with the curated catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderCatalog;

impl SimilarItemSearch for PlaceholderCatalog {
    fn search_similar(&self, _image: &ImageRef, _query: Option<&str>) -> Result<Vec<SimilarItem>> {
        Ok(placeholder_items())
    }

    fn source(&self) -> ResultSource {
        ResultSource::Placeholder
    }
}

/// Query `search`, falling back to the labeled placeholder set when the
/// collaborator fails.
pub fn search_or_placeholder(
    search: &dyn SimilarItemSearch,
    image: &ImageRef,
    query: Option<&str>,
) -> SimilarItems {
    match search.search_similar(image, query) {
        Ok(items) => SimilarItems {
            source: search.source(),
            items,
        },
        Err(err) => {
            tracing::warn!("similar-item search unavailable, using placeholder results: {err}");
            placeholder_results()
        }
    }
}
