//! Keyword classifier turning vision labels into a [`FashionInsight`].
//!
//! All matching is a case-insensitive substring test of a label description
//! against fixed keyword tables. Table order matters: category ties go to the
//! earlier entry and tags are emitted in table order.

use crate::color::color_name;
use crate::model::{Category, FashionInsight, Label, Occasion, StyleTag, VisionResult};

pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Dress, &["dress", "gown", "frock"]),
    (
        Category::Top,
        &["shirt", "blouse", "top", "t-shirt", "sweater", "cardigan"],
    ),
    (
        Category::Bottom,
        &["pants", "jeans", "skirt", "shorts", "trousers"],
    ),
    (Category::Shoes, &["shoe", "boot", "sneaker", "heel", "sandal"]),
    (
        Category::Accessory,
        &["bag", "purse", "jewelry", "watch", "belt", "hat"],
    ),
];

pub const STYLE_KEYWORDS: &[(StyleTag, &[&str])] = &[
    (StyleTag::Casual, &["casual", "everyday", "relaxed"]),
    (StyleTag::Formal, &["formal", "elegant", "sophisticated"]),
    (StyleTag::Vintage, &["vintage", "retro", "classic"]),
    (StyleTag::Modern, &["modern", "contemporary", "trendy"]),
    (StyleTag::Bohemian, &["boho", "bohemian", "hippie"]),
    (StyleTag::Minimalist, &["minimal", "simple", "clean"]),
];

pub const OCCASION_KEYWORDS: &[(Occasion, &[&str])] = &[
    (Occasion::Work, &["office", "professional", "business"]),
    (Occasion::Party, &["party", "celebration", "festive"]),
    (Occasion::Casual, &["everyday", "casual", "weekend"]),
    (Occasion::Formal, &["formal", "evening", "gala"]),
    (Occasion::Summer, &["summer", "beach", "vacation"]),
    (Occasion::Winter, &["winter", "warm", "cozy"]),
];

pub const MATERIAL_KEYWORDS: &[&str] = &[
    "cotton", "silk", "wool", "leather", "denim", "lace", "chiffon", "satin",
];

/// Number of dominant colors that get a name.
pub const MAX_NAMED_COLORS: usize = 3;

/// Lower-cased label descriptions, computed once per classification.
struct Descriptions<'a> {
    labels: &'a [Label],
    lowered: Vec<String>,
}

impl<'a> Descriptions<'a> {
    fn new(labels: &'a [Label]) -> Self {
        let lowered = labels.iter().map(|l| l.description.to_lowercase()).collect();
        Self { labels, lowered }
    }

    fn matching<'k>(&self, keywords: &'k [&'k str]) -> impl Iterator<Item = &'a Label> {
        self.labels
            .iter()
            .zip(&self.lowered)
            .filter(move |(_, text)| contains_any(text, keywords))
            .map(|(label, _)| label)
    }

    fn any_matches(&self, keywords: &[&str]) -> bool {
        self.lowered.iter().any(|text| contains_any(text, keywords))
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Derive the fashion insight for one analysis. Pure and infallible.
pub fn generate_insights(analysis: &VisionResult) -> FashionInsight {
    let descriptions = Descriptions::new(&analysis.labels);
    let (category, confidence) = pick_category(&descriptions);

    FashionInsight {
        category,
        style: tags(&descriptions, STYLE_KEYWORDS),
        occasions: tags(&descriptions, OCCASION_KEYWORDS),
        materials: materials(&descriptions),
        colors: analysis
            .colors
            .iter()
            .take(MAX_NAMED_COLORS)
            .map(|sample| color_name(sample.rgb).to_string())
            .collect(),
        confidence,
    }
}

/// Accumulated label score per category, in table order.
pub fn category_scores(analysis: &VisionResult) -> Vec<(Category, f64)> {
    scores(&Descriptions::new(&analysis.labels))
}

fn scores(descriptions: &Descriptions<'_>) -> Vec<(Category, f64)> {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let sum = descriptions
                .matching(keywords)
                .fold(0.0, |acc, label| acc + label.score);
            (*category, sum)
        })
        .collect()
}

fn pick_category(descriptions: &Descriptions<'_>) -> (Category, f64) {
    let mut best = (Category::Unknown, 0.0);
    for (category, sum) in scores(descriptions) {
        // running max, strictly greater: first category wins a tie
        if sum > best.1 {
            best = (category, sum);
        }
    }
    tracing::debug!(category = %best.0, confidence = best.1, "category selected");
    best
}

fn tags<T: Copy>(descriptions: &Descriptions<'_>, table: &[(T, &[&str])]) -> Vec<T> {
    table
        .iter()
        .filter(|(_, keywords)| descriptions.any_matches(keywords))
        .map(|(tag, _)| *tag)
        .collect()
}

/// Lower-cased descriptions of labels naming a material, deduplicated,
/// first occurrence kept.
fn materials(descriptions: &Descriptions<'_>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for text in &descriptions.lowered {
        if contains_any(text, MATERIAL_KEYWORDS) && !found.contains(text) {
            found.push(text.clone());
        }
    }
    found
}

/// Free-text query for the similar-item lookup, built from the insight.
///
/// Colors first, then style, then the category. `None` when there is
/// nothing to search for.
pub fn search_query(insight: &FashionInsight) -> Option<String> {
    let mut terms: Vec<&str> = Vec::new();
    terms.extend(insight.colors.iter().take(1).map(String::as_str));
    terms.extend(insight.style.iter().map(|s| s.as_str()));
    if insight.category != Category::Unknown {
        terms.push(insight.category.as_str());
    }
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::model::ColorSample;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn label(description: &str, score: f64) -> Label {
        Label {
            description: description.to_string(),
            score,
            topicality: score,
        }
    }

    fn with_labels(labels: Vec<Label>) -> VisionResult {
        VisionResult {
            labels,
            ..VisionResult::default()
        }
    }

    fn sample(red: u8, green: u8, blue: u8) -> ColorSample {
        ColorSample {
            rgb: Rgb::new(red, green, blue),
            score: 0.1,
            pixel_fraction: 0.1,
        }
    }

    #[test]
    fn empty_analysis_yields_defaults() {
        let insight = generate_insights(&VisionResult::default());
        assert_eq!(insight.category, Category::Unknown);
        assert_eq!(insight.confidence, 0.0);
        assert!(insight.style.is_empty());
        assert!(insight.occasions.is_empty());
        assert!(insight.materials.is_empty());
        assert!(insight.colors.is_empty());
    }

    #[test]
    fn highest_category_sum_wins() {
        let insight = generate_insights(&with_labels(vec![
            label("red dress", 0.9),
            label("blue shoe", 0.3),
        ]));
        assert_eq!(insight.category, Category::Dress);
        assert_relative_eq!(insight.confidence, 0.9);
    }

    #[test]
    fn scores_accumulate_across_labels() {
        let insight = generate_insights(&with_labels(vec![
            label("Dress", 0.4),
            label("Sneaker", 0.5),
            label("Boot", 0.35),
        ]));
        assert_eq!(insight.category, Category::Shoes);
        assert_relative_eq!(insight.confidence, 0.85);
    }

    #[test]
    fn exact_tie_goes_to_earlier_category() {
        let insight = generate_insights(&with_labels(vec![
            label("jeans", 0.5),
            label("shirt", 0.5),
        ]));
        assert_eq!(insight.category, Category::Top);
        assert_relative_eq!(insight.confidence, 0.5);
    }

    #[test]
    fn one_label_can_feed_several_categories() {
        let analysis = with_labels(vec![label("dress shoe", 0.7)]);
        let scores = category_scores(&analysis);
        assert_eq!(scores[0], (Category::Dress, 0.7));
        assert_eq!(scores[3], (Category::Shoes, 0.7));
        assert_eq!(generate_insights(&analysis).category, Category::Dress);
    }

    #[test]
    fn zero_scored_matches_stay_unknown() {
        let insight = generate_insights(&with_labels(vec![label("gown", 0.0)]));
        assert_eq!(insight.category, Category::Unknown);
        assert_eq!(insight.confidence, 0.0);
    }

    #[test]
    fn style_and_category_from_one_label() {
        let insight = generate_insights(&with_labels(vec![label("vintage floral dress", 0.8)]));
        assert_eq!(insight.style, vec![StyleTag::Vintage]);
        assert_eq!(insight.category, Category::Dress);
    }

    #[rstest]
    #[case("Casual wear", vec![StyleTag::Casual], vec![Occasion::Casual])]
    #[case("Formal evening gown", vec![StyleTag::Formal], vec![Occasion::Formal])]
    #[case("Business office look", vec![], vec![Occasion::Work])]
    #[case("Boho beach party", vec![StyleTag::Bohemian], vec![Occasion::Party, Occasion::Summer])]
    #[case("Cozy winter knit", vec![], vec![Occasion::Winter])]
    #[case("Clean modern lines", vec![StyleTag::Modern, StyleTag::Minimalist], vec![])]
    fn tags_follow_keyword_tables(
        #[case] description: &str,
        #[case] style: Vec<StyleTag>,
        #[case] occasions: Vec<Occasion>,
    ) {
        let insight = generate_insights(&with_labels(vec![label(description, 0.5)]));
        assert_eq!(insight.style, style);
        assert_eq!(insight.occasions, occasions);
    }

    #[test]
    fn tags_are_unique_and_in_table_order() {
        let insight = generate_insights(&with_labels(vec![
            label("retro", 0.2),
            label("relaxed", 0.2),
            label("classic", 0.2),
        ]));
        assert_eq!(insight.style, vec![StyleTag::Casual, StyleTag::Vintage]);
    }

    #[test]
    fn materials_are_deduplicated_and_lowercased() {
        let insight = generate_insights(&with_labels(vec![
            label("Cotton shirt", 0.6),
            label("100% COTTON", 0.4),
            label("Silk", 0.3),
        ]));
        assert_eq!(insight.materials, vec!["cotton shirt", "100% cotton", "silk"]);
    }

    #[test]
    fn materials_differing_only_in_case_collapse() {
        let insight = generate_insights(&with_labels(vec![
            label("Cotton shirt", 0.6),
            label("100% COTTON", 0.4),
            label("cotton shirt", 0.3),
            label("Leather boot", 0.5),
            label("Denim", 0.2),
            label("DENIM", 0.2),
        ]));
        assert_eq!(
            insight.materials,
            vec!["cotton shirt", "100% cotton", "leather boot", "denim"]
        );
    }

    #[test]
    fn labels_without_material_are_ignored() {
        let insight = generate_insights(&with_labels(vec![label("Sleeve", 0.9)]));
        assert!(insight.materials.is_empty());
    }

    #[test]
    fn colors_take_first_three_in_order() {
        let analysis = VisionResult {
            colors: vec![
                sample(0, 0, 0),
                sample(255, 255, 255),
                sample(250, 0, 0),
                sample(0, 0, 250),
            ],
            ..VisionResult::default()
        };
        assert_eq!(
            generate_insights(&analysis).colors,
            vec!["black", "white", "red"]
        );
    }

    #[test]
    fn fewer_colors_than_limit() {
        let analysis = VisionResult {
            colors: vec![sample(0, 0, 0), sample(255, 255, 255)],
            ..VisionResult::default()
        };
        assert_eq!(generate_insights(&analysis).colors, vec!["black", "white"]);
    }

    #[test]
    fn classification_is_idempotent() {
        let analysis = VisionResult {
            labels: vec![label("Leather boot", 0.8), label("Vintage", 0.6)],
            colors: vec![sample(165, 42, 42)],
            ..VisionResult::default()
        };
        let first = generate_insights(&analysis);
        let second = generate_insights(&analysis);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn search_query_combines_color_style_and_category() {
        let insight = generate_insights(&VisionResult {
            labels: vec![label("Vintage dress", 0.9)],
            colors: vec![sample(0, 0, 0), sample(255, 255, 255)],
            ..VisionResult::default()
        });
        assert_eq!(search_query(&insight).as_deref(), Some("black vintage dress"));
        assert_eq!(search_query(&FashionInsight::default()), None);
    }
}
