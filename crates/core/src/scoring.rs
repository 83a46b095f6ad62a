use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Element;

/// Configuration for block scoring
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Multiplier for blocks whose class/id looks like content
    pub positive_weight: f64,
    /// Multiplier for blocks whose class/id looks like page furniture
    pub negative_weight: f64,
    /// Blocks with less text than this are never candidates
    pub min_text_chars: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self { positive_weight: 1.5, negative_weight: 0.5, min_text_chars: 25 }
    }
}

/// Result of scoring a candidate block
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub tag_name: String,
    /// Characters of trimmed text below the block
    pub text_len: usize,
    /// Link density (0.0 to 1.0)
    pub link_density: f64,
    /// Multiplier from tag and class/id patterns
    pub weight: f64,
    pub final_score: f64,
}

static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story|noticia|news)").unwrap()
});

static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|related|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|promo|widget)",
    )
    .unwrap()
});

/// Multiplier for the tag itself.
///
/// Semantic containers get a small edge over generic ones so that a
/// `<main>` wins over a wrapper `<div>` holding the same text.
pub fn base_tag_weight(element: &Element<'_>) -> f64 {
    match element.tag_name().as_str() {
        "main" | "article" => 1.2,
        "section" => 1.1,
        "div" => 1.0,
        "td" => 0.9,
        _ => 0.8,
    }
}

/// Class/id multiplier: the id is checked first, then each class name.
pub fn class_id_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let names = element
        .attr("id")
        .into_iter()
        .chain(element.attr("class").into_iter().flat_map(str::split_whitespace));

    for name in names {
        if POSITIVE.is_match(name) {
            return config.positive_weight;
        }
        if NEGATIVE.is_match(name) {
            return config.negative_weight;
        }
    }

    1.0
}

/// Ratio of link text characters to all text characters below the element.
///
/// Returns a value from 0.0 (no links) to 1.0 (all text is in links).
pub fn link_density(element: &Element<'_>) -> f64 {
    let text_length = element.text_len();
    if text_length == 0 {
        return 0.0;
    }

    let link_text_length = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| link.text_len())
        .sum::<usize>();

    (link_text_length as f64 / text_length as f64).min(1.0)
}

/// Score a block: text length × (1 − link density) × tag and class weight.
pub fn calculate_score(element: &Element<'_>, config: &ScoreConfig) -> ScoreResult {
    let text_len = element.text_len();
    let ld = link_density(element);
    let weight = base_tag_weight(element) * class_id_weight(element, config);

    let final_score = if text_len < config.min_text_chars { 0.0 } else { text_len as f64 * (1.0 - ld) * weight };

    ScoreResult { tag_name: element.tag_name(), text_len, link_density: ld, weight, final_score }
}
