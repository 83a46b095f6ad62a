//! Main-text extraction from a fetched page.
//!
//! The page is cleaned with [`crate::preprocess`], then one block is chosen:
//!
//! 1. the longest `<article>` with at least `min_article_chars` characters,
//! 2. otherwise the best scored `main`/`section`/`div`/`td` block
//!    (see [`crate::scoring`]),
//! 3. otherwise `<body>`, and finally the whole document.
//!
//! The chosen block is rendered with [`crate::text::element_to_text`].

use crate::parse::{Document, Element};
use crate::preprocess::{PreprocessConfig, preprocess_html};
use crate::scoring::{ScoreConfig, calculate_score};
use crate::text::element_to_text;
use crate::{NewsdeskError, Result};

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Minimum characters for an `<article>` to win outright
    pub min_article_chars: usize,
    /// Preprocessing configuration
    pub preprocess: PreprocessConfig,
    /// Block scoring configuration
    pub scoring: ScoreConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { min_article_chars: 200, preprocess: PreprocessConfig::default(), scoring: ScoreConfig::default() }
    }
}

/// Where the extracted text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Article,
    ScoredBlock,
    Body,
    Document,
}

/// Tags considered when no `<article>` is long enough
const CANDIDATE_TAGS: &str = "main, section, div, td";

/// Extracts the main text of a page.
///
/// `source_url` is only used to label the error.
///
/// # Errors
///
/// Returns [`NewsdeskError::EmptyContent`] when nothing readable is left.
pub fn extract_main_text(html: &str, source_url: &str, config: &ExtractConfig) -> Result<String> {
    let (text, strategy) = extract_with_strategy(html, config);
    if text.is_empty() {
        return Err(NewsdeskError::EmptyContent(source_url.to_string()));
    }

    tracing::debug!(url = source_url, ?strategy, chars = text.chars().count(), "extracted main text");
    Ok(text)
}

/// Extraction without the emptiness check, reporting which rule fired.
pub fn extract_with_strategy(html: &str, config: &ExtractConfig) -> (String, Strategy) {
    let cleaned = preprocess_html(html, &config.preprocess);
    let doc = Document::parse(&cleaned);

    if let Some(article) = longest_article(&doc, config.min_article_chars) {
        return (element_to_text(article.element_ref()), Strategy::Article);
    }

    if let Some(block) = best_scored_block(&doc, &config.scoring) {
        let text = element_to_text(block.element_ref());
        if !text.is_empty() {
            return (text, Strategy::ScoredBlock);
        }
    }

    if let Some(body) = doc.body() {
        let text = element_to_text(body.element_ref());
        if !text.is_empty() {
            return (text, Strategy::Body);
        }
    }

    (element_to_text(doc.root().element_ref()), Strategy::Document)
}

fn longest_article(doc: &Document, min_chars: usize) -> Option<Element<'_>> {
    doc.select("article")
        .unwrap_or_default()
        .into_iter()
        .map(|el| (el.text_len(), el))
        .filter(|(len, _)| *len >= min_chars)
        .max_by_key(|(len, _)| *len)
        .map(|(_, el)| el)
}

/// Highest scoring candidate. Ties go to the later block in document
/// order, which is the innermost one when a wrapper adds no text.
fn best_scored_block<'a>(doc: &'a Document, config: &ScoreConfig) -> Option<Element<'a>> {
    let mut best: Option<(f64, Element<'a>)> = None;

    for element in doc.select(CANDIDATE_TAGS).unwrap_or_default() {
        let score = calculate_score(&element, config).final_score;
        if score <= 0.0 {
            continue;
        }
        if best.as_ref().is_none_or(|(top, _)| score >= *top) {
            best = Some((score, element));
        }
    }

    best.map(|(_, el)| el)
}
