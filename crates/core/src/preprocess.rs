use std::sync::LazyLock;

use lol_html::{HtmlRewriter, Settings, element};
use regex::Regex;

/// Tags whose content never belongs to the article text.
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "canvas", "template", "object", "embed", "button", "select",
];

/// Page furniture: site navigation, banners, footers, sidebars and forms.
const BOILERPLATE_TAGS: &[&str] = &["nav", "header", "footer", "aside", "form", "menu", "dialog"];

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static UNLIKELY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|cookie|disqus|extra|foot|header|menu|related|remark|rss|share|shoutbox|sidebar|social|sponsor|ad-break|agegate|pagination|pager|popup|newsletter)",
    )
    .unwrap()
});

static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story|noticia|news)").unwrap()
});

static HIDDEN_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").unwrap());

/// Configuration for HTML preprocessing
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script, style and other non-text tags
    pub remove_non_content: bool,
    /// Whether to remove nav, header, footer, aside and form blocks
    pub remove_boilerplate: bool,
    /// Whether to remove containers whose class/id looks like page furniture
    pub remove_unlikely: bool,
    /// Whether to keep positive candidates even if they match unlikely patterns
    pub keep_positive: bool,
    /// Whether to remove hidden elements
    pub remove_hidden: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_non_content: true,
            remove_boilerplate: true,
            remove_unlikely: true,
            keep_positive: true,
            remove_hidden: true,
        }
    }
}

/// Preprocess HTML by removing markup that never carries article text
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = remove_comments(html);

    let mut tags: Vec<&str> = Vec::new();
    if config.remove_non_content {
        tags.extend_from_slice(NON_CONTENT_TAGS);
    }
    if config.remove_boilerplate {
        tags.extend_from_slice(BOILERPLATE_TAGS);
    }
    if !tags.is_empty() {
        processed = remove_tags(&processed, &tags);
    }

    if config.remove_unlikely {
        processed = remove_unlikely_candidates(&processed, config.keep_positive);
    }

    if config.remove_hidden {
        processed = remove_hidden_elements(&processed);
    }

    processed
}

/// Run a lol_html rewrite, falling back to the input when the rewriter fails
fn rewrite(html: &str, settings: Settings<'_, '_>) -> String {
    let mut output = String::new();
    let mut rewriter = HtmlRewriter::new(settings, |c: &[u8]| {
        output.push_str(&String::from_utf8_lossy(c));
    });

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Remove whole elements (with their content) by tag name
fn remove_tags(html: &str, tags: &[&str]) -> String {
    rewrite(
        html,
        Settings {
            element_content_handlers: tags
                .iter()
                .map(|tag| {
                    element!(tag, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            ..Default::default()
        },
    )
}

/// Remove HTML comments from the document
fn remove_comments(html: &str) -> String {
    COMMENT.replace_all(html, "").to_string()
}

/// Remove elements whose class or id looks like page furniture, unless
/// `keep_positive` is set and the same name also looks like content
fn remove_unlikely_candidates(html: &str, keep_positive: bool) -> String {
    let is_unlikely = |value: &str| UNLIKELY.is_match(value) && (!keep_positive || !POSITIVE.is_match(value));

    rewrite(
        html,
        Settings {
            element_content_handlers: vec![element!("*", |el| {
                if matches!(el.tag_name().as_str(), "html" | "body" | "article" | "main") {
                    return Ok(());
                }

                if let Some(id) = el.get_attribute("id")
                    && is_unlikely(&id)
                {
                    el.remove();
                    return Ok(());
                }

                if let Some(class) = el.get_attribute("class")
                    && class.split_whitespace().any(&is_unlikely)
                {
                    el.remove();
                }

                Ok(())
            })],
            ..Default::default()
        },
    )
}

/// Remove elements hidden with inline styles or the `hidden`/`aria-hidden` attributes
fn remove_hidden_elements(html: &str) -> String {
    rewrite(
        html,
        Settings {
            element_content_handlers: vec![element!("*", |el| {
                let hidden_style = el.get_attribute("style").is_some_and(|style| HIDDEN_STYLE.is_match(&style));
                let hidden_attr = el.has_attribute("hidden")
                    || el.get_attribute("aria-hidden").is_some_and(|v| v.eq_ignore_ascii_case("true"));

                if hidden_style || hidden_attr {
                    el.remove();
                }
                Ok(())
            })],
            ..Default::default()
        },
    )
}
