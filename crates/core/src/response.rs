//! Parsing of the model reply into a [`GeneratedArticle`].
//!
//! The reply is read line by line against a [`ResponseGrammar`]: an ordered
//! list of [`SectionRule`]s, each pairing a label pattern with the
//! [`SectionKind`] it opens. The first rule that matches a line wins. Lines
//! before the first label are ignored and a repeated label starts its
//! section over.
//!
//! # Example
//!
//! ```rust
//! use newsdesk_core::response::ResponseGrammar;
//!
//! let reply = "**Título:** Nuevo hallazgo\nTexto: Primer párrafo.\nEnlaces:\n- <https://example.com>\nBluesky: Post";
//! let article = ResponseGrammar::default().parse(reply, None).unwrap();
//!
//! assert_eq!(article.title, "Nuevo hallazgo");
//! assert_eq!(article.links, vec!["https://example.com"]);
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::{NewsdeskError, Result};

/// The sections a reply can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Title,
    Body,
    Links,
    Bluesky,
}

/// A label pattern and the section it opens.
///
/// The pattern must expose the text after the label as the `rest` group.
#[derive(Debug, Clone)]
pub struct SectionRule {
    pub kind: SectionKind,
    pub pattern: Regex,
}

impl SectionRule {
    /// Builds a rule recognising any of `labels`, case-insensitively,
    /// followed by a colon. Markdown decoration (`**`, `__`, `#`, `>`)
    /// around the label is tolerated; the text after it is kept as is.
    ///
    /// # Errors
    ///
    /// Returns [`NewsdeskError::Config`] if no label is given.
    pub fn new(kind: SectionKind, labels: &[&str]) -> Result<Self> {
        if labels.iter().all(|l| l.trim().is_empty()) {
            return Err(NewsdeskError::Config(format!("no labels given for {:?}", kind)));
        }

        let mut sorted: Vec<&str> = labels.iter().map(|l| l.trim()).filter(|l| !l.is_empty()).collect();
        sorted.sort_by_key(|l| std::cmp::Reverse(l.chars().count()));
        let alternatives = sorted.iter().map(|l| regex::escape(l)).collect::<Vec<_>>().join("|");

        // A closing `**`/`__` right after the colon belongs to the label.
        let source = format!(
            r"(?i)^[\s#>*_]*(?:{})[\s*_]*:(?:\s*(?:\*\*|__|\*|_)(?:\s|$))?\s*(?P<rest>.*)$",
            alternatives
        );
        let pattern = Regex::new(&source)
            .map_err(|e| NewsdeskError::Config(format!("invalid label pattern: {}", e)))?;

        Ok(Self { kind, pattern })
    }

    /// Returns the text after the label when `line` opens this section.
    fn matches<'l>(&self, line: &'l str) -> Option<&'l str> {
        self.pattern
            .captures(line)
            .map(|caps| caps.name("rest").map_or("", |m| m.as_str()))
    }
}

static DEFAULT_RULES: LazyLock<Vec<SectionRule>> = LazyLock::new(|| {
    [
        (SectionKind::Title, &["Title", "Título", "Titulo", "Titular"][..]),
        (SectionKind::Body, &["Text", "Texto", "Body", "Cuerpo"][..]),
        (SectionKind::Links, &["Links", "Enlaces", "Enlace", "Referencias", "References"][..]),
        (SectionKind::Bluesky, &["Bluesky", "Bluesky post", "Post Bluesky", "Post para Bluesky"][..]),
    ]
    .into_iter()
    .map(|(kind, labels)| SectionRule::new(kind, labels).unwrap())
    .collect()
});

static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:[-*+•]|\d+[.)])\s+").unwrap());

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]\(([^)\s]+)\)").unwrap());

static ANGLE_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(https?://[^>\s]+)>").unwrap());

static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

static BRACKET_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[[^\]]*\]$").unwrap());

const NO_LINK_MARKERS: &[&str] =
    &["none", "ninguno", "ninguna", "n/a", "-", "no hay enlaces", "sin enlaces", "no links"];

const POST_PLACEHOLDERS: &[&str] = &["[enlace a la noticia]", "[link to the news]"];

/// Structured result of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArticle {
    pub title: String,
    pub body: String,
    pub links: Vec<String>,
    pub bluesky_post: String,
}

/// Ordered label rules for reading a reply.
#[derive(Debug, Clone)]
pub struct ResponseGrammar {
    rules: Vec<SectionRule>,
}

impl Default for ResponseGrammar {
    /// Spanish and English labels for the four sections.
    fn default() -> Self {
        Self { rules: DEFAULT_RULES.clone() }
    }
}

#[derive(Default)]
struct Sections {
    title: Vec<String>,
    body: Vec<String>,
    links: Vec<String>,
    bluesky: Vec<String>,
}

impl Sections {
    fn lines_mut(&mut self, kind: SectionKind) -> &mut Vec<String> {
        match kind {
            SectionKind::Title => &mut self.title,
            SectionKind::Body => &mut self.body,
            SectionKind::Links => &mut self.links,
            SectionKind::Bluesky => &mut self.bluesky,
        }
    }
}

impl ResponseGrammar {
    /// A grammar with no rules at all.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule; earlier rules keep priority.
    pub fn with_rule(mut self, rule: SectionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[SectionRule] {
        &self.rules
    }

    fn classify<'l>(&self, line: &'l str) -> Option<(SectionKind, &'l str)> {
        self.rules.iter().find_map(|rule| rule.matches(line).map(|rest| (rule.kind, rest)))
    }

    /// Parses a reply.
    ///
    /// When `source_url` is given it becomes the only link if the reply has
    /// none, and it replaces the link placeholder in the social post.
    ///
    /// # Errors
    ///
    /// Returns [`NewsdeskError::MalformedResponse`] when the title or the body
    /// is missing or empty.
    pub fn parse(&self, reply: &str, source_url: Option<&str>) -> Result<GeneratedArticle> {
        let mut sections = Sections::default();
        let mut current: Option<SectionKind> = None;

        for line in reply.lines() {
            if line.trim_start().starts_with("```") {
                continue;
            }

            if let Some((kind, rest)) = self.classify(line) {
                let lines = sections.lines_mut(kind);
                lines.clear();
                if !rest.trim().is_empty() {
                    lines.push(rest.to_string());
                }
                current = Some(kind);
                continue;
            }

            if let Some(kind) = current {
                sections.lines_mut(kind).push(line.to_string());
            }
        }

        let title = join_title(&sections.title);
        if title.is_empty() {
            return Err(NewsdeskError::MalformedResponse("no title section found in the reply".to_string()));
        }

        let body = sections.body.join("\n").trim().to_string();
        if body.is_empty() {
            return Err(NewsdeskError::MalformedResponse("no body section found in the reply".to_string()));
        }

        let mut links: Vec<String> = sections.links.iter().filter_map(|l| normalize_link(l)).collect();
        if links.is_empty()
            && let Some(url) = source_url
        {
            links.push(url.to_string());
        }

        let mut bluesky_post = sections.bluesky.join("\n").trim().to_string();
        if let Some(url) = source_url {
            for placeholder in POST_PLACEHOLDERS {
                bluesky_post = bluesky_post.replace(placeholder, url);
            }
        }

        tracing::debug!(
            title_chars = title.chars().count(),
            body_chars = body.chars().count(),
            links = links.len(),
            bluesky_chars = bluesky_post.chars().count(),
            "parsed model reply"
        );

        Ok(GeneratedArticle { title, body, links, bluesky_post })
    }
}

/// Joins the title lines and drops one balanced emphasis wrapper
/// (`**x**`, `__x__`, `*x*`, `_x_`). Other characters are title text.
fn join_title(lines: &[String]) -> String {
    let joined = lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ");

    for marker in ["**", "__", "*", "_"] {
        if let Some(inner) = joined.strip_prefix(marker).and_then(|t| t.strip_suffix(marker))
            && !inner.is_empty()
            && !inner.contains(marker)
            && inner.trim() == inner
        {
            return inner.to_string();
        }
    }

    joined
}

/// Reduces one links line to `url`, `url (note)` or `url rest`.
///
/// Returns `None` for blank lines and "no links" placeholders.
fn normalize_link(line: &str) -> Option<String> {
    let stripped = BULLET.replace(line.trim(), "");
    let unlinked = MARKDOWN_LINK.replace_all(&stripped, "$1");
    let unangled = ANGLE_LINK.replace_all(&unlinked, "$1");
    let text = unangled.trim();

    if text.is_empty()
        || NO_LINK_MARKERS.contains(&text.to_lowercase().trim_end_matches('.'))
        || BRACKET_PLACEHOLDER.is_match(text)
    {
        return None;
    }

    match URL.find(text) {
        Some(m) if m.start() > 0 => {
            let prefix = text[..m.start()].trim().trim_end_matches([':', '-', '–']).trim();
            let rest = text[m.end()..].trim();
            let mut link = m.as_str().to_string();
            if !prefix.is_empty() {
                link.push_str(&format!(" ({})", prefix));
            }
            if !rest.is_empty() {
                link.push(' ');
                link.push_str(rest);
            }
            Some(link)
        }
        _ => Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FULL_REPLY: &str = "\
Título: Nuevo hallazgo arqueológico en Aragón
Texto: El equipo de la Universidad de Zaragoza presentó ayer el hallazgo.

La campaña continuará en otoño.
Enlaces:
- https://unizar.es/noticia
- https://example.com/yacimiento
Bluesky: Un equipo de @unizar.es presenta un hallazgo en Aragón #arqueologia [enlace a la noticia]";

    #[test]
    fn test_round_trip_all_sections() {
        let article = ResponseGrammar::default().parse(FULL_REPLY, None).unwrap();

        assert_eq!(article.title, "Nuevo hallazgo arqueológico en Aragón");
        assert_eq!(
            article.body,
            "El equipo de la Universidad de Zaragoza presentó ayer el hallazgo.\n\nLa campaña continuará en otoño."
        );
        assert_eq!(article.links, vec!["https://unizar.es/noticia", "https://example.com/yacimiento"]);
        assert_eq!(
            article.bluesky_post,
            "Un equipo de @unizar.es presenta un hallazgo en Aragón #arqueologia [enlace a la noticia]"
        );
    }

    #[test]
    fn test_placeholder_replaced_with_source_url() {
        let article = ResponseGrammar::default().parse(FULL_REPLY, Some("https://fuente.es/n/1")).unwrap();
        assert!(article.bluesky_post.ends_with("#arqueologia https://fuente.es/n/1"));
        assert_eq!(article.links.len(), 2, "links in the reply are kept as they are");
    }

    #[test]
    fn test_missing_links_defaults_to_source_url() {
        let reply = "Title: A title\nText: Some body.\nBluesky: post";
        let article = ResponseGrammar::default().parse(reply, Some("https://example.com/a")).unwrap();
        assert_eq!(article.links, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_missing_links_without_url_is_empty() {
        let reply = "Title: A title\nText: Some body.";
        let article = ResponseGrammar::default().parse(reply, None).unwrap();
        assert!(article.links.is_empty());
        assert_eq!(article.bluesky_post, "");
    }

    #[rstest]
    #[case("Título: Hola")]
    #[case("TÍTULO: Hola")]
    #[case("titulo:Hola")]
    #[case("**Título:** Hola")]
    #[case("**Title**: Hola")]
    #[case("## Title: Hola")]
    #[case("Titular: Hola")]
    #[case("  title :  Hola ")]
    fn test_title_label_variants(#[case] line: &str) {
        let reply = format!("{}\nTexto: Cuerpo", line);
        let article = ResponseGrammar::default().parse(&reply, None).unwrap();
        assert_eq!(article.title, "Hola");
    }

    #[rstest]
    #[case("Título: Microsoft presenta F#", "Microsoft presenta F#")]
    #[case("Title: __init__ files explained", "__init__ files explained")]
    #[case("Title: C# and *nix tooling", "C# and *nix tooling")]
    #[case("Título: Nuevo_hallazgo_", "Nuevo_hallazgo_")]
    #[case("Título: **Hola**", "Hola")]
    #[case("Title: *Hola*", "Hola")]
    #[case("**Title:** __Hola__", "Hola")]
    fn test_title_text_kept_exactly(#[case] line: &str, #[case] expected: &str) {
        let reply = format!("{}\nTexto: Cuerpo.", line);
        let article = ResponseGrammar::default().parse(&reply, None).unwrap();
        assert_eq!(article.title, expected);
    }

    #[rstest]
    #[case("Texto:")]
    #[case("Text:")]
    #[case("**Cuerpo:**")]
    #[case("Body:")]
    fn test_body_label_on_its_own_line(#[case] label: &str) {
        let reply = format!("Title: T\n{}\nPrimera línea.\nSegunda línea.", label);
        let article = ResponseGrammar::default().parse(&reply, None).unwrap();
        assert_eq!(article.body, "Primera línea.\nSegunda línea.");
    }

    #[test]
    fn test_preamble_and_code_fences_are_ignored() {
        let reply = "Claro, aquí tienes la noticia:\n```\nTítulo: T\nTexto: B\nBluesky: P\n```";
        let article = ResponseGrammar::default().parse(reply, None).unwrap();
        assert_eq!(article.title, "T");
        assert_eq!(article.body, "B");
        assert_eq!(article.bluesky_post, "P");
    }

    #[test]
    fn test_repeated_label_restarts_section() {
        let reply = "Título: Primero\nTexto: Cuerpo\nTítulo: Segundo";
        let article = ResponseGrammar::default().parse(reply, None).unwrap();
        assert_eq!(article.title, "Segundo");
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let reply = "Texto: Solo cuerpo";
        assert!(matches!(
            ResponseGrammar::default().parse(reply, None),
            Err(NewsdeskError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_body_is_malformed() {
        let reply = "Título: Solo título\nTexto:\n\nBluesky: post";
        assert!(matches!(
            ResponseGrammar::default().parse(reply, None),
            Err(NewsdeskError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_unlabelled_reply_is_malformed() {
        assert!(ResponseGrammar::default().parse("Lo siento, no puedo ayudar.", None).is_err());
        assert!(ResponseGrammar::default().parse("", None).is_err());
    }

    #[rstest]
    #[case("- https://a.es", Some("https://a.es"))]
    #[case("* [Universidad](https://unizar.es)", Some("https://unizar.es"))]
    #[case("1. <https://a.es/x>", Some("https://a.es/x"))]
    #[case("- https://a.es (nota de prensa)", Some("https://a.es (nota de prensa)"))]
    #[case("- [Web](https://a.es) (oficial)", Some("https://a.es (oficial)"))]
    #[case("- Web del grupo: https://a.es", Some("https://a.es (Web del grupo)"))]
    #[case("- Ninguno", None)]
    #[case("N/A", None)]
    #[case("- [Enlace 1]", None)]
    #[case("   ", None)]
    fn test_normalize_link(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_link(line).as_deref(), expected);
    }

    #[test]
    fn test_with_rule_extends_labels() {
        let grammar =
            ResponseGrammar::default().with_rule(SectionRule::new(SectionKind::Body, &["Noticia"]).unwrap());
        let reply = "Título: T\nNoticia: Cuerpo alternativo";
        let article = grammar.parse(reply, None).unwrap();
        assert_eq!(article.body, "Cuerpo alternativo");
        assert_eq!(grammar.rules().len(), 5);
    }

    #[test]
    fn test_empty_grammar_matches_nothing() {
        assert!(ResponseGrammar::empty().parse(FULL_REPLY, None).is_err());
    }

    #[test]
    fn test_rule_requires_labels() {
        assert!(SectionRule::new(SectionKind::Title, &[]).is_err());
        assert!(SectionRule::new(SectionKind::Title, &["  "]).is_err());
    }

    #[test]
    fn test_label_needs_colon() {
        let reply = "Título: T\nTexto: Uno\nTexto adicional sin etiqueta";
        let article = ResponseGrammar::default().parse(reply, None).unwrap();
        assert_eq!(article.body, "Uno\nTexto adicional sin etiqueta");
    }
}
