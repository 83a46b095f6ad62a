//! Parsed pages and the element handles the extractor scores.
//!
//! ```rust
//! use newsdesk_core::parse::Document;
//!
//! let doc = Document::parse(r#"<body><div class="story"><p>Hola</p><p>mundo</p></div></body>"#);
//! let story = doc.select("div.story").unwrap();
//! assert_eq!(story[0].text_len(), 9);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{NewsdeskError, Result};

/// A page parsed by html5ever.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// html5ever recovers from any malformed markup, so parsing never fails.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Every element matching `selector`, in document order.
    ///
    /// Fails with [`NewsdeskError::Config`] on an invalid selector.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let compiled = compile(selector)?;
        Ok(self.html.select(&compiled).map(Element::new).collect())
    }

    /// The `<body>` element (html5ever always synthesizes one).
    pub fn body(&'_ self) -> Option<Element<'_>> {
        let selector = Selector::parse("body").ok()?;
        self.html.select(&selector).next().map(Element::new)
    }

    /// The root `<html>` element.
    pub fn root(&'_ self) -> Element<'_> {
        Element::new(self.html.root_element())
    }
}

/// One element of a [`Document`].
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Number of characters in the trimmed text nodes below this element.
    pub fn text_len(&self) -> usize {
        self.element.text().map(|t| t.trim().chars().count()).sum()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Descendants matching `selector`.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let compiled = compile(selector)?;
        Ok(self.element.select(&compiled).map(Element::new).collect())
    }

    /// The underlying scraper reference, for tree walks.
    pub fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| NewsdeskError::Config(format!("bad CSS selector '{}': {}", selector, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html lang="es"><head><title>Portada</title></head>
        <body>
            <div id="noticia" class="story"><p>Primer párrafo</p><p>Segundo</p></div>
            <nav><a href="/cultura">Cultura</a></nav>
        </body></html>"#;

    #[test]
    fn test_select_by_class_and_id() {
        let doc = Document::parse(PAGE);
        let stories = doc.select("div.story").unwrap();

        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].attr("id"), Some("noticia"));
        assert_eq!(stories[0].attr("rel"), None);
        assert_eq!(stories[0].tag_name(), "div");
    }

    #[test]
    fn test_nested_select() {
        let doc = Document::parse(PAGE);
        let story = doc.select("#noticia").unwrap().remove(0);
        assert_eq!(story.select("p").unwrap().len(), 2);
        assert!(story.select("a").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(PAGE);
        assert!(matches!(doc.select("[[invalid"), Err(NewsdeskError::Config(_))));
    }

    #[test]
    fn test_text_len_ignores_markup_and_edges() {
        let doc = Document::parse(PAGE);
        let story = doc.select("#noticia").unwrap().remove(0);
        assert_eq!(story.text_len(), "Primer párrafoSegundo".chars().count());
    }

    #[test]
    fn test_body_is_synthesized_for_fragments() {
        let doc = Document::parse("<p>solo un fragmento</p>");
        let body = doc.body().unwrap();
        assert_eq!(body.text_len(), 17);
        assert_eq!(doc.root().tag_name(), "html");
    }
}
