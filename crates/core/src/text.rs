//! Paragraph-aware plain text rendering.
//!
//! Block-level elements end the current paragraph, inline elements flow into
//! it, and whitespace inside a paragraph collapses to single spaces.
//! Paragraphs are separated by one blank line.

use scraper::{ElementRef, Html, Node};

const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "main",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

/// Elements whose text is never rendered.
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template", "title"];

#[derive(Default)]
struct Paragraphs {
    done: Vec<String>,
    current: String,
}

impl Paragraphs {
    fn push_text(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn flush(&mut self) {
        let collapsed = self.current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            self.done.push(collapsed);
        }
        self.current.clear();
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(el) => {
                    let name = el.name();
                    if SKIPPED_ELEMENTS.contains(&name) {
                        continue;
                    }
                    let Some(child_ref) = ElementRef::wrap(child) else { continue };

                    let is_block = BLOCK_ELEMENTS.contains(&name);
                    if is_block {
                        self.flush();
                    }
                    self.walk(child_ref);
                    if is_block {
                        self.flush();
                    }
                }
                _ => {}
            }
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.done.join("\n\n")
    }
}

/// Render the text below an element as paragraphs.
pub fn element_to_text(element: ElementRef<'_>) -> String {
    let mut paragraphs = Paragraphs::default();
    paragraphs.walk(element);
    paragraphs.finish()
}

/// Parse an HTML string and render its whole content as paragraphs.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    element_to_text(document.root_element())
}
