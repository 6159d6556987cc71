//! Block-aware plain text rendering.
//!
//! Block elements are separated by a blank line, `<br>` and list rows by a
//! single newline, and whitespace inside a block collapses to single spaces.

use scraper::ElementRef;

use crate::parse::Element;

/// Elements that start a new paragraph.
const PARAGRAPH_ELEMENTS: &[&str] = &[
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "article",
    "section",
    "main",
    "header",
    "figure",
    "figcaption",
    "table",
    "ul",
    "ol",
    "dl",
    "address",
    "hr",
];

/// Elements that start a new line.
const LINE_ELEMENTS: &[&str] = &["li", "tr", "dt", "dd", "br"];

/// Page chrome. Never rendered, except a `header` inside an article or
/// `main`, which carries the headline.
pub(crate) const CHROME_ELEMENTS: &[&str] = &["nav", "footer", "aside", "header", "form"];

/// Elements whose text is never rendered.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "canvas", "button", "select", "input", "textarea",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Break {
    None,
    Space,
    Line,
    Paragraph,
}

struct Renderer {
    out: String,
    pending: Break,
}

impl Renderer {
    fn new() -> Self {
        Self { out: String::new(), pending: Break::None }
    }

    fn request(&mut self, brk: Break) {
        self.pending = self.pending.max(brk);
    }

    fn push_words(&mut self, words: &str) {
        if !self.out.is_empty() {
            match self.pending {
                Break::None => {}
                Break::Space => self.out.push(' '),
                Break::Line => self.out.push('\n'),
                Break::Paragraph => self.out.push_str("\n\n"),
            }
        }
        self.pending = Break::None;
        self.out.push_str(words);
    }

    fn text(&mut self, text: &str) {
        let words = text.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            if !text.is_empty() {
                self.request(Break::Space);
            }
            return;
        }

        if text.starts_with(char::is_whitespace) {
            self.request(Break::Space);
        }
        self.push_words(&words.join(" "));
        if text.ends_with(char::is_whitespace) {
            self.request(Break::Space);
        }
    }

    fn element(&mut self, el: ElementRef<'_>) {
        let name = el.value().name();
        if SKIPPED_ELEMENTS.contains(&name) || is_page_chrome(el) {
            return;
        }

        let brk = if PARAGRAPH_ELEMENTS.contains(&name) {
            Break::Paragraph
        } else if LINE_ELEMENTS.contains(&name) {
            Break::Line
        } else {
            Break::None
        };

        self.request(brk);
        for child in el.children() {
            if let Some(text) = child.value().as_text() {
                self.text(text);
            } else if let Some(child_el) = ElementRef::wrap(child) {
                self.element(child_el);
            }
        }
        self.request(brk);
    }
}

fn is_page_chrome(el: ElementRef<'_>) -> bool {
    let name = el.value().name();
    if !CHROME_ELEMENTS.contains(&name) {
        return false;
    }
    name != "header" || !el.ancestors().filter_map(ElementRef::wrap).any(|a| matches!(a.value().name(), "article" | "main"))
}

/// Render `elements` as plain text, each one starting a new paragraph.
///
/// # Example
///
/// ```rust
/// use newsdesk_core::parse::Document;
/// use newsdesk_core::text::render_text;
///
/// let doc = Document::parse("<div><p>Eins</p><p>Zwei<br>Drei</p></div>").unwrap();
/// let blocks = doc.select("div").unwrap();
/// assert_eq!(render_text(&blocks), "Eins\n\nZwei\nDrei");
/// ```
pub fn render_text(elements: &[Element<'_>]) -> String {
    let mut renderer = Renderer::new();
    for el in elements {
        renderer.request(Break::Paragraph);
        renderer.element(el.as_ref());
    }
    renderer.out.trim().to_string()
}
