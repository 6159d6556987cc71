//! Parsed pages and the element handles the extractor walks.
//!
//! # Example
//!
//! ```rust
//! use newsdesk_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::{NewsdeskError, Result};

/// Tags whose content is never article text.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template", "iframe", "svg", "canvas"];

/// Represents a parsed HTML document.
///
/// # Example
///
/// ```rust
/// use newsdesk_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parses HTML from a string as-is.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html, base_url: None })
    }

    /// Parses HTML and drops comments, script, style and other non-content
    /// elements, remembering `base_url` as the document's location.
    ///
    /// JSON-LD blocks are kept so metadata can still be read from them.
    pub fn parse_with_base_url(html: &str, base_url: Option<Url>) -> Result<Self> {
        let mut html = Html::parse_document(html);
        strip_non_content(&mut html);
        Ok(Self { html, base_url })
    }

    /// Gets the URL the document was loaded from, if known.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Serializes the parsed document back to markup.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Elements matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`NewsdeskError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(Element::wrap).collect())
    }

    /// Text of the first `<title>` element.
    pub fn title(&self) -> Option<String> {
        self.select("title").ok()?.first().map(Element::text)
    }

    pub fn body(&'_ self) -> Option<Element<'_>> {
        self.select("body").ok()?.into_iter().next()
    }
}

/// One element of a parsed [`Document`].
///
/// # Example
///
/// ```rust
/// use newsdesk_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn wrap(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    pub fn as_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// All descendant text nodes, concatenated without separators.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// The parent, when it is an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(Element::wrap)
    }

    /// Child elements in document order.
    pub fn child_elements(&self) -> Vec<Element<'a>> {
        self.element.children().filter_map(ElementRef::wrap).map(Element::wrap).collect()
    }

    /// Whether any ancestor has one of the given tag names.
    pub fn has_ancestor(&self, tags: &[&str]) -> bool {
        self.element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| tags.contains(&el.value().name()))
    }

    /// Descendants matching `selector`, in document order.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(Element::wrap).collect())
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| NewsdeskError::HtmlParseError(format!("Invalid selector `{selector}`: {e}")))
}

/// Parse `html` and serialize it back, so every element is explicitly
/// closed the way a browser would close it.
pub(crate) fn normalize(html: &str) -> String {
    Html::parse_document(html).html()
}

/// Detach comments, scripts, styles and other non-content elements.
fn strip_non_content(html: &mut Html) {
    let doomed: Vec<_> = html
        .tree
        .nodes()
        .filter(|node| match node.value() {
            Node::Comment(_) => true,
            Node::Element(el) => {
                NON_CONTENT_TAGS.contains(&el.name())
                    && !el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("application/ld+json"))
            }
            _ => false,
        })
        .map(|node| node.id())
        .collect();

    for id in doomed {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="de">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
            <script>var tracking = true;</script>
            <script type="application/ld+json">{"headline": "Schlagzeile"}</script>
        </head>
        <body>
            <h1>Heading</h1>
            <!-- comment -->
            <div id="wrap"><p class="content">Paragraph 1</p></div>
            <p class="content">Paragraph 2</p>
            <a href="https://example.com">Link</a>
            <style>p { color: red; }</style>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(NewsdeskError::HtmlParseError(_))));
    }

    #[test]
    fn test_parse_with_base_url_strips_non_content() {
        let base = Url::parse("https://www.example.de/news/artikel.html").unwrap();
        let doc = Document::parse_with_base_url(SAMPLE_HTML, Some(base.clone())).unwrap();
        let html = doc.as_string();

        assert!(!html.contains("tracking"));
        assert!(!html.contains("color: red"));
        assert!(!html.contains("comment"));
        assert!(html.contains("Schlagzeile"));
        assert_eq!(doc.base_url(), Some(&base));
    }

    #[test]
    fn test_normalize_closes_implicit_end_tags() {
        let html = normalize(r#"<p class="teaser">Anriss<div>Text</div><ul><li>A<li>B</ul>"#);
        assert!(html.contains(r#"<p class="teaser">Anriss</p><div>Text</div>"#));
        assert!(html.contains("<li>A</li><li>B</li>"));
    }

    #[test]
    fn test_element_navigation() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let first = doc.select("p.content").unwrap().remove(0);

        let parent = first.parent().unwrap();
        assert_eq!(parent.attr("id"), Some("wrap"));
        assert_eq!(parent.child_elements().len(), 1);
        assert!(first.has_ancestor(&["div"]));
        assert!(!first.has_ancestor(&["nav"]));
        assert_eq!(parent.child_elements()[0], first);
    }
}
