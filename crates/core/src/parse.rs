//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the DOM tree using CSS selectors. The extraction
//! pipeline only ever reads through these wrappers; it never mutates the
//! parsed tree.
//!
//! # Example
//!
//! ```rust
//! use folio_core::parse::Document;
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

use ego_tree::NodeId;
use ego_tree::iter::Edge;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::preprocess::{self, PreprocessConfig};
use crate::{FolioError, Result};

/// Elements whose content is never treated as article text.
pub const IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Whether an element name belongs to [`IGNORED_TAGS`].
pub fn is_ignored_tag(name: &str) -> bool {
    IGNORED_TAGS.contains(&name)
}

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors.
///
/// # Example
///
/// ```rust
/// use folio_core::parse::Document;
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
    /// Parses HTML from a string without preprocessing.
    ///
    /// Script and style elements stay in the tree; the extractor skips them
    /// while walking.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html, base_url: None })
    }

    /// Parses HTML from a string with preprocessing.
    ///
    /// Removes scripts, styles and comments, and resolves relative image
    /// references against `base_url` when one is given.
    pub fn parse_with_preprocessing(html: &str, base_url: Option<Url>) -> Result<Self> {
        let config = PreprocessConfig { base_url: base_url.clone(), ..Default::default() };

        let cleaned = preprocess::preprocess_html(html, &config);
        let html = Html::parse_document(&cleaned);

        Ok(Self { html, base_url })
    }

    /// Gets the base URL used for preprocessing.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// The `<html>` element of the document.
    pub fn root_element(&self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use folio_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the title of the document.
    ///
    /// Returns the content of the `<title>` element if present.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    /// Gets all visible text content from the document.
    pub fn text_content(&self) -> String {
        self.root_element().text()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| FolioError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A direct child of an element: either a nested element or a text node.
#[derive(Clone, Debug)]
pub enum Child<'a> {
    Element(Element<'a>),
    Text(&'a str),
}

/// A wrapper around scraper's ElementRef for easier DOM navigation.
///
/// # Example
///
/// ```rust
/// use folio_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Stable identity of this node within its document.
    pub fn id(&self) -> NodeId {
        self.element.id()
    }

    /// Gets the visible text content of this element.
    ///
    /// Concatenates every descendant text node, skipping the content of
    /// script, style, noscript and template elements.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut ignored_depth = 0usize;

        for edge in self.element.traverse() {
            match edge {
                Edge::Open(node) => match node.value() {
                    Node::Element(el) if is_ignored_tag(el.name()) => ignored_depth += 1,
                    Node::Text(text) if ignored_depth == 0 => out.push_str(text),
                    _ => {}
                },
                Edge::Close(node) => {
                    if let Node::Element(el) = node.value()
                        && is_ignored_tag(el.name())
                    {
                        ignored_depth = ignored_depth.saturating_sub(1);
                    }
                }
            }
        }

        out
    }

    /// Number of characters of visible text in this element.
    pub fn text_len(&self) -> usize {
        self.text().chars().count()
    }

    /// Concatenation of this element's immediate text-node children.
    ///
    /// Text belonging to nested elements is excluded.
    pub fn direct_text(&self) -> String {
        self.element
            .children()
            .filter_map(|child| match child.value() {
                Node::Text(text) => Some(&**text),
                _ => None,
            })
            .collect()
    }

    /// Direct children in document order, comments and other node kinds
    /// omitted.
    pub fn children(&self) -> Vec<Child<'a>> {
        self.element
            .children()
            .filter_map(|child| match child.value() {
                Node::Text(text) => Some(Child::Text(&**text)),
                Node::Element(_) => ElementRef::wrap(child).map(|element| Child::Element(Element { element })),
                _ => None,
            })
            .collect()
    }

    /// Direct element children in document order.
    pub fn child_elements(&self) -> Vec<Element<'a>> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|element| Element { element })
            .collect()
    }

    /// Tag name of the parent element, if the parent is an element.
    pub fn parent_name(&self) -> Option<&'a str> {
        self.element
            .parent()
            .and_then(|parent| parent.value().as_element())
            .map(|el| el.name())
    }

    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Borrowed tag name as produced by the parser (already lowercase for HTML).
    pub fn name(&self) -> &'a str {
        self.element.value().name()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }
}
