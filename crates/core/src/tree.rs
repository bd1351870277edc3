//! Content tree extraction.
//!
//! [`extract_raw`] walks the content root depth-first and classifies each
//! node into a [`RawBlock`]. Every call to [`TraversalContext::extract`]
//! returns its own vector; callers concatenate child results in document
//! order, so no output list is threaded through the recursion.
//!
//! [`fallback_scan`] is the flat recovery pass used when the structured walk
//! finds too little.

use ego_tree::NodeId;
use std::collections::HashSet;

use crate::block::{ContentBlock, ListStyle, RawBlock};
use crate::image::resolve_image;
use crate::parse::{Child, Element, is_ignored_tag};
use crate::text::{is_significant, normalize};

/// Default depth bound. The root sits at depth 0.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Containers that own their direct text as a paragraph.
pub const PARAGRAPH_TAGS: &[&str] = &["p", "div", "section", "article"];

/// Elements collected as paragraphs by the fallback scan.
const FALLBACK_PARAGRAPH_SELECTOR: &str = "p, div, section, article, span";
const FALLBACK_HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

/// Parents whose paragraph-like children the fallback scan skips.
const FALLBACK_SKIP_PARENTS: &[&str] = &["li", "blockquote"];

/// Default minimum text length for fallback paragraphs.
pub const DEFAULT_FALLBACK_MIN_CHARS: usize = 20;

/// Heading level for `h1`..`h6`.
pub fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Per-call traversal state: the visited set and the depth bound.
#[derive(Debug, Clone)]
pub struct TraversalContext {
    visited: HashSet<NodeId>,
    max_depth: usize,
    truncated: usize,
}

impl TraversalContext {
    pub fn new(max_depth: usize) -> Self {
        Self { visited: HashSet::new(), max_depth, truncated: 0 }
    }

    /// Number of distinct elements visited so far.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of branches cut off by the depth bound.
    pub fn truncated_branches(&self) -> usize {
        self.truncated
    }

    /// Extract blocks for `element` sitting at `depth`.
    ///
    /// Returns nothing for an element that was already visited, an ignored
    /// element, or one deeper than the bound.
    pub fn extract(&mut self, element: &Element<'_>, depth: usize) -> Vec<RawBlock> {
        if depth > self.max_depth {
            self.truncated += 1;
            return Vec::new();
        }
        if !self.visited.insert(element.id()) {
            return Vec::new();
        }

        let name = element.name();
        if is_ignored_tag(name) {
            return Vec::new();
        }

        match name {
            "img" => image_parts(element)
                .map(|(url, alt)| RawBlock::Image { url, alt })
                .into_iter()
                .collect(),
            "br" => vec![RawBlock::Break],
            "li" => {
                let text = normalize(&element.text());
                if text.is_empty() {
                    return self.extract_children(element, depth);
                }
                let style = ListStyle::from_parent_tag(element.parent_name());
                vec![RawBlock::ListItem { style, text }]
            }
            _ if PARAGRAPH_TAGS.contains(&name) => {
                let mut blocks = Vec::new();
                let direct = normalize(&element.direct_text());
                if is_significant(&direct) {
                    blocks.push(RawBlock::Paragraph(direct));
                }
                for child in element.child_elements() {
                    blocks.extend(self.extract(&child, depth + 1));
                }
                blocks
            }
            _ => match heading_level(name) {
                Some(level) => {
                    let text = normalize(&element.text());
                    if text.is_empty() {
                        return self.extract_children(element, depth);
                    }
                    vec![RawBlock::Heading { level, text }]
                }
                None => self.extract_children(element, depth),
            },
        }
    }

    /// Recurse into every child, text nodes included.
    fn extract_children(&mut self, element: &Element<'_>, depth: usize) -> Vec<RawBlock> {
        let mut blocks = Vec::new();
        for child in element.children() {
            match child {
                Child::Text(text) => {
                    if is_significant(text) {
                        blocks.push(RawBlock::Text(normalize(text)));
                    }
                }
                Child::Element(child) => blocks.extend(self.extract(&child, depth + 1)),
            }
        }
        blocks
    }
}

impl Default for TraversalContext {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Walk `root` and return its raw blocks in document order.
///
/// ```rust
/// use folio_core::Document;
/// use folio_core::block::RawBlock;
/// use folio_core::tree::extract_raw;
///
/// let doc = Document::parse(r#"<div id="root"><p>Hello there</p><br></div>"#).unwrap();
/// let root = doc.select_first("#root").unwrap().unwrap();
///
/// assert_eq!(extract_raw(&root, 20), vec![RawBlock::Paragraph("Hello there".into()), RawBlock::Break]);
/// ```
pub fn extract_raw(root: &Element<'_>, max_depth: usize) -> Vec<RawBlock> {
    TraversalContext::new(max_depth).extract(root, 0)
}

/// Resolved URL and normalized alt text of an `img`.
fn image_parts(element: &Element<'_>) -> Option<(String, String)> {
    let url = resolve_image(element)?;
    let alt = normalize(element.attr("alt").unwrap_or_default());
    Some((url, alt))
}

/// Flat recovery scan over the descendants of `root`.
///
/// Collects, in this category order: paragraph-like elements whose parent is
/// not a list item or quote and whose full text is significant and longer
/// than `min_chars`; non-empty headings; resolvable images. Each category
/// keeps its own document order. The root itself is not collected.
pub fn fallback_scan(root: &Element<'_>, min_chars: usize) -> Vec<ContentBlock> {
    let paragraphs = descendants(root, FALLBACK_PARAGRAPH_SELECTOR)
        .into_iter()
        .filter(|el| !el.parent_name().is_some_and(|parent| FALLBACK_SKIP_PARENTS.contains(&parent)))
        .map(|el| normalize(&el.text()))
        .filter(|text| is_significant(text) && text.chars().count() > min_chars)
        .map(|text| ContentBlock::Paragraph { text });

    let headings = descendants(root, FALLBACK_HEADING_SELECTOR).into_iter().filter_map(|el| {
        let level = heading_level(el.name())?;
        let text = normalize(&el.text());
        (!text.is_empty()).then_some(ContentBlock::Heading { level, text })
    });

    let images = descendants(root, "img")
        .into_iter()
        .filter_map(|el| image_parts(&el))
        .map(|(url, alt)| ContentBlock::Image { url, alt });

    paragraphs.chain(headings).chain(images).collect()
}

/// Elements below `root` matching `selector`, excluding `root` itself.
fn descendants<'a>(root: &Element<'a>, selector: &str) -> Vec<Element<'a>> {
    let root_id = root.id();
    root.select(selector)
        .unwrap_or_default()
        .into_iter()
        .filter(|el| el.id() != root_id)
        .collect()
}
