//! Typed content blocks produced by extraction.
//!
//! [`RawBlock`] is what the tree walk emits, one entry per DOM node of
//! interest. [`ContentBlock`] is the document-level unit after
//! post-processing has merged inline fragments into paragraphs and grouped
//! list items into lists.

use serde::Serialize;

/// Marker style of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Bullet,
    Numbered,
}

impl ListStyle {
    /// Style implied by the tag name of a list item's parent.
    pub fn from_parent_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("ol") => Self::Numbered,
            _ => Self::Bullet,
        }
    }
}

/// One unit of structured content in final output order.
///
/// Text fields are normalized. Paragraph text may contain single `\n`
/// characters that originate from explicit line breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    Image { url: String, alt: String },
    List { style: ListStyle, items: Vec<String> },
}

impl ContentBlock {
    /// Text used to compare blocks for duplicate detection.
    ///
    /// Images compare by URL, lists by their joined items.
    pub fn dedupe_key(&self) -> String {
        match self {
            Self::Heading { text, .. } | Self::Paragraph { text } => crate::text::normalize(text),
            Self::Image { url, .. } => url.clone(),
            Self::List { items, .. } => items.join("\n"),
        }
    }

    /// Plain text carried by this block (empty for images).
    pub fn plain_text(&self) -> String {
        match self {
            Self::Heading { text, .. } | Self::Paragraph { text } => text.clone(),
            Self::Image { .. } => String::new(),
            Self::List { items, .. } => items.join("\n"),
        }
    }
}

/// Node-level output of the content tree walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBlock {
    /// Significant text not attributed to a paragraph-like container.
    Text(String),
    /// An explicit line break.
    Break,
    /// A single list entry before grouping.
    ListItem { style: ListStyle, text: String },
    Heading { level: u8, text: String },
    Paragraph(String),
    Image { url: String, alt: String },
}
