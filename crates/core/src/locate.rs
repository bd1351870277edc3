//! Content root discovery.
//!
//! The content root is the single element holding the article body. Known
//! container conventions are tried first; otherwise the largest generic
//! container above a size threshold wins.

use crate::parse::{Document, Element};

/// Selectors for known article body containers, in priority order.
pub const ROOT_SELECTORS: &[&str] = &[
    "div.rich_media_content",
    "div#js_content",
    "div.article-content",
    "div.content-article",
    "div.wx-article-content",
    "div.rich_media_wrp",
    "[itemprop=\"articleBody\"]",
];

/// Generic containers scanned when no known container matches.
pub const CANDIDATE_TAGS: &str = "div, section, article";

/// Minimum text length for a generic container to qualify as root.
pub const DEFAULT_MIN_ROOT_CHARS: usize = 500;

/// How the content root was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootMatch {
    /// Matched a known container selector.
    Selector(&'static str),
    /// Chosen by the largest-container scan.
    LargestContainer { text_len: usize },
}

/// Locate the content root of a document.
///
/// Returns `None` when no known container matches and no generic container
/// holds more than `min_chars` characters of text.
pub fn locate_root(doc: &Document, min_chars: usize) -> Option<(Element<'_>, RootMatch)> {
    for selector in ROOT_SELECTORS {
        if let Ok(Some(element)) = doc.select_first(selector) {
            return Some((element, RootMatch::Selector(selector)));
        }
    }

    let mut best: Option<(Element<'_>, usize)> = None;
    for element in doc.select(CANDIDATE_TAGS).ok()? {
        let text_len = element.text_len();
        if text_len <= min_chars {
            continue;
        }
        if best.as_ref().is_none_or(|(_, best_len)| text_len > *best_len) {
            best = Some((element, text_len));
        }
    }

    best.map(|(element, text_len)| (element, RootMatch::LargestContainer { text_len }))
}
