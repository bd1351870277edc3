//! Metadata discovery through ordered strategy lists.
//!
//! Each field (title, author, date) is resolved by trying a fixed list of
//! [`Strategy`] descriptors in priority order: known page conventions first,
//! generic heuristics last. A strategy only produces candidate strings; the
//! [`Acceptance`] rule decides which candidate, if any, is kept.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::Document;
use crate::text::normalize;

/// Numeric date shapes accepted for the date field.
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}|\d{4}年\d{1,2}月\d{1,2}日").unwrap()
});

/// One rule for locating a metadata value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Text content of elements matching a CSS selector.
    Css(&'static str),
    /// `content` attribute of `meta[name=..]` or `meta[property=..]`.
    Meta(&'static str),
    /// The `h1` or `h2` with the longest text.
    LargestHeading,
    /// The document's `<title>` element.
    DocumentTitle,
}

impl Strategy {
    /// Normalized, non-empty candidate values in document order.
    ///
    /// An invalid selector yields no candidates.
    pub fn candidates(&self, doc: &Document) -> Vec<String> {
        let raw: Vec<String> = match self {
            Self::Css(selector) => doc
                .select(selector)
                .map(|elements| elements.iter().map(|el| el.text()).collect())
                .unwrap_or_default(),
            Self::Meta(name) => doc.meta_contents(name),
            Self::LargestHeading => doc.largest_heading().into_iter().collect(),
            Self::DocumentTitle => doc.title().into_iter().collect(),
        };

        raw.iter()
            .map(|value| normalize(value))
            .filter(|value| !value.is_empty())
            .collect()
    }
}

/// How a strategy's candidates are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// The first non-empty candidate.
    First,
    /// The first candidate containing a numeric date.
    DateShaped,
}

impl Acceptance {
    fn pick(&self, candidates: Vec<String>) -> Option<String> {
        match self {
            Self::First => candidates.into_iter().next(),
            Self::DateShaped => candidates.into_iter().find(|value| DATE_PATTERN.is_match(value)),
        }
    }
}

/// Title strategies in priority order.
pub const TITLE_STRATEGIES: &[Strategy] = &[
    Strategy::Css("h1.rich_media_title"),
    Strategy::Css("h1#activity-name"),
    Strategy::Css("h1.activity-name"),
    Strategy::Css("div.rich_media_content h1"),
    Strategy::Css("h2.rich_media_title"),
    Strategy::Css("h1.title"),
    Strategy::Css("div.title"),
    Strategy::Meta("og:title"),
    Strategy::Meta("twitter:title"),
    Strategy::LargestHeading,
    Strategy::DocumentTitle,
];

/// Author strategies in priority order.
pub const AUTHOR_STRATEGIES: &[Strategy] = &[
    Strategy::Css("a.wx_tap_link"),
    Strategy::Css("a.rich_media_meta_link"),
    Strategy::Css("span.rich_media_meta_text"),
    Strategy::Css("div#js_profile_qrcode strong.profile_nickname"),
    Strategy::Css("div.profile_nickname"),
    Strategy::Css("#js_name"),
    Strategy::Meta("author"),
    Strategy::Css("span.author"),
];

/// Publication date strategies in priority order.
pub const DATE_STRATEGIES: &[Strategy] = &[
    Strategy::Css("#publish_time"),
    Strategy::Css(".publish_time"),
    Strategy::Css(".post-date"),
    Strategy::Css(".rich_media_createtime"),
    Strategy::Css("em.rich_media_meta_text"),
    Strategy::Css("time"),
    Strategy::Meta("article:published_time"),
];

/// Try each strategy in order and return the first accepted value.
///
/// Strategies that produce no acceptable candidate fall through to the next
/// one. Returns `None` when the list is exhausted.
///
/// ```rust
/// use folio_core::Document;
/// use folio_core::metadata::{Acceptance, Strategy, resolve};
///
/// let doc = Document::parse(r#"<div class="by"> Jane   Doe </div>"#).unwrap();
/// let author = resolve(&doc, &[Strategy::Css("span.by"), Strategy::Css("div.by")], Acceptance::First);
/// assert_eq!(author.as_deref(), Some("Jane Doe"));
/// ```
pub fn resolve(doc: &Document, strategies: &[Strategy], acceptance: Acceptance) -> Option<String> {
    strategies
        .iter()
        .find_map(|strategy| acceptance.pick(strategy.candidates(doc)))
}

/// Title, author and date discovered for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

impl Document {
    /// Resolve the article title through [`TITLE_STRATEGIES`].
    pub fn extract_title(&self) -> Option<String> {
        resolve(self, TITLE_STRATEGIES, Acceptance::First)
    }

    /// Resolve the author through [`AUTHOR_STRATEGIES`].
    pub fn extract_author(&self) -> Option<String> {
        resolve(self, AUTHOR_STRATEGIES, Acceptance::First)
    }

    /// Resolve the publication date through [`DATE_STRATEGIES`].
    ///
    /// Only values containing a numeric date are accepted, e.g. `2024-03-01`,
    /// `1/3/2024` or `2024年3月1日`.
    pub fn extract_date(&self) -> Option<String> {
        resolve(self, DATE_STRATEGIES, Acceptance::DateShaped)
    }

    /// Extract all metadata fields.
    pub fn extract_metadata(&self) -> Metadata {
        Metadata { title: self.extract_title(), author: self.extract_author(), date: self.extract_date() }
    }

    /// `content` values of `meta[name=..]` tags, then `meta[property=..]` tags.
    fn meta_contents(&self, attr: &str) -> Vec<String> {
        ["name", "property"]
            .iter()
            .filter_map(|key| self.select(&format!("meta[{}=\"{}\"]", key, attr)).ok())
            .flatten()
            .filter_map(|el| el.attr("content").map(str::to_string))
            .collect()
    }

    /// Text of the longest `h1`/`h2`; the earliest heading wins ties.
    fn largest_heading(&self) -> Option<String> {
        let headings = self.select("h1, h2").ok()?;
        let mut best: Option<(usize, String)> = None;

        for heading in headings {
            let text = normalize(&heading.text());
            let len = text.chars().count();
            if len == 0 {
                continue;
            }
            if best.as_ref().is_none_or(|(best_len, _)| len > *best_len) {
                best = Some((len, text));
            }
        }

        best.map(|(_, text)| text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Document {
        Document::parse(html).unwrap()
    }

    #[test]
    fn test_title_from_known_class() {
        let doc = doc(r#"<html><head><title>Page</title></head><body>
            <h1 class="rich_media_title">
                Real   Title
            </h1></body></html>"#);
        assert_eq!(doc.extract_title(), Some("Real Title".to_string()));
    }

    #[test]
    fn test_title_from_meta() {
        let doc = doc(r#"<html><head><meta property="og:title" content="OG Title"><title>Page</title></head></html>"#);
        assert_eq!(doc.extract_title(), Some("OG Title".to_string()));
    }

    #[test]
    fn test_title_from_largest_heading() {
        let doc = doc(r#"<html><head><title>Page</title></head><body>
            <h2>Short</h2><h1>A much longer heading</h1><h2>Another long heading!!</h2></body></html>"#);
        assert_eq!(doc.extract_title(), Some("Another long heading!!".to_string()));
    }

    #[test]
    fn test_largest_heading_first_wins_ties() {
        let doc = doc("<h1>abcd</h1><h2>wxyz</h2>");
        assert_eq!(doc.largest_heading(), Some("abcd".to_string()));
    }

    #[test]
    fn test_title_from_document_title() {
        let doc = doc("<html><head><title> Page  Title </title></head><body><p>x</p></body></html>");
        assert_eq!(doc.extract_title(), Some("Page Title".to_string()));
    }

    #[test]
    fn test_title_absent() {
        let doc = doc("<html><body><p>nothing</p></body></html>");
        assert_eq!(doc.extract_title(), None);
    }

    #[test]
    fn test_empty_match_falls_through() {
        let doc = doc(r#"<h1 class="rich_media_title">   </h1><h1 class="title">Fallback</h1>"#);
        assert_eq!(doc.extract_title(), Some("Fallback".to_string()));
    }

    #[test]
    fn test_author_priority() {
        let doc = doc(r#"<html><head><meta name="author" content="Meta Author"></head><body>
            <span class="author">Span Author</span>
            <a class="rich_media_meta_link">Link Author</a></body></html>"#);
        assert_eq!(doc.extract_author(), Some("Link Author".to_string()));
    }

    #[test]
    fn test_author_from_meta() {
        let doc = doc(r#"<html><head><meta name="author" content="Meta Author"></head><body></body></html>"#);
        assert_eq!(doc.extract_author(), Some("Meta Author".to_string()));
    }

    #[test]
    fn test_date_requires_numeric_pattern() {
        let doc = doc(r#"<em class="rich_media_meta_text">Original</em>
            <em class="rich_media_meta_text">2024-03-01 08:00</em>"#);
        assert_eq!(doc.extract_date(), Some("2024-03-01 08:00".to_string()));
    }

    #[test]
    fn test_date_shapes() {
        for value in ["2024/3/1", "1-3-2024", "01/03/2024", "2024年3月1日"] {
            let doc = doc(&format!(r#"<span id="publish_time">{}</span>"#, value));
            assert_eq!(doc.extract_date(), Some(value.to_string()), "rejected {}", value);
        }
    }

    #[test]
    fn test_date_rejects_text() {
        let doc = doc(r#"<span id="publish_time">yesterday</span><time>last week</time>"#);
        assert_eq!(doc.extract_date(), None);
    }

    #[test]
    fn test_date_from_meta() {
        let doc = doc(r#"<meta property="article:published_time" content="2023-11-05T10:00:00Z">"#);
        assert_eq!(doc.extract_date(), Some("2023-11-05T10:00:00Z".to_string()));
    }

    #[test]
    fn test_strategy_candidates_independent() {
        let doc = doc(r#"<p class="x">one</p><p class="x"> </p><p class="x">two</p>"#);
        assert_eq!(Strategy::Css("p.x").candidates(&doc), vec!["one", "two"]);
        assert!(Strategy::Css("[[bad").candidates(&doc).is_empty());
        assert!(Strategy::Meta("missing").candidates(&doc).is_empty());
    }

    #[test]
    fn test_extract_metadata() {
        let doc = doc(r#"<h1 class="rich_media_title">T</h1><a id="js_name">Acct</a><em id="publish_time">2024-01-02</em>"#);
        let metadata = doc.extract_metadata();

        assert_eq!(metadata.title.as_deref(), Some("T"));
        assert_eq!(metadata.author.as_deref(), Some("Acct"));
        assert_eq!(metadata.date.as_deref(), Some("2024-01-02"));
    }
}
