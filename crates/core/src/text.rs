//! Text normalization helpers shared by every extraction stage.

use regex::Regex;
use std::sync::LazyLock;

/// Matches strings made only of punctuation, symbols and whitespace.
static PUNCTUATION_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{P}\p{S}\s]+$").unwrap());

/// Runs of whitespace other than newlines.
static HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// A newline run together with any spaces around it.
static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?\n[\s]*").unwrap());

/// Normalize a text fragment for output.
///
/// Non-breaking spaces become ordinary spaces, every whitespace run
/// (newlines and tabs included) collapses to a single space and both ends are
/// trimmed. Whitespace-only input yields an empty string.
///
/// ```rust
/// use folio_core::text::normalize;
///
/// assert_eq!(normalize("  Hello\u{a0}\n\t world "), "Hello world");
/// assert_eq!(normalize(" \n "), "");
/// ```
pub fn normalize(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a text fragment carries real content.
///
/// Significant text is at least two characters long after trimming and is not
/// composed entirely of punctuation or symbol characters.
pub fn is_significant(text: &str) -> bool {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}');
    if trimmed.chars().count() < 2 {
        return false;
    }

    !PUNCTUATION_ONLY.is_match(trimmed)
}

/// Final cleanup for paragraph text that may contain line breaks.
///
/// Horizontal whitespace runs collapse to one space, any run of newlines
/// (with the spaces around it) collapses to a single newline, and the
/// result is trimmed.
pub fn clean_paragraph(text: &str) -> String {
    let text = text.replace('\u{a0}', " ");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = NEWLINE_RUN.replace_all(&text, "\n");
    text.trim().to_string()
}
