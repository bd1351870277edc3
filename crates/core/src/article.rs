//! Extraction result type and format conversion.
//!
//! [`ExtractionResult`] is plain owned data: it holds no references into the
//! parsed document, so the document can be dropped as soon as extraction
//! returns.

use serde::Serialize;

use crate::Result;
use crate::block::ContentBlock;
use crate::formatters::json::convert_to_json;
use crate::formatters::markdown::{MarkdownConfig, convert_to_markdown};

/// Author shown when none could be resolved.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Text output formats. DOCX is binary and written straight to disk, see
/// [`crate::formatters::docx`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown with TOML frontmatter.
    Markdown,
    /// JSON (structured data).
    Json,
}

/// The complete result of extracting one article page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub title: String,
    pub author: Option<String>,
    pub date: Option<String>,
    /// Page URL when the markup was fetched or a URL was supplied.
    pub source_url: Option<String>,
    /// Content blocks in document order.
    pub blocks: Vec<ContentBlock>,
}

impl ExtractionResult {
    /// Author, or [`UNKNOWN_AUTHOR`] when absent.
    pub fn author_or_default(&self) -> &str {
        self.author.as_deref().unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Image URLs referenced by the blocks, in order, without duplicates.
    pub fn image_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        for block in &self.blocks {
            if let ContentBlock::Image { url, .. } = block
                && !urls.contains(&url.as_str())
            {
                urls.push(url);
            }
        }
        urls
    }

    /// Word count over all text blocks. CJK characters count as one word each.
    pub fn word_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| count_words(&block.plain_text()))
            .sum()
    }

    /// Converts the result to the specified text format.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Markdown => Ok(self.to_markdown()),
            OutputFormat::Json => convert_to_json(self, true),
        }
    }

    /// Gets the result as Markdown with TOML frontmatter.
    pub fn to_markdown(&self) -> String {
        convert_to_markdown(self, &MarkdownConfig::default())
    }

    /// Gets the result as Markdown with custom configuration.
    pub fn to_markdown_with_config(&self, config: &MarkdownConfig) -> String {
        convert_to_markdown(self, config)
    }

    /// Gets the result as a `serde_json::Value`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for c in text.chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                count += 1;
            }
            in_word = true;
        } else {
            in_word = false;
        }
    }
    count
}

fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}' | '\u{3040}'..='\u{30ff}' | '\u{ac00}'..='\u{d7af}')
}
