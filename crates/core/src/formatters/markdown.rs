use crate::article::ExtractionResult;
use crate::block::{ContentBlock, ListStyle};

/// Configuration for Markdown conversion
#[derive(Debug, Clone)]
pub struct MarkdownConfig {
    /// Include TOML frontmatter with metadata
    pub include_frontmatter: bool,
    /// Include title as H1 heading at the start of content; block headings
    /// are shifted down one level to sit below it
    pub include_title_heading: bool,
    /// Strip images from output
    pub strip_images: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { include_frontmatter: true, include_title_heading: true, strip_images: false }
    }
}

/// Convert an extraction result to Markdown with optional frontmatter
pub fn convert_to_markdown(result: &ExtractionResult, config: &MarkdownConfig) -> String {
    let mut output = String::new();

    if config.include_frontmatter {
        output.push_str(&generate_frontmatter(result));
        output.push('\n');
    }

    if config.include_title_heading {
        output.push_str(&format!("# {}\n\n", result.title));
    }

    let offset = u8::from(config.include_title_heading);
    let sections: Vec<String> = result
        .blocks
        .iter()
        .filter(|block| !(config.strip_images && matches!(block, ContentBlock::Image { .. })))
        .map(|block| block_to_markdown(block, offset))
        .collect();

    output.push_str(&sections.join("\n\n"));
    if !sections.is_empty() {
        output.push('\n');
    }
    output
}

fn block_to_markdown(block: &ContentBlock, heading_offset: u8) -> String {
    match block {
        ContentBlock::Heading { level, text } => {
            let level = level.saturating_add(heading_offset).clamp(1, 6) as usize;
            format!("{} {}", "#".repeat(level), text)
        }
        // Trailing double space keeps embedded newlines as hard breaks
        ContentBlock::Paragraph { text } => text.replace('\n', "  \n"),
        ContentBlock::Image { url, alt } => format!("![{}]({})", escape_brackets(alt), url),
        ContentBlock::List { style, items } => items
            .iter()
            .enumerate()
            .map(|(i, item)| match style {
                ListStyle::Bullet => format!("- {}", item),
                ListStyle::Numbered => format!("{}. {}", i + 1, item),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Generate TOML frontmatter from the result's metadata
fn generate_frontmatter(result: &ExtractionResult) -> String {
    let mut frontmatter = String::from("+++");
    frontmatter.push_str(&format!("\ntitle = {}", toml_escape_string(&result.title)));

    if let Some(author) = &result.author {
        frontmatter.push_str(&format!("\nauthor = {}", toml_escape_string(author)));
    }

    if let Some(date) = &result.date {
        frontmatter.push_str(&format!("\ndate = {}", toml_escape_string(date)));
    }

    if let Some(source) = &result.source_url {
        frontmatter.push_str(&format!("\nsource = {}", toml_escape_string(source)));
    }

    frontmatter.push_str(&format!("\nword_count = {}", result.word_count()));
    frontmatter.push_str("\n+++\n");
    frontmatter
}

/// Escape a string for TOML format
fn toml_escape_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n"))
}

fn escape_brackets(s: &str) -> String {
    s.replace('[', "\\[").replace(']', "\\]")
}
