use owo_colors::OwoColorize;

use folio_core::{ContentBlock, ExtractionResult};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Folio".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Convert article pages into DOCX documents\n".dimmed());
}

/// Print a styled step message (verbose mode only)
pub fn print_step(step: usize, total: usize, message: &str, verbose: bool) {
    if verbose {
        eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
    }
}

/// Print an indented label/value pair (verbose mode only)
pub fn print_detail(label: &str, value: &str, verbose: bool) {
    if verbose {
        eprintln!("  {} {}", label.dimmed(), value.bright_white());
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print extraction details summary
pub fn print_summary(result: &ExtractionResult) {
    let count = |pred: fn(&ContentBlock) -> bool| result.blocks.iter().filter(|b| pred(b)).count();

    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Extraction Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "Title:".dimmed(), result.title.bright_white());
    eprintln!("  {} {}", "Author:".dimmed(), result.author_or_default().bright_white());
    if let Some(date) = &result.date {
        eprintln!("  {} {}", "Date:".dimmed(), date.bright_white());
    }
    eprintln!(
        "  {} {} ({} headings, {} paragraphs, {} images, {} lists)",
        "Blocks:".dimmed(),
        result.blocks.len().to_string().bright_white(),
        count(|b| matches!(b, ContentBlock::Heading { .. })),
        count(|b| matches!(b, ContentBlock::Paragraph { .. })),
        count(|b| matches!(b, ContentBlock::Image { .. })),
        count(|b| matches!(b, ContentBlock::List { .. })),
    );
    eprintln!(
        "  {} {}\n",
        "Words:".dimmed(),
        result.word_count().to_string().bright_white()
    );
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
