//! Lowering of node-level raw blocks into document-level content blocks.
//!
//! The tree walk emits one block per DOM node. Here adjacent inline
//! fragments merge into paragraphs and consecutive list items of one style
//! group into a list; headings and images act as boundaries.

use std::collections::HashSet;

use crate::block::{ContentBlock, ListStyle, RawBlock};
use crate::text::clean_paragraph;

/// Carry-over state of the single forward pass.
#[derive(Debug, Default)]
struct Accumulator {
    output: Vec<ContentBlock>,
    paragraph: Option<String>,
    list: Option<(ListStyle, Vec<String>)>,
}

impl Accumulator {
    fn push(&mut self, block: RawBlock) {
        match block {
            RawBlock::ListItem { style, text } => {
                self.flush_paragraph();
                match &mut self.list {
                    Some((open, items)) if *open == style => items.push(text),
                    _ => {
                        self.flush_list();
                        self.list = Some((style, vec![text]));
                    }
                }
            }
            RawBlock::Text(text) | RawBlock::Paragraph(text) => {
                self.flush_list();
                match &mut self.paragraph {
                    Some(buffer) => {
                        buffer.push(' ');
                        buffer.push_str(&text);
                    }
                    None => self.paragraph = Some(text),
                }
            }
            RawBlock::Break => {
                self.flush_list();
                if let Some(buffer) = &mut self.paragraph {
                    buffer.push('\n');
                }
            }
            RawBlock::Heading { level, text } => {
                self.flush_list();
                self.flush_paragraph();
                self.output.push(ContentBlock::Heading { level, text });
            }
            RawBlock::Image { url, alt } => {
                self.flush_list();
                self.flush_paragraph();
                self.output.push(ContentBlock::Image { url, alt });
            }
        }
    }

    fn flush_paragraph(&mut self) {
        if let Some(text) = self.paragraph.take() {
            self.output.push(ContentBlock::Paragraph { text });
        }
    }

    fn flush_list(&mut self) {
        if let Some((style, items)) = self.list.take() {
            self.output.push(ContentBlock::List { style, items });
        }
    }

    fn finish(mut self) -> Vec<ContentBlock> {
        self.flush_paragraph();
        self.flush_list();
        self.output
    }
}

/// Merge raw blocks into the final block sequence.
///
/// Paragraph text gets a final cleanup: whitespace runs collapse, newline
/// runs collapse to one newline, ends are trimmed. Paragraphs left empty
/// are dropped.
///
/// ```rust
/// use folio_core::block::{ContentBlock, RawBlock};
/// use folio_core::postprocess::postprocess;
///
/// let blocks = postprocess(vec![RawBlock::Text("Hello".into()), RawBlock::Text("world".into())]);
/// assert_eq!(blocks, vec![ContentBlock::Paragraph { text: "Hello world".into() }]);
/// ```
pub fn postprocess(raw: Vec<RawBlock>) -> Vec<ContentBlock> {
    let mut acc = Accumulator::default();
    for block in raw {
        acc.push(block);
    }

    acc.finish()
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Paragraph { text } => {
                let text = clean_paragraph(&text);
                (!text.is_empty()).then_some(ContentBlock::Paragraph { text })
            }
            other => Some(other),
        })
        .collect()
}

/// Append fallback blocks after the primary output.
///
/// With `dedupe` set, a fallback block whose [`ContentBlock::dedupe_key`]
/// matches an already present block (or an earlier fallback block) is
/// dropped. Returns the number of blocks appended.
pub fn append_fallback(blocks: &mut Vec<ContentBlock>, fallback: Vec<ContentBlock>, dedupe: bool) -> usize {
    let before = blocks.len();
    if !dedupe {
        blocks.extend(fallback);
        return blocks.len() - before;
    }

    let mut seen: HashSet<String> = blocks.iter().map(ContentBlock::dedupe_key).collect();
    for block in fallback {
        if seen.insert(block.dedupe_key()) {
            blocks.push(block);
        }
    }
    blocks.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawBlock {
        RawBlock::Text(s.to_string())
    }

    fn item(style: ListStyle, s: &str) -> RawBlock {
        RawBlock::ListItem { style, text: s.to_string() }
    }

    fn para(s: &str) -> ContentBlock {
        ContentBlock::Paragraph { text: s.to_string() }
    }

    #[test]
    fn test_merge_adjacent_text() {
        assert_eq!(postprocess(vec![text("Hello"), text("world")]), vec![para("Hello world")]);
    }

    #[test]
    fn test_list_flushed_before_heading() {
        let blocks = postprocess(vec![
            item(ListStyle::Bullet, "A"),
            item(ListStyle::Bullet, "B"),
            RawBlock::Heading { level: 1, text: "X".into() },
        ]);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::List { style: ListStyle::Bullet, items: vec!["A".into(), "B".into()] },
                ContentBlock::Heading { level: 1, text: "X".into() },
            ]
        );
    }

    #[test]
    fn test_style_switch_splits_lists() {
        let blocks = postprocess(vec![item(ListStyle::Bullet, "A"), item(ListStyle::Numbered, "B")]);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::List { style: ListStyle::Bullet, items: vec!["A".into()] },
                ContentBlock::List { style: ListStyle::Numbered, items: vec!["B".into()] },
            ]
        );
    }

    #[test]
    fn test_list_item_flushes_paragraph() {
        let blocks = postprocess(vec![text("Intro"), item(ListStyle::Numbered, "One"), text("Outro")]);
        assert_eq!(
            blocks,
            vec![
                para("Intro"),
                ContentBlock::List { style: ListStyle::Numbered, items: vec!["One".into()] },
                para("Outro"),
            ]
        );
    }

    #[test]
    fn test_break_inside_paragraph() {
        let blocks = postprocess(vec![text("line one"), RawBlock::Break, RawBlock::Break, text("line two")]);
        assert_eq!(blocks, vec![para("line one\nline two")]);
    }

    #[test]
    fn test_break_without_paragraph_ignored() {
        let blocks = postprocess(vec![RawBlock::Break, RawBlock::Heading { level: 2, text: "H".into() }]);
        assert_eq!(blocks, vec![ContentBlock::Heading { level: 2, text: "H".into() }]);
    }

    #[test]
    fn test_trailing_break_trimmed() {
        assert_eq!(postprocess(vec![text("tail"), RawBlock::Break]), vec![para("tail")]);
    }

    #[test]
    fn test_image_splits_paragraphs() {
        let blocks = postprocess(vec![
            RawBlock::Paragraph("Before".into()),
            RawBlock::Image { url: "https://x/y.jpg".into(), alt: String::new() },
            text("After"),
        ]);
        assert_eq!(
            blocks,
            vec![
                para("Before"),
                ContentBlock::Image { url: "https://x/y.jpg".into(), alt: String::new() },
                para("After"),
            ]
        );
    }

    #[test]
    fn test_flush_at_end() {
        let blocks = postprocess(vec![text("Open"), RawBlock::Paragraph("paragraph".into())]);
        assert_eq!(blocks, vec![para("Open paragraph")]);

        let blocks = postprocess(vec![item(ListStyle::Bullet, "only")]);
        assert_eq!(blocks, vec![ContentBlock::List { style: ListStyle::Bullet, items: vec!["only".into()] }]);
    }

    #[test]
    fn test_empty_input() {
        assert!(postprocess(Vec::new()).is_empty());
    }

    #[test]
    fn test_append_fallback_dedupes() {
        let mut blocks = vec![para("Kept paragraph")];
        let fallback = vec![
            para("Kept  paragraph"),
            para("New paragraph"),
            para("New paragraph"),
            ContentBlock::Image { url: "https://x/y.jpg".into(), alt: String::new() },
        ];

        let added = append_fallback(&mut blocks, fallback, true);

        assert_eq!(added, 2);
        assert_eq!(blocks[1], para("New paragraph"));
    }

    #[test]
    fn test_append_fallback_without_dedupe() {
        let mut blocks = vec![para("Same")];
        let added = append_fallback(&mut blocks, vec![para("Same")], false);

        assert_eq!(added, 1);
        assert_eq!(blocks.len(), 2);
    }
}
