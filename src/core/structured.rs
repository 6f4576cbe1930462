//! Block model for the structured editor
//!
//! The structured editor still stores markdown, but treats every line as a
//! block with a kind (heading, quote, list item) and every fenced code region
//! as a single block. Slash commands use the same tokenizer as the plain
//! editor; instead of inserting a prefix they toggle the kind of the block
//! holding the cursor.

use std::ops::Range;

use thiserror::Error;

use super::commands::{byte_index, tokenize, CommandMatch, CommandTable, SlashCommand};

const FENCE: &str = "```";

/// Kind of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    /// Heading level 1-6
    Heading(u8),
    Quote,
    BulletItem,
    OrderedItem,
    CodeBlock,
}

/// Structural operation triggered by a slash command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOp {
    ToggleHeading(u8),
    ToggleQuote,
    ToggleBulletList,
    ToggleOrderedList,
    ToggleCodeBlock,
}

impl BlockOp {
    /// Kind a block takes when the op switches it on
    fn target(self) -> BlockKind {
        match self {
            BlockOp::ToggleHeading(level) => BlockKind::Heading(level),
            BlockOp::ToggleQuote => BlockKind::Quote,
            BlockOp::ToggleBulletList => BlockKind::BulletItem,
            BlockOp::ToggleOrderedList => BlockKind::OrderedItem,
            BlockOp::ToggleCodeBlock => BlockKind::CodeBlock,
        }
    }
}

impl SlashCommand {
    /// Structural effect of the command
    pub fn block_op(&self) -> BlockOp {
        match self {
            SlashCommand::Heading1 => BlockOp::ToggleHeading(1),
            SlashCommand::Heading2 => BlockOp::ToggleHeading(2),
            SlashCommand::Heading3 => BlockOp::ToggleHeading(3),
            SlashCommand::Quote => BlockOp::ToggleQuote,
            SlashCommand::BulletList => BlockOp::ToggleBulletList,
            SlashCommand::OrderedList => BlockOp::ToggleOrderedList,
            SlashCommand::CodeBlock => BlockOp::ToggleCodeBlock,
        }
    }
}

impl BlockKind {
    /// Apply a toggle: the matching kind reverts to a paragraph
    pub fn toggle(self, op: BlockOp) -> BlockKind {
        let target = op.target();
        if self == target {
            BlockKind::Paragraph
        } else {
            target
        }
    }

    /// Markdown prefix written before the block text
    fn prefix(&self) -> String {
        match self {
            BlockKind::Paragraph | BlockKind::CodeBlock => String::new(),
            BlockKind::Heading(level) => format!("{} ", "#".repeat(*level as usize)),
            BlockKind::Quote => "> ".to_string(),
            BlockKind::BulletItem => "- ".to_string(),
            BlockKind::OrderedItem => "1. ".to_string(),
        }
    }
}

/// A block with its char range in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Plain-text projection (markdown prefix and fences removed)
    pub text: String,
    /// Char range of the block's source, excluding the trailing newline
    pub range: Range<usize>,
    /// Chars of markdown syntax before `text` on the first line
    pub prefix_len: usize,
}

impl Block {
    /// Render the block back to markdown
    pub fn to_markdown(&self) -> String {
        match self.kind {
            BlockKind::CodeBlock => format!("{FENCE}\n{}\n{FENCE}", self.text),
            kind => format!("{}{}", kind.prefix(), self.text),
        }
    }

    /// Check if the char position falls on this block (end inclusive)
    pub fn contains(&self, cursor: usize) -> bool {
        cursor >= self.range.start && cursor <= self.range.end
    }
}

/// Errors from structural editing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuredError {
    #[error("selection spans blocks {first} to {last}; only single-block commands are supported")]
    SelectionSpansBlocks { first: usize, last: usize },
}

/// Split a single line into kind, projected text and prefix length
fn classify_line(line: &str) -> (BlockKind, &str, usize) {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes) {
        if let Some(text) = line[hashes..].strip_prefix(' ') {
            return (BlockKind::Heading(hashes as u8), text, hashes + 1);
        }
    }

    if let Some(text) = line.strip_prefix("> ") {
        return (BlockKind::Quote, text, 2);
    }
    if line == ">" {
        return (BlockKind::Quote, "", 1);
    }

    if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return (BlockKind::BulletItem, text, 2);
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(text) = line[digits..].strip_prefix(". ") {
            return (BlockKind::OrderedItem, text, digits + 2);
        }
    }

    (BlockKind::Paragraph, line, 0)
}

/// Parse markdown into blocks
pub fn parse_blocks(buffer: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pos = 0;
    // (start, inner lines) of an open fence
    let mut fence: Option<(usize, Vec<&str>)> = None;

    for line in buffer.split('\n') {
        let start = pos;
        let end = start + line.chars().count();
        pos = end + 1;

        if let Some((fence_start, lines)) = fence.as_mut() {
            if line.trim_start().starts_with(FENCE) {
                blocks.push(Block {
                    kind: BlockKind::CodeBlock,
                    text: lines.join("\n"),
                    range: *fence_start..end,
                    prefix_len: 0,
                });
                fence = None;
            } else {
                lines.push(line);
            }
            continue;
        }

        if line.trim_start().starts_with(FENCE) {
            fence = Some((start, Vec::new()));
            continue;
        }

        let (kind, text, prefix_len) = classify_line(line);
        blocks.push(Block {
            kind,
            text: text.to_string(),
            range: start..end,
            prefix_len,
        });
    }

    // Unclosed fence runs to the end of the buffer
    if let Some((fence_start, lines)) = fence {
        blocks.push(Block {
            kind: BlockKind::CodeBlock,
            text: lines.join("\n"),
            range: fence_start..pos.saturating_sub(1),
            prefix_len: 0,
        });
    }

    blocks
}

/// Find the block containing a char position
pub fn block_at(blocks: &[Block], cursor: usize) -> Option<usize> {
    blocks.iter().position(|block| block.contains(cursor))
}

/// Apply a slash command to the block holding the cursor.
///
/// `anchor` is the other end of the selection; a selection covering more than
/// one block is rejected rather than merged. Code blocks are literal and never
/// match.
pub fn apply_block_command(
    buffer: &str,
    anchor: usize,
    cursor: usize,
    table: &CommandTable,
) -> Result<Option<CommandMatch>, StructuredError> {
    let total = buffer.chars().count();
    let cursor = cursor.min(total);
    let anchor = anchor.min(total);

    let blocks = parse_blocks(buffer);
    let (Some(idx), Some(anchor_idx)) = (block_at(&blocks, cursor), block_at(&blocks, anchor))
    else {
        return Ok(None);
    };
    if idx != anchor_idx {
        return Err(StructuredError::SelectionSpansBlocks {
            first: idx.min(anchor_idx),
            last: idx.max(anchor_idx),
        });
    }

    let block = &blocks[idx];
    if block.kind == BlockKind::CodeBlock {
        return Ok(None);
    }

    let offset = cursor - block.range.start;
    if offset < block.prefix_len {
        return Ok(None);
    }
    let projected = &block.text[..byte_index(&block.text, offset - block.prefix_len)];
    let Some(line) = tokenize(projected, table) else {
        return Ok(None);
    };

    let updated = Block {
        kind: block.kind.toggle(line.command.block_op()),
        text: line.content,
        range: block.range.clone(),
        prefix_len: 0,
    };

    let mut new_before = buffer[..byte_index(buffer, block.range.start)].to_string();
    new_before.push_str(&updated.to_markdown());

    let cursor_after = new_before.chars().count() + 1;
    let mut new_buffer = new_before;
    new_buffer.push('\n');
    new_buffer.push_str(&buffer[byte_index(buffer, cursor)..]);

    Ok(Some(CommandMatch {
        buffer: new_buffer,
        cursor: cursor_after,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(buffer: &str, cursor: usize) -> Option<CommandMatch> {
        apply_block_command(buffer, cursor, cursor, &CommandTable::structured()).unwrap()
    }

    #[test]
    fn test_parse_line_kinds() {
        let blocks = parse_blocks("# Title\n> quoted\n- item\n12. step\nplain\n#nospace");
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading(1),
                BlockKind::Quote,
                BlockKind::BulletItem,
                BlockKind::OrderedItem,
                BlockKind::Paragraph,
                BlockKind::Paragraph,
            ]
        );
        assert_eq!(blocks[0].text, "Title");
        assert_eq!(blocks[3].text, "step");
        assert_eq!(blocks[3].prefix_len, 4);
        assert_eq!(blocks[1].range, 8..16);
    }

    #[test]
    fn test_parse_fenced_code_block() {
        let blocks = parse_blocks("intro\n```\nfn main() {}\nlet x;\n```\nafter");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].kind, BlockKind::CodeBlock);
        assert_eq!(blocks[1].text, "fn main() {}\nlet x;");
        assert_eq!(blocks[1].to_markdown(), "```\nfn main() {}\nlet x;\n```");
        assert_eq!(blocks[2].text, "after");
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let buffer = "```\ncode";
        let blocks = parse_blocks(buffer);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].range, 0..buffer.chars().count());
    }

    #[test]
    fn test_heading_command_on_paragraph() {
        let result = apply("/h1 Hello", 9).unwrap();
        assert_eq!(result.buffer, "# Hello\n");
        assert_eq!(result.cursor, 8);
    }

    #[test]
    fn test_same_heading_toggles_off() {
        let buffer = "# /h1 Hello";
        let result = apply(buffer, buffer.len()).unwrap();
        assert_eq!(result.buffer, "Hello\n");
        assert_eq!(result.cursor, 6);
    }

    #[test]
    fn test_other_heading_level_switches() {
        let buffer = "## /h1 Hello";
        let result = apply(buffer, buffer.len()).unwrap();
        assert_eq!(result.buffer, "# Hello\n");
    }

    #[test]
    fn test_quote_and_list_toggles() {
        let result = apply("> /quote wise", 13).unwrap();
        assert_eq!(result.buffer, "wise\n");

        let result = apply("/ol first", 9).unwrap();
        assert_eq!(result.buffer, "1. first\n");

        let result = apply("- /ul", 5).unwrap();
        assert_eq!(result.buffer, "\n");
        assert_eq!(result.cursor, 1);
    }

    #[test]
    fn test_code_command_wraps_in_fence() {
        let buffer = "text\n/code let x = 1;";
        let result = apply(buffer, buffer.len()).unwrap();
        assert_eq!(result.buffer, "text\n```\nlet x = 1;\n```\n");
        assert_eq!(result.cursor, result.buffer.chars().count());
    }

    #[test]
    fn test_commands_inside_code_block_are_literal() {
        let buffer = "```\n/h1 not a heading\n```";
        let cursor = "```\n/h1 not a heading".len();
        assert_eq!(apply(buffer, cursor), None);
    }

    #[test]
    fn test_tokenizer_matches_plain_editor() {
        let buffer = "  /h2  Title  ";
        let result = apply(buffer, buffer.len()).unwrap();
        assert_eq!(result.buffer, "## Title\n");
        assert_eq!(apply("/h1x Title", 10), None);
        assert_eq!(apply("/bogus text", 11), None);
    }

    #[test]
    fn test_text_after_cursor_moves_to_next_line() {
        let buffer = "/h1 Title rest\nnext";
        let result = apply(buffer, 9).unwrap();
        assert_eq!(result.buffer, "# Title\n rest\nnext");
        assert_eq!(result.cursor, 8);
    }

    #[test]
    fn test_selection_across_blocks_is_unsupported() {
        let buffer = "first\n/h1 second";
        let err = apply_block_command(buffer, 0, buffer.len(), &CommandTable::structured())
            .unwrap_err();
        assert_eq!(err, StructuredError::SelectionSpansBlocks { first: 0, last: 1 });
    }

    #[test]
    fn test_selection_within_block_is_allowed() {
        let buffer = "/h2 Title";
        let result =
            apply_block_command(buffer, 4, 9, &CommandTable::structured()).unwrap().unwrap();
        assert_eq!(result.buffer, "## Title\n");
    }

    #[test]
    fn test_cursor_inside_prefix_never_matches() {
        assert_eq!(apply("# /h1 x", 1), None);
    }
}
