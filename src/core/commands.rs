//! Slash command parsing
//!
//! A line such as `/h1 Title` is recognised when Enter is pressed at the end of
//! it and rewritten into its markdown form (`# Title`). Only the text between
//! the previous newline and the cursor is inspected; anything after the cursor
//! is carried over untouched.
//!
//! Cursor positions are counted in `char`s, matching egui's `CCursor`.

use std::collections::HashMap;

/// A registered slash command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlashCommand {
    Heading1,
    Heading2,
    Heading3,
    Quote,
    BulletList,
    OrderedList,
    CodeBlock,
}

impl SlashCommand {
    /// Every command, in menu order
    pub const ALL: [SlashCommand; 7] = [
        SlashCommand::Heading1,
        SlashCommand::Heading2,
        SlashCommand::Heading3,
        SlashCommand::Quote,
        SlashCommand::BulletList,
        SlashCommand::OrderedList,
        SlashCommand::CodeBlock,
    ];

    /// The literal token typed by the user
    pub fn token(&self) -> &'static str {
        match self {
            SlashCommand::Heading1 => "/h1",
            SlashCommand::Heading2 => "/h2",
            SlashCommand::Heading3 => "/h3",
            SlashCommand::Quote => "/quote",
            SlashCommand::BulletList => "/ul",
            SlashCommand::OrderedList => "/ol",
            SlashCommand::CodeBlock => "/code",
        }
    }

    /// Short description for the command help
    pub fn description(&self) -> &'static str {
        match self {
            SlashCommand::Heading1 => "Large heading",
            SlashCommand::Heading2 => "Medium heading",
            SlashCommand::Heading3 => "Small heading",
            SlashCommand::Quote => "Block quote",
            SlashCommand::BulletList => "Bulleted list item",
            SlashCommand::OrderedList => "Numbered list item",
            SlashCommand::CodeBlock => "Fenced code block",
        }
    }

    /// Render the line that replaces the command text
    pub fn render(&self, content: &str) -> String {
        match self {
            SlashCommand::Heading1 => format!("# {}", content),
            SlashCommand::Heading2 => format!("## {}", content),
            SlashCommand::Heading3 => format!("### {}", content),
            SlashCommand::Quote => format!("> {}", content),
            SlashCommand::BulletList => format!("- {}", content),
            SlashCommand::OrderedList => format!("1. {}", content),
            SlashCommand::CodeBlock => format!("```\n{}\n```", content),
        }
    }
}

/// Mapping from command token to command
#[derive(Debug, Clone)]
pub struct CommandTable {
    commands: HashMap<&'static str, SlashCommand>,
}

impl CommandTable {
    /// Build a table from a list of commands
    pub fn new(commands: &[SlashCommand]) -> Self {
        Self {
            commands: commands.iter().map(|c| (c.token(), *c)).collect(),
        }
    }

    /// Commands available in the plain text editor
    pub fn plain() -> Self {
        Self::new(&[
            SlashCommand::Heading1,
            SlashCommand::Heading2,
            SlashCommand::Quote,
        ])
    }

    /// Commands available in the structured editor
    pub fn structured() -> Self {
        Self::new(&SlashCommand::ALL)
    }

    /// Look up a token (exact, case-sensitive)
    pub fn get(&self, token: &str) -> Option<SlashCommand> {
        self.commands.get(token).copied()
    }

    /// Registered commands in menu order
    pub fn commands(&self) -> Vec<SlashCommand> {
        SlashCommand::ALL
            .into_iter()
            .filter(|c| self.commands.contains_key(c.token()))
            .collect()
    }
}

/// A line recognised as a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub command: SlashCommand,
    /// Remaining words joined by single spaces, possibly empty
    pub content: String,
}

/// Result of a successful substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    pub buffer: String,
    pub cursor: usize,
}

/// Split a line into command token and content
pub fn tokenize(raw_line: &str, table: &CommandTable) -> Option<CommandLine> {
    let mut words = raw_line.split_whitespace();
    let command = table.get(words.next()?)?;
    let content = words.collect::<Vec<_>>().join(" ");
    Some(CommandLine { command, content })
}

/// Byte index of the `char` offset `cursor`, clamped to the end of `text`
pub fn byte_index(text: &str, cursor: usize) -> usize {
    text.char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Rewrite the command on the line ending at `cursor`.
///
/// Returns `None` when the line is not a registered command, in which case
/// the caller lets the Enter key insert its newline as usual.
pub fn apply_slash_command(
    buffer: &str,
    cursor: usize,
    table: &CommandTable,
) -> Option<CommandMatch> {
    let split = byte_index(buffer, cursor);
    let (before, after) = buffer.split_at(split);

    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = tokenize(&before[line_start..], table)?;

    let mut new_before = String::with_capacity(before.len() + 8);
    new_before.push_str(&before[..line_start]);
    new_before.push_str(&line.command.render(&line.content));

    let cursor = new_before.chars().count() + 1;
    let mut buffer = new_before;
    buffer.push('\n');
    buffer.push_str(after);

    Some(CommandMatch { buffer, cursor })
}
