//! PDF export of a note
//!
//! The note's markdown is laid out as one long surface of styled lines, the
//! same way the editor shows it, and that surface is cut into page-sized
//! vertical slices. Lines are never split across a page break.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::ExportConfig;
use super::notes::Note;
use super::pdf::{write_pdf, Font, Page, PageItem};

const BODY_SIZE: f32 = 12.0;
const CODE_SIZE: f32 = 10.0;
const LINE_SPACING: f32 = 1.4;
const INDENT_STEP: f32 = 18.0;
const BLOCK_GAP: f32 = 6.0;
/// Code block tabs are expanded; the standard fonts have no glyph for them
const CODE_TAB: &str = "    ";

/// Fixed page formats, in points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
        }
    }
}

/// Export failures
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A laid-out line on the continuous surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceLine {
    Text {
        text: String,
        font: Font,
        size: f32,
        indent: f32,
        /// Extra space above the line
        gap: f32,
    },
    Rule {
        gap: f32,
    },
}

impl SurfaceLine {
    fn height(&self) -> f32 {
        match self {
            SurfaceLine::Text { size, gap, .. } => size * LINE_SPACING + gap,
            SurfaceLine::Rule { gap } => BODY_SIZE + gap,
        }
    }
}

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[\\/:*?"<>|\x00-\x1F\x7F]"#).expect("filename pattern is valid")
    })
}

/// File name for an exported note, with filesystem-unsafe characters removed
pub fn export_filename(title: &str) -> String {
    let cleaned = unsafe_chars().replace_all(title, "");
    let cleaned = cleaned.trim().trim_end_matches('.').trim();
    if cleaned.is_empty() {
        "note.pdf".to_string()
    } else {
        format!("{}.pdf", cleaned)
    }
}

/// Block style being collected
#[derive(Debug, Clone, Copy)]
struct BlockStyle {
    font: Font,
    size: f32,
}

const BODY: BlockStyle = BlockStyle {
    font: Font::Regular,
    size: BODY_SIZE,
};

fn heading_style(level: u8) -> BlockStyle {
    let size = match level {
        1 => 24.0,
        2 => 20.0,
        3 => 16.0,
        4 => 14.0,
        _ => 13.0,
    };
    BlockStyle {
        font: Font::Bold,
        size,
    }
}

/// Word-wrap `text` to at most `max_chars` per line
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            let mut word_len = word.chars().count();

            // Hard-break words longer than a line
            while word_len > max_chars {
                if len > 0 {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                let split = word
                    .char_indices()
                    .nth(max_chars)
                    .map(|(i, _)| i)
                    .unwrap_or(word.len());
                lines.push(word[..split].to_string());
                word = word[split..].to_string();
                word_len -= max_chars;
            }
            if word_len == 0 {
                continue;
            }

            if len > 0 && len + 1 + word_len > max_chars {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            line.push_str(&word);
            len += word_len;
        }
        lines.push(line);
    }

    lines
}

/// Lay out markdown into a continuous column of lines `width` points wide
pub fn layout_markdown(markdown: &str, width: f32) -> Vec<SurfaceLine> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut surface = Vec::new();
    let mut text = String::new();
    let mut style = BODY;
    let mut quote_depth = 0usize;
    // Next number for each open list, None for bullet lists
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut item_marker: Option<String> = None;
    let mut in_code = false;

    let flush = |text: &mut String,
                     style: BlockStyle,
                     marker: Option<String>,
                     quote_depth: usize,
                     list_depth: usize,
                     surface: &mut Vec<SurfaceLine>| {
        if text.trim().is_empty() && marker.is_none() {
            text.clear();
            return;
        }
        let indent = (quote_depth + list_depth.saturating_sub(1)) as f32 * INDENT_STEP;
        let font = if quote_depth > 0 && style.font == Font::Regular {
            Font::Italic
        } else {
            style.font
        };
        let content = match marker {
            Some(marker) => format!("{} {}", marker, text.trim()),
            None => text.trim().to_string(),
        };
        let max_chars = ((width - indent) / (style.size * font.average_advance())) as usize;
        for (i, line) in wrap(&content, max_chars).into_iter().enumerate() {
            surface.push(SurfaceLine::Text {
                text: line,
                font,
                size: style.size,
                indent,
                gap: if i == 0 { BLOCK_GAP } else { 0.0 },
            });
        }
        text.clear();
    };

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => style = heading_style(level as u8),
                Tag::Paragraph => style = BODY,
                Tag::BlockQuote(_) => quote_depth += 1,
                Tag::List(start) => lists.push(start),
                Tag::Item => {
                    // Text of the parent item comes before its sublist
                    if !text.trim().is_empty() {
                        flush(&mut text, style, item_marker.take(), quote_depth, lists.len().saturating_sub(1), &mut surface);
                    }
                    style = BODY;
                    item_marker = match lists.last_mut() {
                        Some(Some(n)) => {
                            let marker = format!("{}.", n);
                            *n += 1;
                            Some(marker)
                        }
                        _ => Some("•".to_string()),
                    };
                }
                Tag::CodeBlock(kind) => {
                    in_code = true;
                    text.clear();
                    if let CodeBlockKind::Fenced(lang) = kind {
                        tracing::trace!("Laying out {} code block", lang);
                    }
                }
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Heading(_) | TagEnd::Paragraph => {
                    flush(&mut text, style, item_marker.take(), quote_depth, lists.len(), &mut surface);
                    style = BODY;
                }
                TagEnd::Item => {
                    if !text.trim().is_empty() || item_marker.is_some() {
                        flush(&mut text, style, item_marker.take(), quote_depth, lists.len(), &mut surface);
                    }
                }
                TagEnd::List(_) => {
                    lists.pop();
                }
                TagEnd::BlockQuote(_) => quote_depth = quote_depth.saturating_sub(1),
                TagEnd::CodeBlock => {
                    in_code = false;
                    let indent = (quote_depth + lists.len()) as f32 * INDENT_STEP + INDENT_STEP / 2.0;
                    let max_chars = ((width - indent) / (CODE_SIZE * Font::Mono.average_advance())) as usize;
                    let code = text.trim_end_matches('\n');
                    for (i, line) in code.split('\n').enumerate() {
                        // Keep leading indentation, only break overlong lines
                        let chars: Vec<char> = line.replace('\t', CODE_TAB).chars().collect();
                        let chunks: Vec<String> = if chars.is_empty() {
                            vec![String::new()]
                        } else {
                            chars.chunks(max_chars.max(1)).map(|c| c.iter().collect()).collect()
                        };
                        for (j, chunk) in chunks.into_iter().enumerate() {
                            surface.push(SurfaceLine::Text {
                                text: chunk,
                                font: Font::Mono,
                                size: CODE_SIZE,
                                indent,
                                gap: if i == 0 && j == 0 { BLOCK_GAP } else { 0.0 },
                            });
                        }
                    }
                    text.clear();
                }
                _ => {}
            },
            Event::Text(t) => text.push_str(&t),
            Event::Code(code) => text.push_str(&code),
            Event::SoftBreak => text.push(if in_code { '\n' } else { ' ' }),
            Event::HardBreak => text.push('\n'),
            Event::Rule => surface.push(SurfaceLine::Rule { gap: BLOCK_GAP }),
            Event::TaskListMarker(checked) => {
                item_marker = Some(if checked { "[x]" } else { "[ ]" }.to_string());
            }
            _ => {}
        }
    }
    flush(&mut text, style, item_marker.take(), quote_depth, lists.len(), &mut surface);

    surface
}

/// Cut the surface into pages of `content_height` points
pub fn paginate(surface: &[SurfaceLine], content_height: f32) -> Vec<Vec<(f32, SurfaceLine)>> {
    let mut pages: Vec<Vec<(f32, SurfaceLine)>> = vec![Vec::new()];
    let mut y = 0.0;

    for line in surface {
        let height = line.height();
        let page_has_content = pages.last().is_some_and(|p| !p.is_empty());
        if page_has_content && y + height > content_height {
            pages.push(Vec::new());
            y = 0.0;
        }
        if let Some(page) = pages.last_mut() {
            page.push((y, line.clone()));
        }
        y += height;
    }

    pages
}

/// Lay out and render a note to PDF bytes
pub fn render_note(note: &Note, config: &ExportConfig) -> Vec<u8> {
    let (page_width, page_height) = config.page_size.dimensions();
    let margin = config.margin.clamp(0.0, page_width / 3.0);
    let content_width = page_width - margin * 2.0;
    let content_height = page_height - margin * 2.0;

    let surface = layout_markdown(&note.content, content_width);
    let pages: Vec<Page> = paginate(&surface, content_height)
        .into_iter()
        .map(|lines| Page {
            items: lines
                .into_iter()
                .map(|(top, line)| match line {
                    SurfaceLine::Text {
                        text,
                        font,
                        size,
                        indent,
                        gap,
                    } => PageItem::Text {
                        x: margin + indent,
                        y: page_height - margin - top - gap - size,
                        font,
                        size,
                        text,
                    },
                    SurfaceLine::Rule { gap } => PageItem::Rule {
                        x1: margin,
                        x2: page_width - margin,
                        y: page_height - margin - top - gap - BODY_SIZE / 2.0,
                    },
                })
                .collect(),
        })
        .collect();

    tracing::debug!("Laid out note {} on {} pages", note.id, pages.len());
    write_pdf(&pages, page_width, page_height)
}

/// Export a note to `path`
pub fn export_note(note: &Note, config: &ExportConfig, path: &Path) -> Result<PathBuf, ExportError> {
    let bytes = render_note(note, config);
    std::fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Exported {} to {}", note.title, path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(surface: &[SurfaceLine]) -> Vec<&str> {
        surface
            .iter()
            .filter_map(|l| match l {
                SurfaceLine::Text { text, .. } => Some(text.as_str()),
                SurfaceLine::Rule { .. } => None,
            })
            .collect()
    }

    fn note(content: &str) -> Note {
        Note {
            id: "note-1".to_string(),
            title: "Test".to_string(),
            content: content.to_string(),
            section: "pages".to_string(),
        }
    }

    #[test]
    fn test_export_filename_strips_unsafe_chars() {
        assert_eq!(export_filename("My: Notes/2024?"), "My Notes2024.pdf");
        assert_eq!(export_filename("  a<b>c|d*\"e\"  "), "abcde.pdf");
        assert_eq!(export_filename("tab\there"), "tabhere.pdf");
        assert_eq!(export_filename("///"), "note.pdf");
        assert_eq!(export_filename(""), "note.pdf");
        assert_eq!(export_filename("draft..."), "draft.pdf");
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap("one\ntwo", 10), vec!["one", "two"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn test_layout_styles() {
        let surface = layout_markdown("# Title\n\nBody text\n\n> quoted\n\n- one\n- two\n\n1. first\n", 500.0);
        assert_eq!(texts(&surface), vec!["Title", "Body text", "quoted", "• one", "• two", "1. first"]);

        match &surface[0] {
            SurfaceLine::Text { font, size, .. } => {
                assert_eq!(*font, Font::Bold);
                assert_eq!(*size, 24.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        match &surface[2] {
            SurfaceLine::Text { font, indent, .. } => {
                assert_eq!(*font, Font::Italic);
                assert_eq!(*indent, INDENT_STEP);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_layout_code_block_keeps_lines() {
        let surface = layout_markdown("```\nfn main() {\n    run();\n}\n```\n", 500.0);
        assert_eq!(texts(&surface), vec!["fn main() {", "    run();", "}"]);
        assert!(surface
            .iter()
            .all(|l| matches!(l, SurfaceLine::Text { font: Font::Mono, .. })));
    }

    #[test]
    fn test_code_block_tabs_become_spaces() {
        let surface = layout_markdown("```\n\tindented();\n```\n", 500.0);
        assert_eq!(texts(&surface), vec!["    indented();"]);

        let pdf = render_note(&note("```\n\tindented();\n```\n"), &ExportConfig::default());
        let pdf = String::from_utf8_lossy(&pdf);
        assert!(pdf.contains("(    indented\\(\\);) Tj"));
        assert!(!pdf.contains("(?indented"));
    }

    #[test]
    fn test_layout_rule() {
        let surface = layout_markdown("above\n\n---\n\nbelow", 500.0);
        assert!(matches!(surface[1], SurfaceLine::Rule { .. }));
    }

    #[test]
    fn test_paginate_never_splits_lines() {
        let line = SurfaceLine::Text {
            text: "x".to_string(),
            font: Font::Regular,
            size: 10.0,
            indent: 0.0,
            gap: 0.0,
        };
        // Each line is 14pt tall; 3 fit in 50pt
        let surface = vec![line; 7];
        let pages = paginate(&surface, 50.0);
        assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 3, 1]);
        assert_eq!(pages[1][0].0, 0.0);
    }

    #[test]
    fn test_paginate_empty_surface() {
        assert_eq!(paginate(&[], 100.0).len(), 1);
    }

    #[test]
    fn test_export_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_filename("Test"));
        let body = (0..200).map(|i| format!("Line {}\n\n", i)).collect::<String>();

        let written = export_note(&note(&body), &ExportConfig::default(), &path).unwrap();
        let bytes = std::fs::read(written).unwrap();
        let pdf = String::from_utf8_lossy(&bytes);
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.contains("(Line 0) Tj"));
        assert!(pdf.contains("(Line 199) Tj"));
        assert!(!pdf.contains("/Count 1 "));
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("a.pdf");
        let err = export_note(&note("x"), &ExportConfig::default(), &path).unwrap_err();
        assert!(err.to_string().contains("failed to write"));
    }
}
