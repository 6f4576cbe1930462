//! Minimal PDF writer
//!
//! Produces PDF 1.4 files using only the standard Type 1 fonts, which every
//! viewer ships, so no font data has to be embedded. Text is encoded with
//! WinAnsiEncoding; characters outside it are written as `?`.

use std::fmt::Write as _;

/// Standard fonts available to page content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Italic,
    Mono,
}

impl Font {
    const ALL: [Font; 4] = [Font::Regular, Font::Bold, Font::Italic, Font::Mono];

    fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
            Font::Mono => "F4",
        }
    }

    fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
            Font::Mono => "Courier",
        }
    }

    /// Average glyph advance as a fraction of the font size
    pub fn average_advance(&self) -> f32 {
        match self {
            Font::Mono => 0.6,
            Font::Bold => 0.56,
            Font::Regular | Font::Italic => 0.5,
        }
    }
}

/// Something drawn on a page, in PDF user space (origin bottom-left)
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        text: String,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
    },
}

/// One page of content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<PageItem>,
}

/// Map a char to its WinAnsiEncoding byte
fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => b'?',
    }
}

/// Encode text as a PDF literal string body
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match win_ansi(c) {
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\\' => out.push_str("\\\\"),
            byte if byte.is_ascii() => out.push(byte as char),
            byte => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}

fn content_stream(page: &Page) -> String {
    let mut out = String::new();
    for item in &page.items {
        match item {
            PageItem::Text {
                x,
                y,
                font,
                size,
                text,
            } => {
                let _ = writeln!(
                    out,
                    "BT /{} {:.2} Tf {:.2} {:.2} Td ({}) Tj ET",
                    font.resource_name(),
                    size,
                    x,
                    y,
                    escape_text(text)
                );
            }
            PageItem::Rule { x1, x2, y } => {
                let _ = writeln!(out, "0.5 w {:.2} {:.2} m {:.2} {:.2} l S", x1, y, x2, y);
            }
        }
    }
    out
}

/// Serialize pages of the given size (points) into a PDF document
pub fn write_pdf(pages: &[Page], width: f32, height: f32) -> Vec<u8> {
    let blank = [Page::default()];
    let pages = if pages.is_empty() { &blank[..] } else { pages };

    // Object numbering: 1 catalog, 2 page tree, fonts, then page + content pairs
    let font_base = 3;
    let page_base = font_base + Font::ALL.len();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| page_base + i * 2).collect();

    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids,
        pages.len()
    ));

    for font in Font::ALL {
        objects.push(format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
            font.base_font()
        ));
    }

    let font_resources = Font::ALL
        .iter()
        .enumerate()
        .map(|(i, f)| format!("/{} {} 0 R", f.resource_name(), font_base + i))
        .collect::<Vec<_>>()
        .join(" ");

    for (page, id) in pages.iter().zip(&page_ids) {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Resources << /Font << {} >> >> /Contents {} 0 R >>",
            width,
            height,
            font_resources,
            id + 1
        ));
        let stream = content_stream(page);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
    }

    let xref = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    );

    out.into_bytes()
}
