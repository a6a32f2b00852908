//! Shared PDF builders for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use pdfreplace::Pdf;

/// A run of text on a page, set with `Td` at (`x`, `y`) in PDF user space.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub text: String,
    /// Resource name of the font (`F1`, `F2`, ...).
    pub font: &'static str,
    pub size: f64,
    pub x: f64,
    pub y: f64,
    pub rgb: Option<[f32; 3]>,
    /// Extra spacing between characters (`Tc`).
    pub char_spacing: f64,
}

impl TextLine {
    pub fn new(text: &str, font: &'static str, size: f64, x: f64, y: f64) -> Self {
        Self {
            text: text.to_string(),
            font,
            size,
            x,
            y,
            rgb: None,
            char_spacing: 0.0,
        }
    }

    pub fn colored(mut self, rgb: [f32; 3]) -> Self {
        self.rgb = Some(rgb);
        self
    }

    pub fn spaced(mut self, char_spacing: f64) -> Self {
        self.char_spacing = char_spacing;
        self
    }
}

/// Builds US Letter documents whose fonts are non-embedded simple fonts
/// with WinAnsi encoding.
#[derive(Debug, Default)]
pub struct PdfBuilder {
    fonts: Vec<(&'static str, String)>,
    pages: Vec<Vec<TextLine>>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `base_font` under the resource name `name`.
    pub fn font(mut self, name: &'static str, base_font: &str) -> Self {
        self.fonts.push((name, base_font.to_string()));
        self
    }

    pub fn page(mut self, lines: Vec<TextLine>) -> Self {
        self.pages.push(lines);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut font_dict = lopdf::Dictionary::new();
        for (name, base_font) in &self.fonts {
            let mut font = dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base_font.as_str(),
                "Encoding" => "WinAnsiEncoding",
            };
            if !is_base14(base_font) {
                // Fixed 600-unit advances for printable ASCII.
                let widths: Vec<Object> = (32..=126).map(|_| 600.into()).collect();
                font.set("Subtype", "TrueType");
                font.set("FirstChar", 32);
                font.set("LastChar", 126);
                font.set("Widths", widths);
            }
            let id = doc.add_object(font);
            font_dict.set(*name, id);
        }
        let resources_id = doc.add_object(dictionary! { "Font" => font_dict });

        let mut kids: Vec<Object> = Vec::new();
        for lines in &self.pages {
            let mut ops = Vec::new();
            for line in lines {
                ops.push(Operation::new("BT", vec![]));
                if let Some([r, g, b]) = line.rgb {
                    ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
                }
                ops.push(Operation::new(
                    "Tf",
                    vec![line.font.into(), (line.size as f32).into()],
                ));
                if line.char_spacing != 0.0 {
                    ops.push(Operation::new("Tc", vec![(line.char_spacing as f32).into()]));
                }
                ops.push(Operation::new(
                    "Td",
                    vec![(line.x as f32).into(), (line.y as f32).into()],
                ));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(line.text.as_str())],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations: ops }.encode().unwrap();
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }
}

fn is_base14(name: &str) -> bool {
    name.starts_with("Helvetica")
        || name.starts_with("Times")
        || name.starts_with("Courier")
        || name == "Symbol"
        || name == "ZapfDingbats"
}

/// One Helvetica 12pt line per page.
pub fn simple_pdf(pages: &[&str]) -> Vec<u8> {
    let mut builder = PdfBuilder::new().font("F1", "Helvetica");
    for text in pages {
        builder = builder.page(vec![TextLine::new(text, "F1", 12.0, 72.0, 720.0)]);
    }
    builder.build()
}

/// Extracted text of every page.
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let pdf = Pdf::open(bytes).unwrap();
    pdf.pages_iter()
        .map(|page| page.unwrap().extract_text())
        .collect()
}

/// A TrueType font installed on the host, if any.
pub fn host_ttf() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.is_file())
}
