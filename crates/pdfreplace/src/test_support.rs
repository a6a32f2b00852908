//! In-memory PDFs for unit tests.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// One line of text drawn with `Td` at (`x`, `y`) in PDF user space.
pub struct Line<'a> {
    pub text: &'a str,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl<'a> Line<'a> {
    pub fn at(text: &'a str, x: f64, y: f64, size: f64) -> Self {
        Self { text, x, y, size }
    }
}

/// US Letter pages whose lines are set in the base-14 font `base_font`,
/// optionally filled with an RGB colour.
pub fn build_pdf(base_font: &str, fill: Option<[f32; 3]>, pages: &[Vec<Line<'_>>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut ops = Vec::new();
        if let Some([r, g, b]) = fill {
            ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        }
        for line in lines {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("Tf", vec!["F1".into(), (line.size as f32).into()]));
            ops.push(Operation::new(
                "Td",
                vec![(line.x as f32).into(), (line.y as f32).into()],
            ));
            ops.push(Operation::new("Tj", vec![Object::string_literal(line.text)]));
            ops.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations: ops }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
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
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
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

/// One Helvetica 12pt line at (72, 720) per page.
pub fn text_pdf(pages: &[&str]) -> Vec<u8> {
    let pages: Vec<Vec<Line<'_>>> = pages
        .iter()
        .map(|text| vec![Line::at(text, 72.0, 720.0, 12.0)])
        .collect();
    build_pdf("Helvetica", None, &pages)
}
