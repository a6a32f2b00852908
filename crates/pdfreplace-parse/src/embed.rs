//! Writing replacement text onto a page.
//!
//! File-backed fonts are embedded as `Type0`/`Identity-H` composite fonts
//! whose codes are glyph ids; builtin faces are referenced as base-14
//! `Type1` fonts with `WinAnsiEncoding`. The program stream of a file is
//! embedded once per [`FontEmbedder`] and shared by every font built on it.

use std::collections::{BTreeMap, HashMap};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat, dictionary};
use pdfreplace_core::{BuiltinFace, Color};

use crate::cmap::write_identity_to_unicode;
use crate::error::BackendError;
use crate::font_program::FontProgram;
use crate::lopdf_backend::LopdfDocument;
use crate::win_ansi;

/// Font used to draw inserted text.
#[derive(Debug, Clone, Copy)]
pub enum InsertFont<'a> {
    /// A parsed font file. `key` identifies the file (its path) so the
    /// program is embedded once.
    Program {
        key: &'a str,
        program: &'a FontProgram,
    },
    /// One of the twelve base-14 Latin faces.
    Builtin(BuiltinFace),
}

/// One string drawn at a baseline point in PDF user space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Text drawn in one font, size and colour.
#[derive(Debug, Clone)]
pub struct TextInsertion<'a> {
    pub font: InsertFont<'a>,
    pub size: f64,
    pub color: Color,
    pub placements: Vec<TextPlacement>,
}

/// Embeds fonts and appends text to pages, remembering what it already
/// added to the document.
#[derive(Debug, Default)]
pub struct FontEmbedder {
    program_streams: HashMap<String, ObjectId>,
    builtin_fonts: HashMap<BuiltinFace, ObjectId>,
}

fn pdf_name_safe(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
        .collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

impl FontEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `insertion` on page `index` as a new content stream.
    pub fn insert_text(
        &mut self,
        doc: &mut LopdfDocument,
        index: usize,
        insertion: &TextInsertion<'_>,
    ) -> Result<(), BackendError> {
        if insertion.placements.is_empty() {
            return Ok(());
        }
        let (font_id, encoded) = match insertion.font {
            InsertFont::Program { key, program } => {
                self.prepare_program(doc, key, program, &insertion.placements)?
            }
            InsertFont::Builtin(face) => {
                let id = self.builtin_font(doc, face);
                let encoded = insertion
                    .placements
                    .iter()
                    .map(|p| Object::String(win_ansi::encode_lossy(&p.text), StringFormat::Literal))
                    .collect();
                (id, encoded)
            }
        };

        let fonts = doc.localize_page_fonts(index)?;
        let mut n = fonts.len() + 1;
        let resource = loop {
            let candidate = format!("FR{n}");
            if !fonts.has(candidate.as_bytes()) {
                break candidate;
            }
            n += 1;
        };
        fonts.set(resource.clone(), Object::Reference(font_id));

        let Color { r, g, b } = insertion.color;
        let mut ops = vec![
            Operation::new("q", vec![]),
            Operation::new("rg", vec![real(r), real(g), real(b)]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(resource.into_bytes()), real(insertion.size)],
            ),
        ];
        // Td is relative to the previous line start.
        let (mut last_x, mut last_y) = (0.0, 0.0);
        for (placement, string) in insertion.placements.iter().zip(encoded) {
            ops.push(Operation::new(
                "Td",
                vec![real(placement.x - last_x), real(placement.y - last_y)],
            ));
            ops.push(Operation::new("Tj", vec![string]));
            (last_x, last_y) = (placement.x, placement.y);
        }
        ops.push(Operation::new("ET", vec![]));
        ops.push(Operation::new("Q", vec![]));

        let content = Content { operations: ops }
            .encode()
            .map_err(|e| BackendError::Write(format!("failed to encode text: {e}")))?;
        doc.append_page_content(index, content)
    }

    fn builtin_font(&mut self, doc: &mut LopdfDocument, face: BuiltinFace) -> ObjectId {
        *self.builtin_fonts.entry(face).or_insert_with(|| {
            doc.inner_mut().add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.pdf_name(),
                "Encoding" => "WinAnsiEncoding",
            })
        })
    }

    fn program_stream(
        &mut self,
        doc: &mut LopdfDocument,
        key: &str,
        program: &FontProgram,
    ) -> ObjectId {
        if let Some(id) = self.program_streams.get(key) {
            return *id;
        }
        let data = program.data().to_vec();
        let dict = if program.is_cff() {
            dictionary! { "Subtype" => "OpenType" }
        } else {
            dictionary! { "Length1" => data.len() as i64 }
        };
        let id = doc.inner_mut().add_object(Stream::new(dict, data));
        self.program_streams.insert(key.to_string(), id);
        id
    }

    /// Build a Type0 font covering the glyphs of `placements` and encode
    /// each placement as two-byte glyph ids.
    fn prepare_program(
        &mut self,
        doc: &mut LopdfDocument,
        key: &str,
        program: &FontProgram,
        placements: &[TextPlacement],
    ) -> Result<(ObjectId, Vec<Object>), BackendError> {
        let GlyphEncoding {
            used,
            strings: encoded,
            missing,
        } = encode_glyphs(program, placements);
        if !missing.is_empty() {
            let missing: String = missing.into_iter().collect();
            #[cfg(feature = "tracing")]
            tracing::warn!(font = key, %missing, "font lacks glyphs, drawn as .notdef");
            #[cfg(not(feature = "tracing"))]
            let _ = missing;
        }

        let file_id = self.program_stream(doc, key, program);
        let base_font = pdf_name_safe(program.postscript_name().unwrap_or("EmbeddedFont"));
        let cff = program.is_cff();

        let mut flags: i64 = 1 << 5;
        if program.is_monospaced() {
            flags |= 1;
        }
        if program.is_italic() {
            flags |= 1 << 6;
        }
        let [llx, lly, urx, ury] = program.bbox_milli();
        let mut descriptor = dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => Object::Name(base_font.clone().into_bytes()),
            "Flags" => flags,
            "FontBBox" => vec![real(llx), real(lly), real(urx), real(ury)],
            "ItalicAngle" => if program.is_italic() { -12 } else { 0 },
            "Ascent" => real(program.ascender_milli()),
            "Descent" => real(program.descender_milli()),
            "CapHeight" => real(program.cap_height_milli()),
            "StemV" => if program.is_bold() { 140 } else { 80 },
        };
        let file_key = if cff { "FontFile3" } else { "FontFile2" };
        descriptor.set(file_key, Object::Reference(file_id));
        let descriptor_id = doc.inner_mut().add_object(descriptor);

        let mut widths = Vec::with_capacity(used.len() * 2);
        for gid in used.keys() {
            widths.push(Object::Integer(i64::from(*gid)));
            widths.push(Object::Array(vec![real(program.advance_milli(*gid))]));
        }
        let mut cid_font = dictionary! {
            "Type" => "Font",
            "Subtype" => if cff { "CIDFontType0" } else { "CIDFontType2" },
            "BaseFont" => Object::Name(base_font.clone().into_bytes()),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "W" => widths,
        };
        if !cff {
            cid_font.set("CIDToGIDMap", "Identity");
        }
        let cid_font_id = doc.inner_mut().add_object(cid_font);

        let mapping: Vec<(u16, char)> = used.into_iter().filter(|(gid, _)| *gid != 0).collect();
        let to_unicode = doc.inner_mut().add_object(Stream::new(
            Dictionary::new(),
            write_identity_to_unicode(&mapping).into_bytes(),
        ));

        let type0 = doc.inner_mut().add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => Object::Name(base_font.into_bytes()),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode,
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(font = key, glyphs = mapping.len(), "embedded Type0 font");
        Ok((type0, encoded))
    }
}

/// Placements encoded as two-byte glyph ids.
#[derive(Debug, Default)]
struct GlyphEncoding {
    /// Glyph id to the first character drawn with it.
    used: BTreeMap<u16, char>,
    strings: Vec<Object>,
    /// Characters the program has no glyph for, in first-seen order.
    missing: Vec<char>,
}

fn encode_glyphs(program: &FontProgram, placements: &[TextPlacement]) -> GlyphEncoding {
    let mut out = GlyphEncoding::default();
    for placement in placements {
        let mut bytes = Vec::with_capacity(placement.text.len() * 2);
        for ch in placement.text.chars() {
            let gid = match program.glyph_id(ch) {
                Some(gid) => gid,
                None => {
                    if !out.missing.contains(&ch) {
                        out.missing.push(ch);
                    }
                    0
                }
            };
            out.used.entry(gid).or_insert(ch);
            bytes.extend_from_slice(&gid.to_be_bytes());
        }
        out.strings.push(Object::String(bytes, StringFormat::Hexadecimal));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_program::find_system_ttf;
    use crate::interpreter::extract_page_chars;
    use crate::lopdf_backend::test_support::*;

    fn page_text(doc: &LopdfDocument) -> String {
        extract_page_chars(doc, 0)
            .unwrap()
            .chars
            .iter()
            .map(|c| c.text.as_str())
            .collect()
    }

    #[test]
    fn builtin_text_is_extractable_at_position() {
        let mut doc = LopdfDocument::from_document(single_page_pdf("Old"));
        let mut embedder = FontEmbedder::new();
        let insertion = TextInsertion {
            font: InsertFont::Builtin(BuiltinFace::TimesBold),
            size: 10.0,
            color: Color::new(0.0, 0.0, 1.0),
            placements: vec![TextPlacement {
                text: "New".to_string(),
                x: 300.0,
                y: 400.0,
            }],
        };
        embedder.insert_text(&mut doc, 0, &insertion).unwrap();

        let collected = extract_page_chars(&doc, 0).unwrap();
        let inserted: Vec<_> = collected
            .chars
            .iter()
            .filter(|c| c.fontname == "Times-Bold")
            .collect();
        assert_eq!(inserted.len(), 3);
        assert!((inserted[0].bbox.x0 - 300.0).abs() < 1e-3);
        assert_eq!(inserted[0].color, Color::new(0.0, 0.0, 1.0));
        assert!(page_text(&doc).starts_with("OldNew"));
    }

    #[test]
    fn builtin_font_object_is_reused() {
        let mut doc = LopdfDocument::from_document(single_page_pdf("x"));
        let mut embedder = FontEmbedder::new();
        let a = embedder.builtin_font(&mut doc, BuiltinFace::Courier);
        let b = embedder.builtin_font(&mut doc, BuiltinFace::Courier);
        let c = embedder.builtin_font(&mut doc, BuiltinFace::Helvetica);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn distributed_placements_use_relative_td() {
        let mut doc = LopdfDocument::from_document(single_page_pdf("x"));
        let mut embedder = FontEmbedder::new();
        let placements = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, t)| TextPlacement {
                text: t.to_string(),
                x: 100.0 + 20.0 * i as f64,
                y: 500.0,
            })
            .collect();
        let insertion = TextInsertion {
            font: InsertFont::Builtin(BuiltinFace::Helvetica),
            size: 12.0,
            color: Color::black(),
            placements,
        };
        embedder.insert_text(&mut doc, 0, &insertion).unwrap();
        let chars = extract_page_chars(&doc, 0).unwrap().chars;
        let xs: Vec<f64> = chars[1..].iter().map(|c| c.bbox.x0).collect();
        assert_eq!(xs.len(), 3);
        assert!((xs[0] - 100.0).abs() < 1e-3);
        assert!((xs[1] - 120.0).abs() < 1e-3);
        assert!((xs[2] - 140.0).abs() < 1e-3);
    }

    #[test]
    fn missing_glyphs_are_reported() {
        let Some(path) = find_system_ttf() else {
            return;
        };
        let program = FontProgram::load(&path).unwrap();
        let placements = vec![TextPlacement {
            text: "A\u{E000}B\u{E000}\u{E001}".to_string(),
            x: 0.0,
            y: 0.0,
        }];
        let encoding = encode_glyphs(&program, &placements);
        assert_eq!(encoding.missing, vec!['\u{E000}', '\u{E001}']);
        assert_eq!(encoding.strings.len(), 1);
        let Object::String(bytes, _) = &encoding.strings[0] else {
            panic!("expected a string");
        };
        assert_eq!(bytes.len(), 10);
        assert_eq!(&bytes[2..4], &[0, 0]);
        assert!(encoding.used.contains_key(&0));
    }

    #[test]
    fn truetype_text_round_trips_through_to_unicode() {
        let Some(path) = find_system_ttf() else {
            return;
        };
        let program = FontProgram::load(&path).unwrap();
        let key = path.to_string_lossy().to_string();
        let mut doc = LopdfDocument::from_document(single_page_pdf("x"));
        let mut embedder = FontEmbedder::new();
        for text in ["Caf\u{E9}", "Zo\u{EB}"] {
            let insertion = TextInsertion {
                font: InsertFont::Program {
                    key: &key,
                    program: &program,
                },
                size: 12.0,
                color: Color::black(),
                placements: vec![TextPlacement {
                    text: text.to_string(),
                    x: 72.0,
                    y: 600.0,
                }],
            };
            embedder.insert_text(&mut doc, 0, &insertion).unwrap();
        }
        assert_eq!(embedder.program_streams.len(), 1);
        assert_eq!(page_text(&doc), "xCaf\u{E9}Zo\u{EB}");

        let bytes = doc.save_to_bytes().unwrap();
        let reopened = LopdfDocument::open(&bytes).unwrap();
        assert_eq!(page_text(&reopened), "xCaf\u{E9}Zo\u{EB}");
    }
}
