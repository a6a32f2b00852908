//! Content stream interpreter.
//!
//! Walks decoded content operations, maintaining graphics and text state,
//! and reports every shown glyph to a [`ContentHandler`] with its page box
//! and its position in the operation list. Form XObjects are entered
//! through `Do` for extraction; their glyphs carry no location.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};
use pdfreplace_core::geometry::{Ctm, Point};
use pdfreplace_core::{BBox, Char};

use crate::error::BackendError;
use crate::font_metrics::PdfFont;
use crate::handler::{CharCollector, ContentHandler, GlyphEvent, GlyphLocation};
use crate::interpreter_state::InterpreterState;
use crate::lopdf_backend::{LopdfDocument, dict_entry, number, resolve_ref, stream_bytes};
use crate::page_geometry::PageGeometry;
use crate::text_state::TextState;

/// Deepest Form XObject nesting that is followed.
pub const MAX_FORM_DEPTH: usize = 8;

/// Decode a content stream into operations.
pub fn decode_operations(content: &[u8]) -> Result<Vec<Operation>, BackendError> {
    Content::decode(content)
        .map(|c| c.operations)
        .map_err(|e| BackendError::Interpreter(format!("failed to decode content stream: {e}")))
}

/// Interpret a page and collect its chars.
pub fn extract_page_chars(doc: &LopdfDocument, index: usize) -> Result<CharCollector, BackendError> {
    let content = doc.page_content(index)?;
    let resources = doc.page_resources(index)?;
    let geometry = doc.page_geometry(index)?;
    let operations = decode_operations(&content)?;
    let mut collector = CharCollector::default();
    interpret_operations(doc.inner(), &operations, &resources, &geometry, &mut collector)?;
    Ok(collector)
}

/// Interpret already decoded page-level operations. Glyph locations index
/// into `operations`.
pub fn interpret_operations(
    doc: &Document,
    operations: &[Operation],
    resources: &Dictionary,
    geometry: &PageGeometry,
    handler: &mut dyn ContentHandler,
) -> Result<(), BackendError> {
    let mut interpreter = Interpreter {
        doc,
        geometry,
        handler,
    };
    interpreter.run(
        operations,
        resources,
        &mut InterpreterState::new(),
        &mut TextState::new(),
        0,
    )
}

struct Interpreter<'a> {
    doc: &'a Document,
    geometry: &'a PageGeometry,
    handler: &'a mut dyn ContentHandler,
}

fn operand_numbers(operands: &[Object]) -> Vec<f64> {
    operands.iter().filter_map(number).collect()
}

fn matrix_from(values: &[f64]) -> Option<Ctm> {
    match *values {
        [a, b, c, d, e, f] => Some(Ctm::new(a, b, c, d, e, f)),
        _ => None,
    }
}

impl Interpreter<'_> {
    fn run(
        &mut self,
        operations: &[Operation],
        resources: &Dictionary,
        gstate: &mut InterpreterState,
        tstate: &mut TextState,
        depth: usize,
    ) -> Result<(), BackendError> {
        let mut fonts: HashMap<String, PdfFont> = HashMap::new();
        let top_level = depth == 0;

        for (op_index, op) in operations.iter().enumerate() {
            let nums = || operand_numbers(&op.operands);
            match op.operator.as_str() {
                "q" => gstate.save(tstate.save_snapshot()),
                "Q" => {
                    if let Some(snapshot) = gstate.restore() {
                        tstate.restore_snapshot(snapshot);
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from(&nums()) {
                        gstate.concat_matrix(m);
                    }
                }
                "g" | "rg" | "k" | "sc" | "scn" => gstate.set_fill_components(&nums()),
                "cs" => gstate.reset_fill(),
                "BT" => tstate.begin_text(),
                "Tf" => {
                    let name = op
                        .operands
                        .first()
                        .and_then(|o| o.as_name().ok())
                        .map(|n| String::from_utf8_lossy(n).into_owned())
                        .unwrap_or_default();
                    let size = op.operands.get(1).and_then(number).unwrap_or(0.0);
                    if !fonts.contains_key(&name) {
                        let font = self.load_font(resources, &name);
                        fonts.insert(name.clone(), font);
                    }
                    tstate.set_font(name, size);
                }
                "Tc" => tstate.char_spacing = nums().first().copied().unwrap_or(0.0),
                "Tw" => tstate.word_spacing = nums().first().copied().unwrap_or(0.0),
                "Tz" => tstate.h_scaling = nums().first().copied().unwrap_or(100.0),
                "TL" => tstate.leading = nums().first().copied().unwrap_or(0.0),
                "Ts" => tstate.rise = nums().first().copied().unwrap_or(0.0),
                "Tr" => tstate.render_mode = nums().first().map_or(0, |v| *v as i64),
                "Td" => {
                    if let [tx, ty] = nums()[..] {
                        tstate.move_text_position(tx, ty);
                    }
                }
                "TD" => {
                    if let [tx, ty] = nums()[..] {
                        tstate.move_text_position_and_set_leading(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_from(&nums()) {
                        tstate.set_text_matrix(m);
                    }
                }
                "T*" => tstate.move_to_next_line(),
                "Tj" | "'" | "\"" => {
                    let string_index = match op.operator.as_str() {
                        "'" => {
                            tstate.move_to_next_line();
                            0
                        }
                        "\"" => {
                            let values = nums();
                            if let [aw, ac, ..] = values[..] {
                                tstate.word_spacing = aw;
                                tstate.char_spacing = ac;
                            }
                            tstate.move_to_next_line();
                            2
                        }
                        _ => 0,
                    };
                    if let Some(Object::String(bytes, _)) = op.operands.get(string_index) {
                        let font = font_for(&mut fonts, tstate);
                        let location = top_level.then_some((op_index, 0));
                        self.show_string(bytes, font, location, gstate, tstate);
                    }
                }
                "TJ" => {
                    let Some(Ok(items)) = op.operands.first().map(Object::as_array) else {
                        continue;
                    };
                    for (element, item) in items.iter().enumerate() {
                        match item {
                            Object::String(bytes, _) => {
                                let font = font_for(&mut fonts, tstate);
                                let location = top_level.then_some((op_index, element));
                                self.show_string(bytes, font, location, gstate, tstate);
                            }
                            other => {
                                if let Some(n) = number(other) {
                                    let tx = tstate.adjustment_advance(n);
                                    tstate.advance_text_position(tx);
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(Ok(name)) = op.operands.first().map(Object::as_name) {
                        self.run_form(resources, name, gstate, tstate, depth)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn load_font(&mut self, resources: &Dictionary, name: &str) -> PdfFont {
        let dict = dict_entry(self.doc, resources, b"Font")
            .and_then(|fonts| dict_entry(self.doc, fonts, name.as_bytes()));
        match dict {
            Some(dict) => PdfFont::load(self.doc, dict),
            None => {
                self.handler
                    .on_warning(format!("font resource /{name} not found"));
                PdfFont::unknown(name)
            }
        }
    }

    fn run_form(
        &mut self,
        resources: &Dictionary,
        name: &[u8],
        gstate: &InterpreterState,
        tstate: &TextState,
        depth: usize,
    ) -> Result<(), BackendError> {
        let Some(obj) = dict_entry(self.doc, resources, b"XObject").and_then(|x| x.get(name).ok())
        else {
            return Ok(());
        };
        let Ok(stream) = resolve_ref(self.doc, obj).as_stream() else {
            return Ok(());
        };
        let is_form = stream
            .dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|s| s == b"Form");
        if !is_form {
            return Ok(());
        }
        if depth + 1 > MAX_FORM_DEPTH {
            self.handler.on_warning(format!(
                "form XObject /{} nested deeper than {MAX_FORM_DEPTH}",
                String::from_utf8_lossy(name)
            ));
            return Ok(());
        }

        let matrix = stream
            .dict
            .get(b"Matrix")
            .and_then(Object::as_array)
            .ok()
            .and_then(|m| matrix_from(&m.iter().filter_map(number).collect::<Vec<_>>()))
            .unwrap_or_default();
        let form_resources = dict_entry(self.doc, &stream.dict, b"Resources")
            .cloned()
            .unwrap_or_else(|| resources.clone());
        let content = stream_bytes(self.doc, obj)?;
        let operations = match decode_operations(&content) {
            Ok(ops) => ops,
            Err(e) => {
                self.handler.on_warning(e.to_string());
                return Ok(());
            }
        };

        let mut nested_gstate = gstate.nested(matrix);
        let mut nested_tstate = tstate.clone();
        self.run(
            &operations,
            &form_resources,
            &mut nested_gstate,
            &mut nested_tstate,
            depth + 1,
        )
    }

    fn show_string(
        &mut self,
        bytes: &[u8],
        font: &PdfFont,
        location: Option<(usize, usize)>,
        gstate: &InterpreterState,
        tstate: &mut TextState,
    ) {
        let single_byte = font.code_bytes() == 1;
        for (code, byte_start, byte_end) in font.split_codes(bytes) {
            let w0 = font.width(code);
            let trm = tstate.rendering_matrix(gstate.ctm());

            let (x_max, y_min, y_max) = (w0 / 1000.0, font.descent / 1000.0, font.ascent / 1000.0);
            let corners = [(0.0, y_min), (x_max, y_min), (0.0, y_max), (x_max, y_max)]
                .map(|(x, y)| {
                    let p = trm.transform_point(Point::new(x, y));
                    self.geometry.to_display(p.x, p.y)
                });
            let xs = corners.map(|p| p.0);
            let ys = corners.map(|p| p.1);
            let bbox = BBox::new(
                xs.iter().copied().fold(f64::INFINITY, f64::min),
                ys.iter().copied().fold(f64::INFINITY, f64::min),
                xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            );

            let is_word_space = single_byte && code == 32;
            let spacing = tstate.char_spacing + if is_word_space { tstate.word_spacing } else { 0.0 };
            let kern = (tstate.font_size != 0.0)
                .then(|| -(w0 + spacing * 1000.0 / tstate.font_size));

            let char = Char {
                text: font.decode(code),
                bbox,
                fontname: font.base_font.clone(),
                size: trm.c.hypot(trm.d),
                color: gstate.fill(),
                flags: font.flags,
                upright: trm.b.abs() < 1e-6 && trm.c.abs() < 1e-6,
                char_code: code,
            };
            self.handler.on_glyph(GlyphEvent {
                char,
                location: location.map(|(op_index, element)| GlyphLocation {
                    op_index,
                    element,
                    byte_start,
                    byte_end,
                }),
                kern,
            });

            tstate.advance_text_position(tstate.glyph_advance(w0, is_word_space));
        }
    }
}

fn font_for<'f>(fonts: &'f mut HashMap<String, PdfFont>, tstate: &TextState) -> &'f PdfFont {
    fonts
        .entry(tstate.font_resource.clone())
        .or_insert_with(|| PdfFont::unknown(&tstate.font_resource))
}
