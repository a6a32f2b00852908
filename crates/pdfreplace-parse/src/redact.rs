//! Region redaction: removes the glyphs under each region from the page
//! content and paints the regions white.
//!
//! A removed glyph becomes a TJ adjustment equal to its advance, so the
//! glyphs around it keep their positions. `Tj`, `'` and `"` holding a
//! removed glyph are rewritten into their `TJ` equivalents. Text inside Form
//! XObjects is only covered.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};
use pdfreplace_core::BBox;

use crate::error::BackendError;
use crate::handler::CharCollector;
use crate::interpreter::{decode_operations, interpret_operations};
use crate::lopdf_backend::LopdfDocument;

/// A glyph to drop from one string operand: byte range plus the TJ
/// adjustment replacing it.
#[derive(Debug, Clone, Copy)]
struct Removal {
    byte_start: usize,
    byte_end: usize,
    kern: f64,
}

/// Outcome of redacting one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedactionReport {
    /// Glyphs removed from the content stream.
    pub removed_glyphs: usize,
    /// Glyphs under a region that could only be covered (Form XObjects).
    pub covered_only: usize,
}

/// Redact `regions` (display coordinates) on page `index`.
pub fn redact_regions(
    doc: &mut LopdfDocument,
    index: usize,
    regions: &[BBox],
) -> Result<RedactionReport, BackendError> {
    let mut report = RedactionReport::default();
    if regions.is_empty() {
        return Ok(report);
    }
    let content = doc.page_content(index)?;
    let resources = doc.page_resources(index)?;
    let geometry = doc.page_geometry(index)?;
    let mut operations = decode_operations(&content)?;

    let mut collector = CharCollector::default();
    interpret_operations(doc.inner(), &operations, &resources, &geometry, &mut collector)?;

    let mut removals: BTreeMap<usize, BTreeMap<usize, Vec<Removal>>> = BTreeMap::new();
    for (ch, placement) in collector.chars.iter().zip(&collector.placements) {
        if !regions.iter().any(|r| glyph_under(&ch.bbox, r)) {
            continue;
        }
        match (placement.location, placement.kern) {
            (Some(loc), Some(kern)) => {
                removals
                    .entry(loc.op_index)
                    .or_default()
                    .entry(loc.element)
                    .or_default()
                    .push(Removal {
                        byte_start: loc.byte_start,
                        byte_end: loc.byte_end,
                        kern,
                    });
                report.removed_glyphs += 1;
            }
            _ => report.covered_only += 1,
        }
    }

    // Back to front so inserted operations do not shift pending indices.
    for (op_index, by_element) in removals.into_iter().rev() {
        let replacement = rewrite_operation(&operations[op_index], &by_element);
        operations.splice(op_index..=op_index, replacement);
    }

    let body = Content { operations }
        .encode()
        .map_err(|e| BackendError::Write(format!("failed to encode content stream: {e}")))?;
    let mut rebuilt = Vec::with_capacity(body.len() + 64 * regions.len() + 8);
    rebuilt.extend_from_slice(b"q\n");
    rebuilt.extend_from_slice(&body);
    rebuilt.extend_from_slice(b"\nQ\n");
    rebuilt.extend(white_overlay(regions, |r| geometry.to_pdf_rect(r)));
    doc.set_page_content(index, rebuilt)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        page = index,
        regions = regions.len(),
        removed = report.removed_glyphs,
        covered_only = report.covered_only,
        "redacted regions"
    );
    Ok(report)
}

/// A glyph belongs to a region when its centre is inside it or at least
/// half its box is covered. Padding that only grazes the ascent of the next
/// line does not claim that line's glyphs.
fn glyph_under(glyph: &BBox, region: &BBox) -> bool {
    if region.contains_point(glyph.center_x(), glyph.center_y()) {
        return true;
    }
    let area = glyph.area();
    area > 0.0 && glyph.intersection_area(region) >= 0.5 * area
}

/// `q 1 1 1 rg x y w h re f Q` for every region.
fn white_overlay(regions: &[BBox], to_pdf: impl Fn(&BBox) -> [f64; 4]) -> Vec<u8> {
    let mut out = String::from("q\n1 1 1 rg\n");
    for region in regions {
        let [x, y, w, h] = to_pdf(region);
        out.push_str(&format!("{x:.3} {y:.3} {w:.3} {h:.3} re f\n"));
    }
    out.push_str("Q\n");
    out.into_bytes()
}

/// Split `bytes` around the removed glyphs, leaving kerns in their place.
fn strip_glyphs(bytes: &[u8], format: StringFormat, removals: &[Removal]) -> Vec<Object> {
    let mut sorted = removals.to_vec();
    sorted.sort_by_key(|r| r.byte_start);

    let mut out = Vec::new();
    let mut pending_kern = 0.0;
    let mut cursor = 0;
    for removal in sorted {
        if removal.byte_start > cursor {
            if pending_kern != 0.0 {
                out.push(Object::Real(pending_kern as f32));
                pending_kern = 0.0;
            }
            out.push(Object::String(
                bytes[cursor..removal.byte_start].to_vec(),
                format,
            ));
        }
        pending_kern += removal.kern;
        cursor = cursor.max(removal.byte_end);
    }
    if pending_kern != 0.0 {
        out.push(Object::Real(pending_kern as f32));
    }
    if cursor < bytes.len() {
        out.push(Object::String(bytes[cursor..].to_vec(), format));
    }
    out
}

fn rewrite_array(items: &[Object], by_element: &BTreeMap<usize, Vec<Removal>>) -> Vec<Object> {
    let mut out = Vec::with_capacity(items.len());
    for (element, item) in items.iter().enumerate() {
        match (item, by_element.get(&element)) {
            (Object::String(bytes, format), Some(removals)) => {
                out.extend(strip_glyphs(bytes, *format, removals));
            }
            _ => out.push(item.clone()),
        }
    }
    out
}

fn rewrite_operation(op: &Operation, by_element: &BTreeMap<usize, Vec<Removal>>) -> Vec<Operation> {
    let tj = |items: Vec<Object>| Operation::new("TJ", vec![Object::Array(items)]);
    match op.operator.as_str() {
        "TJ" => match op.operands.first() {
            Some(Object::Array(items)) => vec![tj(rewrite_array(items, by_element))],
            _ => vec![op.clone()],
        },
        "Tj" => match op.operands.first() {
            Some(string @ Object::String(..)) => {
                vec![tj(rewrite_array(std::slice::from_ref(string), by_element))]
            }
            _ => vec![op.clone()],
        },
        "'" => match op.operands.first() {
            Some(string @ Object::String(..)) => vec![
                Operation::new("T*", vec![]),
                tj(rewrite_array(std::slice::from_ref(string), by_element)),
            ],
            _ => vec![op.clone()],
        },
        "\"" => match op.operands.as_slice() {
            [aw, ac, string @ Object::String(..)] => vec![
                Operation::new("Tw", vec![aw.clone()]),
                Operation::new("Tc", vec![ac.clone()]),
                Operation::new("T*", vec![]),
                tj(rewrite_array(std::slice::from_ref(string), by_element)),
            ],
            _ => vec![op.clone()],
        },
        _ => vec![op.clone()],
    }
}
