//! Typographic style of the text under a match region.

use std::collections::HashMap;

use pdfreplace_core::{BBox, Char, Color, TextRun, infer_bold_italic};

use crate::Page;

/// Font, size, colour and weight/slant of the text being replaced. Every
/// field is empty when nothing was found under the region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub color: Option<Color>,
    pub bold: bool,
    pub italic: bool,
}

impl TextStyle {
    fn from_run(run: &TextRun) -> Self {
        Self {
            font_name: Some(run.font_name.clone()),
            font_size: Some(run.font_size),
            color: Some(run.color),
            bold: run.bold,
            italic: run.italic,
        }
    }

    fn from_char(ch: &Char) -> Self {
        let (name_bold, name_italic) = infer_bold_italic(&ch.fontname);
        Self {
            font_name: Some(ch.fontname.clone()),
            font_size: Some(ch.size),
            color: Some(ch.color),
            bold: name_bold || ch.flags.bold,
            italic: name_italic || ch.flags.italic,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.font_name.is_none() && self.font_size.is_none() && self.color.is_none()
    }
}

/// The run overlapping `rect` with the greatest intersection area.
pub fn style_from_runs(runs: &[TextRun], rect: &BBox) -> Option<TextStyle> {
    runs.iter()
        .map(|run| (run, run.bbox.intersection_area(rect)))
        .filter(|(_, area)| *area > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(run, _)| TextStyle::from_run(run))
}

/// Scan the chars under `rect` directly and take the font covering the
/// most glyph area.
fn style_from_chars(chars: &[Char], rect: &BBox) -> Option<TextStyle> {
    let mut by_font: HashMap<(&str, u64), (f64, &Char)> = HashMap::new();
    for ch in chars.iter().filter(|c| !c.is_blank()) {
        let (cx, cy) = (
            (ch.bbox.x0 + ch.bbox.x1) / 2.0,
            (ch.bbox.top + ch.bbox.bottom) / 2.0,
        );
        let area = ch.bbox.intersection_area(rect);
        if area <= 0.0 && !rect.contains_point(cx, cy) {
            continue;
        }
        let weight = area.max(f64::EPSILON);
        let entry = by_font
            .entry((ch.fontname.as_str(), ch.size.to_bits()))
            .or_insert((0.0, ch));
        entry.0 += weight;
    }
    by_font
        .into_values()
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, ch)| TextStyle::from_char(ch))
}

/// Style of the text under `rect`: the best overlapping text run, else a
/// narrower scan of the chars in the rect, else an empty style.
pub fn extract_style(page: &Page, rect: &BBox) -> TextStyle {
    style_from_runs(page.text_runs(), rect)
        .or_else(|| style_from_chars(page.chars(), rect))
        .unwrap_or_default()
}
