use crate::font_names::{StyleFlags, infer_bold_italic};
use crate::geometry::BBox;
use crate::painting::Color;

/// A single character extracted from a PDF page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Char {
    /// The text content of this character.
    pub text: String,
    /// Bounding box in top-left origin coordinates.
    pub bbox: BBox,
    /// Font name as written in `/BaseFont` (subset tag preserved).
    pub fontname: String,
    /// Effective font size in points.
    pub size: f64,
    /// Non-stroking (fill) color at the time the glyph was shown.
    pub color: Color,
    /// Weight/slant reported by the font descriptor.
    pub flags: StyleFlags,
    /// Whether the character is upright (not rotated).
    pub upright: bool,
    /// Raw character code from the PDF content stream.
    pub char_code: u32,
}

impl Char {
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// A contiguous span of rendered text sharing one font, size and colour.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRun {
    pub text: String,
    pub bbox: BBox,
    pub font_name: String,
    pub font_size: f64,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
}

/// Fraction of the smaller glyph height two chars must share vertically to
/// sit on the same line.
const SAME_LINE_OVERLAP: f64 = 0.5;

fn same_line(a: &BBox, b: &BBox) -> bool {
    let min_h = a.height().min(b.height()).max(1e-6);
    a.vertical_overlap(b) / min_h >= SAME_LINE_OVERLAP
}

/// Group chars (in content-stream order) into text runs.
///
/// A new run starts whenever the font, size or colour changes, the glyph
/// leaves the current line, or it jumps backwards or far ahead horizontally.
pub fn group_text_runs(chars: &[Char]) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();
    let mut last: Option<&Char> = None;

    for ch in chars {
        let continues = match (last, runs.last()) {
            (Some(prev), Some(run)) => {
                prev.fontname == ch.fontname
                    && (prev.size - ch.size).abs() < 0.01
                    && prev.color == ch.color
                    && same_line(&run.bbox, &ch.bbox)
                    && ch.bbox.x0 >= prev.bbox.x0 - 0.5
                    && ch.bbox.x0 - prev.bbox.x1 <= ch.size.max(1.0) * 3.0
            }
            _ => false,
        };

        if continues {
            if let Some(run) = runs.last_mut() {
                run.text.push_str(&ch.text);
                run.bbox = run.bbox.union(&ch.bbox);
            }
        } else {
            let (name_bold, name_italic) = infer_bold_italic(&ch.fontname);
            runs.push(TextRun {
                text: ch.text.clone(),
                bbox: ch.bbox,
                font_name: ch.fontname.clone(),
                font_size: ch.size,
                color: ch.color,
                bold: name_bold || ch.flags.bold,
                italic: name_italic || ch.flags.italic,
            });
        }
        last = Some(ch);
    }
    runs
}

/// Cluster chars into visual lines (top to bottom), each sorted left to
/// right.
pub fn lines_in_reading_order(chars: &[Char], y_tolerance: f64) -> Vec<Vec<&Char>> {
    line_indices_in_reading_order(chars, y_tolerance)
        .into_iter()
        .map(|line| line.into_iter().map(|i| &chars[i]).collect())
        .collect()
}

/// [`lines_in_reading_order`] as indices into `chars`.
pub fn line_indices_in_reading_order(chars: &[Char], y_tolerance: f64) -> Vec<Vec<usize>> {
    let mut sorted: Vec<usize> = (0..chars.len()).collect();
    sorted.sort_by(|&a, &b| {
        let (a, b) = (&chars[a].bbox, &chars[b].bbox);
        a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0))
    });

    let mut lines: Vec<(f64, Vec<usize>)> = Vec::new();
    for i in sorted {
        let top = chars[i].bbox.top;
        match lines
            .iter_mut()
            .find(|(line_top, _)| (top - *line_top).abs() <= y_tolerance)
        {
            Some((_, line)) => line.push(i),
            None => lines.push((top, vec![i])),
        }
    }
    lines.sort_by(|a, b| a.0.total_cmp(&b.0));
    lines
        .into_iter()
        .map(|(_, mut line)| {
            line.sort_by(|&a, &b| chars[a].bbox.x0.total_cmp(&chars[b].bbox.x0));
            line
        })
        .collect()
}

/// Read back the text whose glyphs lie mostly inside `area`.
///
/// Lines are joined with `\n`; a space is inserted where two consecutive
/// glyphs are separated by a visible gap but no space glyph.
pub fn text_in_bbox(chars: &[Char], area: &BBox) -> String {
    let inside: Vec<Char> = chars
        .iter()
        .filter(|c| {
            let a = c.bbox.area();
            if a <= 0.0 {
                return area.contains_point(
                    (c.bbox.x0 + c.bbox.x1) / 2.0,
                    (c.bbox.top + c.bbox.bottom) / 2.0,
                );
            }
            c.bbox.intersection_area(area) / a >= 0.5
        })
        .cloned()
        .collect();

    let mut out = Vec::new();
    for line in lines_in_reading_order(&inside, 3.0) {
        let mut text = String::new();
        let mut prev: Option<&Char> = None;
        for ch in line {
            if let Some(p) = prev {
                let gap = ch.bbox.x0 - p.bbox.x1;
                if gap > ch.size.max(1.0) * 0.15 && !p.is_blank() && !ch.is_blank() {
                    text.push(' ');
                }
            }
            text.push_str(&ch.text);
            prev = Some(ch);
        }
        out.push(text);
    }
    out.join("\n").trim().to_string()
}
