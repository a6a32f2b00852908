//! Text search with position: find literal occurrences and return the
//! rectangles they occupy on the page.

use regex::RegexBuilder;

use crate::geometry::BBox;
use crate::text::{Char, line_indices_in_reading_order};

/// Options controlling text search behavior.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Whether the search is case-sensitive (default: `false`).
    pub case_sensitive: bool,
    /// Vertical tolerance used to cluster glyphs into lines.
    pub y_tolerance: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            y_tolerance: 3.0,
        }
    }
}

/// A single occurrence of the search string.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    /// The matched text as rendered on the page.
    pub text: String,
    /// One rectangle per visual line the occurrence spans.
    pub rects: Vec<BBox>,
    /// Indices into the searched char slice for the matched characters.
    pub char_indices: Vec<usize>,
}

/// Search for a literal string in a page's characters.
///
/// The algorithm:
/// 1. Cluster chars into lines in reading order and concatenate their text.
///    Lines are joined with a space, and a space is also synthesized between
///    glyphs separated by a visible gap with no space glyph.
/// 2. Run the escaped pattern against the concatenated string.
/// 3. Map every match back to its chars and union their boxes per line.
pub fn search_chars(chars: &[Char], pattern: &str, options: &SearchOptions) -> Vec<SearchMatch> {
    if chars.is_empty() || pattern.is_empty() {
        return Vec::new();
    }

    // byte_to_char[offset] = (char index, line index); None for synthesized spaces.
    let mut full_text = String::new();
    let mut byte_to_char: Vec<Option<(usize, usize)>> = Vec::new();

    for (line_no, line) in line_indices_in_reading_order(chars, options.y_tolerance)
        .into_iter()
        .enumerate()
    {
        if !full_text.is_empty() {
            full_text.push(' ');
            byte_to_char.push(None);
        }
        let mut prev: Option<&Char> = None;
        for idx in line {
            let ch = &chars[idx];
            if let Some(p) = prev {
                let gap = ch.bbox.x0 - p.bbox.x1;
                if gap > ch.size.max(1.0) * 0.15 && !p.is_blank() && !ch.is_blank() {
                    full_text.push(' ');
                    byte_to_char.push(None);
                }
            }
            for _ in 0..ch.text.len() {
                byte_to_char.push(Some((idx, line_no)));
            }
            full_text.push_str(&ch.text);
            prev = Some(ch);
        }
    }

    let re = match RegexBuilder::new(&regex::escape(pattern))
        .case_insensitive(!options.case_sensitive)
        .build()
    {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    let mut results = Vec::new();
    for m in re.find_iter(&full_text) {
        let mut char_indices: Vec<usize> = Vec::new();
        let mut rects: Vec<(usize, BBox)> = Vec::new();
        for (idx, line_no) in byte_to_char[m.start()..m.end()].iter().flatten().copied() {
            if char_indices.last() == Some(&idx) {
                continue;
            }
            char_indices.push(idx);
            let bbox = chars[idx].bbox;
            match rects.iter_mut().find(|(l, _)| *l == line_no) {
                Some((_, rect)) => *rect = rect.union(&bbox),
                None => rects.push((line_no, bbox)),
            }
        }
        if char_indices.is_empty() {
            continue;
        }
        results.push(SearchMatch {
            text: m.as_str().to_string(),
            rects: rects.into_iter().map(|(_, r)| r).collect(),
            char_indices,
        });
    }
    results
}
