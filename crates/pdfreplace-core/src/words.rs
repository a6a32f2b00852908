use crate::geometry::BBox;
use crate::text::{Char, lines_in_reading_order};

/// Options for word extraction.
#[derive(Debug, Clone)]
pub struct WordOptions {
    /// Maximum horizontal distance between characters to group into a word.
    pub x_tolerance: f64,
    /// Maximum vertical distance between characters to group into a word.
    pub y_tolerance: f64,
    /// If true, expand common Latin ligatures (U+FB00–U+FB06) to their multi-character equivalents.
    pub expand_ligatures: bool,
}

impl Default for WordOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            expand_ligatures: true,
        }
    }
}

/// A word extracted from a PDF page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word {
    /// The text content of this word.
    pub text: String,
    /// Bounding box encompassing all constituent characters.
    pub bbox: BBox,
}

/// Extracts words from a sequence of characters based on spatial proximity.
pub struct WordExtractor;

impl WordExtractor {
    /// Extract words from the given characters using the specified options.
    ///
    /// Characters are clustered into lines, sorted left to right, and split
    /// into words on whitespace glyphs or horizontal gaps wider than
    /// `x_tolerance`.
    pub fn extract(chars: &[Char], options: &WordOptions) -> Vec<Word> {
        let mut words = Vec::new();

        for line in lines_in_reading_order(chars, options.y_tolerance) {
            let mut current: Vec<&Char> = Vec::new();
            for ch in line {
                if ch.is_blank() {
                    Self::flush(&mut current, &mut words, options);
                    continue;
                }
                let split = current
                    .last()
                    .is_some_and(|last| Self::should_split(last, ch, options));
                if split {
                    Self::flush(&mut current, &mut words, options);
                }
                current.push(ch);
            }
            Self::flush(&mut current, &mut words, options);
        }
        words
    }

    /// Overlapping or touching glyphs (e.g. fake-bold double strikes) always
    /// stay in one word.
    fn should_split(last: &Char, current: &Char, options: &WordOptions) -> bool {
        let x_gap =
            (last.bbox.x0.max(current.bbox.x0) - last.bbox.x1.min(current.bbox.x1)).max(0.0);
        let y_diff = (current.bbox.top - last.bbox.top).abs();
        x_gap > options.x_tolerance || y_diff > options.y_tolerance
    }

    fn flush(current: &mut Vec<&Char>, words: &mut Vec<Word>, options: &WordOptions) {
        let Some(first) = current.first() else {
            return;
        };
        let raw_text: String = current.iter().map(|c| c.text.as_str()).collect();
        let text = if options.expand_ligatures {
            expand_ligatures_in_text(&raw_text)
        } else {
            raw_text
        };
        let bbox = current
            .iter()
            .skip(1)
            .fold(first.bbox, |acc, c| acc.union(&c.bbox));
        words.push(Word { text, bbox });
        current.clear();
    }
}

/// Expand common Latin ligatures (U+FB00–U+FB06) to their multi-character equivalents.
fn expand_ligatures_in_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{FB00}' => result.push_str("ff"),
            '\u{FB01}' => result.push_str("fi"),
            '\u{FB02}' => result.push_str("fl"),
            '\u{FB03}' => result.push_str("ffi"),
            '\u{FB04}' => result.push_str("ffl"),
            '\u{FB05}' => result.push_str("\u{017F}t"),
            '\u{FB06}' => result.push_str("st"),
            _ => result.push(ch),
        }
    }
    result
}
