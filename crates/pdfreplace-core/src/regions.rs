//! Match regions: merging raw search rectangles into line-level regions and
//! widening partial matches to the whole word.

use crate::casing::replace_case_insensitive;
use crate::geometry::BBox;
use crate::words::Word;

/// Minimum vertical overlap ratio (overlap / smaller height) for two
/// rectangles to count as the same visual line.
pub const SAME_LINE_OVERLAP_RATIO: f64 = 0.3;

/// Maximum vertical center distance, as a fraction of the smaller height,
/// for two rectangles to count as the same visual line.
pub const SAME_LINE_CENTER_RATIO: f64 = 0.8;

/// A rectangular area targeted for redaction and replacement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchRegion {
    /// Area to redact, top-left origin.
    pub rect: BBox,
    /// Text that was covered by the region (empty when unknown).
    pub original_text: String,
    /// Text to draw into the region.
    pub replacement_text: String,
}

fn on_same_line(a: &BBox, b: &BBox) -> bool {
    let min_h = a.height().min(b.height()).max(1.0);
    if a.vertical_overlap(b) / min_h >= SAME_LINE_OVERLAP_RATIO {
        return true;
    }
    (a.center_y() - b.center_y()).abs() < min_h * SAME_LINE_CENTER_RATIO
}

/// Merge rectangles that sit on the same visual line or overlap.
///
/// Input order does not matter: rectangles are sorted top-to-bottom then
/// left-to-right and each one is folded into the previous merged box when
/// they intersect or share a line. Every merged box is then padded by
/// `max(2, 0.15·h)` horizontally and `max(1, 0.08·h)` vertically.
pub fn merge_close_rects(rects: &[BBox]) -> Vec<BBox> {
    let mut sorted: Vec<BBox> = rects
        .iter()
        .copied()
        .filter(|r| r.width() > 0.0 || r.height() > 0.0)
        .collect();
    sorted.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

    let mut merged: Vec<BBox> = Vec::new();
    for rect in sorted {
        match merged.last_mut() {
            Some(last) if last.intersects(&rect) || on_same_line(last, &rect) => {
                *last = last.union(&rect);
            }
            _ => merged.push(rect),
        }
    }

    merged
        .into_iter()
        .map(|r| {
            let h = r.height();
            r.expand((h * 0.15).max(2.0), (h * 0.08).max(1.0))
        })
        .collect()
}

/// Result of widening a match to the word that contains it.
#[derive(Debug, Clone, PartialEq)]
pub struct WordExpansion {
    /// Padded bounding box of the whole word.
    pub rect: BBox,
    /// The full word as rendered.
    pub word_text: String,
    /// The word with the search text replaced.
    pub replaced_text: String,
}

/// Widen a match to the page word that contains it.
///
/// Only applies when `find_text` has no whitespace. The candidate word must
/// contain `find_text` (case-insensitive) and overlap `rect` with positive
/// area; the largest overlap wins and ties keep the earliest word.
pub fn expand_region_to_word(
    rect: &BBox,
    words: &[Word],
    find_text: &str,
    replace_text: &str,
) -> Option<WordExpansion> {
    let find = find_text.trim();
    if find.is_empty() || find.chars().any(char::is_whitespace) {
        return None;
    }
    let find_lower = find.to_lowercase();

    let mut best: Option<(&Word, f64)> = None;
    for word in words {
        if word.text.is_empty() || !word.text.to_lowercase().contains(&find_lower) {
            continue;
        }
        let area = word.bbox.intersection_area(rect);
        if area > best.map_or(0.0, |(_, a)| a) {
            best = Some((word, area));
        }
    }

    let (word, _) = best?;
    let h = word.bbox.height().max(1.0);
    Some(WordExpansion {
        rect: word.bbox.expand((h * 0.10).max(1.5), (h * 0.06).max(1.0)),
        word_text: word.text.clone(),
        replaced_text: replace_case_insensitive(&word.text, find, replace_text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x0: f64, top: f64, x1: f64, bottom: f64) -> Word {
        Word {
            text: text.to_string(),
            bbox: BBox::new(x0, top, x1, bottom),
        }
    }

    #[test]
    fn test_same_line_fragments_merge() {
        let rects = [
            BBox::new(10.0, 100.0, 30.0, 112.0),
            BBox::new(80.0, 101.0, 120.0, 113.0),
        ];
        let merged = merge_close_rects(&rects);
        assert_eq!(merged.len(), 1);
        // h = 13, pad_x = max(2, 1.95) = 2, pad_y = max(1, 1.04) = 1.04
        let r = merged[0];
        assert!((r.x0 - 8.0).abs() < 1e-9);
        assert!((r.x1 - 122.0).abs() < 1e-9);
        assert!((r.top - 98.96).abs() < 1e-9);
        assert!((r.bottom - 114.04).abs() < 1e-9);
    }

    #[test]
    fn test_different_lines_stay_separate() {
        let rects = [
            BBox::new(10.0, 130.0, 40.0, 142.0),
            BBox::new(10.0, 100.0, 40.0, 112.0),
        ];
        let merged = merge_close_rects(&rects);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].top < merged[1].top);
    }

    #[test]
    fn test_close_centers_merge_with_small_overlap() {
        // Overlap ratio 0.25 is too small, but the centers are 7.5 apart
        // which is under 0.8 * 10.
        let rects = [
            BBox::new(0.0, 0.0, 10.0, 10.0),
            BBox::new(20.0, 7.5, 30.0, 17.5),
        ];
        assert_eq!(merge_close_rects(&rects).len(), 1);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_close_rects(&[]).is_empty());
    }

    #[test]
    fn test_expand_partial_match_to_word() {
        let words = [
            word("Hello", 10.0, 100.0, 40.0, 112.0),
            word("Arunesh", 50.0, 100.0, 92.0, 112.0),
        ];
        let rect = BBox::new(50.0, 100.0, 74.0, 112.0);
        let exp = expand_region_to_word(&rect, &words, "arun", "Varun").unwrap();
        assert_eq!(exp.word_text, "Arunesh");
        assert_eq!(exp.replaced_text, "Varunesh");
        // h = 12, pad_x = max(1.5, 1.2) = 1.5, pad_y = max(1, 0.72) = 1
        assert_eq!(exp.rect, BBox::new(48.5, 99.0, 93.5, 113.0));
    }

    #[test]
    fn test_expand_skips_whitespace_queries() {
        let words = [word("Jane", 10.0, 100.0, 40.0, 112.0)];
        let rect = BBox::new(10.0, 100.0, 40.0, 112.0);
        assert!(expand_region_to_word(&rect, &words, "Jane Doe", "x").is_none());
        assert!(expand_region_to_word(&rect, &words, "  ", "x").is_none());
    }

    #[test]
    fn test_expand_requires_positive_overlap() {
        let words = [word("Arunesh", 200.0, 100.0, 242.0, 112.0)];
        let rect = BBox::new(50.0, 100.0, 74.0, 112.0);
        assert!(expand_region_to_word(&rect, &words, "arun", "x").is_none());
    }

    #[test]
    fn test_expand_picks_largest_overlap() {
        let words = [
            word("arun1", 40.0, 100.0, 60.0, 112.0),
            word("arun2", 58.0, 100.0, 90.0, 112.0),
        ];
        let rect = BBox::new(55.0, 100.0, 85.0, 112.0);
        let exp = expand_region_to_word(&rect, &words, "ARUN", "x").unwrap();
        assert_eq!(exp.word_text, "arun2");
        assert_eq!(exp.replaced_text, "x2");
    }
}
