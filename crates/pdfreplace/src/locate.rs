//! Match Locator: where on a page the search text occurs, as merged,
//! padded and word-expanded regions.

use pdfreplace_core::{
    BBox, MatchRegion, SearchOptions, expand_region_to_word, merge_close_rects,
};

use crate::Page;

/// Regions to redact and refill for every case-insensitive occurrence of
/// `find` on `page`, ordered top to bottom then left to right.
///
/// Occurrences on one visual line are merged into a single region. When
/// `find` is a single token the region grows to the whole word containing
/// it, and the replacement becomes that word with `find` substituted.
pub fn locate_matches(page: &Page, find: &str, replace: &str) -> Vec<MatchRegion> {
    let options = SearchOptions {
        case_sensitive: false,
        ..SearchOptions::default()
    };
    let raw: Vec<BBox> = page
        .search(find, &options)
        .into_iter()
        .flat_map(|m| m.rects)
        .collect();
    if raw.is_empty() {
        return Vec::new();
    }

    let bounds = page.bounds();
    let mut regions: Vec<MatchRegion> = merge_close_rects(&raw)
        .into_iter()
        .map(|rect| match expand_region_to_word(&rect, page.words(), find, replace) {
            Some(word) => MatchRegion {
                rect: word.rect.clamp_to(&bounds),
                original_text: word.word_text,
                replacement_text: word.replaced_text,
            },
            None => {
                let original = page.text_in(&rect);
                MatchRegion {
                    rect: rect.clamp_to(&bounds),
                    original_text: if original.is_empty() {
                        find.to_string()
                    } else {
                        original
                    },
                    replacement_text: replace.to_string(),
                }
            }
        })
        .collect();
    regions.sort_by(|a, b| {
        a.rect
            .top
            .total_cmp(&b.rect.top)
            .then(a.rect.x0.total_cmp(&b.rect.x0))
    });
    regions
}
