//! pdfreplace-core: Backend-independent data types and algorithms.
//!
//! This crate provides the foundational types (BBox, Char, Word, TextRun,
//! MatchRegion, FontDescriptor) and the pure algorithms of the replacement
//! engine: text search, region merging, word expansion, casing, font-name
//! heuristics, font-file scoring and fitting math. It performs no I/O.

pub mod casing;
pub mod error;
pub mod fitting;
pub mod font_names;
pub mod font_score;
pub mod geometry;
pub mod painting;
pub mod regions;
pub mod search;
pub mod text;
pub mod words;

pub use casing::{
    compose_text, introduces_new_chars, match_replacement_case, replace_case_insensitive,
    title_case,
};
pub use error::PdfError;
pub use fitting::{
    MIN_FONT_SIZE, TrackingCheck, baseline_y, distribute_offsets, estimate_font_size,
    fit_font_size, should_distribute, usable_width,
};
pub use font_names::{
    BuiltinFace, BuiltinFamily, FamilyBucket, FontDescriptor, StyleFlags, classify_family,
    infer_bold_italic, is_computer_modern, is_subset_name, map_to_builtin, normalize_font_name,
};
pub use font_score::{best_font_filename, family_key, has_font_extension, score_font_filename};
pub use geometry::{BBox, Ctm, Point};
pub use painting::Color;
pub use regions::{MatchRegion, WordExpansion, expand_region_to_word, merge_close_rects};
pub use search::{SearchMatch, SearchOptions, search_chars};
pub use text::{Char, TextRun, group_text_runs, lines_in_reading_order, text_in_bbox};
pub use words::{Word, WordExtractor, WordOptions};
