//! Page type for accessing extracted text geometry.

use std::cell::OnceCell;

use pdfreplace_core::{
    BBox, Char, SearchMatch, SearchOptions, TextRun, Word, WordExtractor, WordOptions,
    group_text_runs, lines_in_reading_order, search_chars, text_in_bbox,
};

/// A single page of a PDF document.
///
/// Holds the page's positioned characters. Text runs and words are derived
/// on first use and cached, so every match on a page shares one index.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page index (0-based).
    page_number: usize,
    width: f64,
    height: f64,
    chars: Vec<Char>,
    runs: OnceCell<Vec<TextRun>>,
    words: OnceCell<Vec<Word>>,
}

impl Page {
    pub fn new(page_number: usize, width: f64, height: f64, chars: Vec<Char>) -> Self {
        Self {
            page_number,
            width,
            height,
            chars,
            runs: OnceCell::new(),
            words: OnceCell::new(),
        }
    }

    /// Returns the page index (0-based).
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// The page rectangle in top-left origin coordinates.
    pub fn bounds(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }

    pub fn chars(&self) -> &[Char] {
        &self.chars
    }

    /// Runs of text sharing one font, size and colour.
    pub fn text_runs(&self) -> &[TextRun] {
        self.runs.get_or_init(|| group_text_runs(&self.chars))
    }

    /// Words with the default tolerances.
    pub fn words(&self) -> &[Word] {
        self.words
            .get_or_init(|| WordExtractor::extract(&self.chars, &WordOptions::default()))
    }

    /// Extract words from this page using the specified options.
    pub fn extract_words(&self, options: &WordOptions) -> Vec<Word> {
        WordExtractor::extract(&self.chars, options)
    }

    /// Literal search; a match spanning lines has one rect per line.
    pub fn search(&self, pattern: &str, options: &SearchOptions) -> Vec<SearchMatch> {
        search_chars(&self.chars, pattern, options)
    }

    /// The page text in reading order, one line per visual line.
    pub fn extract_text(&self) -> String {
        lines_in_reading_order(&self.chars, 3.0)
            .into_iter()
            .map(|line| line.into_iter().map(|c| c.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text whose glyphs lie mostly inside `area`.
    pub fn text_in(&self, area: &BBox) -> String {
        text_in_bbox(&self.chars, area)
    }
}
