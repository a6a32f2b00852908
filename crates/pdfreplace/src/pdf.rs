//! Top-level PDF document type for reading and editing pages.

use pdfreplace_core::{BBox, PdfError, SearchMatch, SearchOptions};
use pdfreplace_parse::{
    FontEmbedder, LopdfDocument, PageGeometry, RedactionReport, TextInsertion, extract_page_chars,
    redact_regions,
};

use crate::Page;

/// Iterator over pages of a PDF document, yielding each page on demand.
///
/// Created by [`Pdf::pages_iter()`]. Pages are not retained after being
/// yielded.
pub struct PagesIter<'a> {
    pdf: &'a Pdf,
    current: usize,
    count: usize,
}

impl Iterator for PagesIter<'_> {
    type Item = Result<Page, PdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.count {
            return None;
        }
        let result = self.pdf.page(self.current);
        self.current += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PagesIter<'_> {}

/// A PDF document opened for reading and in-place editing.
///
/// # Example
///
/// ```ignore
/// let mut pdf = Pdf::open(&bytes)?;
/// let page = pdf.page(0)?;
/// let hits = page.search("invoice", &SearchOptions::default());
/// pdf.redact(0, &[hits[0].rects[0]])?;
/// let edited = pdf.to_bytes()?;
/// ```
#[derive(Debug)]
pub struct Pdf {
    doc: LopdfDocument,
}

impl Pdf {
    /// Open a PDF from bytes. Any parse failure, including encryption, is
    /// reported as invalid input.
    pub fn open(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = LopdfDocument::open(bytes)
            .map_err(|e| PdfError::InvalidInput(format!("failed to open PDF: {e}")))?;
        Ok(Self { doc })
    }

    /// Read a PDF file from disk and open it.
    pub fn open_file(path: impl AsRef<std::path::Path>) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::open(&bytes)
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// Page geometry (MediaBox and coordinate conversion) for `index`.
    pub fn geometry(&self, index: usize) -> Result<PageGeometry, PdfError> {
        Ok(self.doc.page_geometry(index)?)
    }

    /// Access a page by 0-based index, extracting its characters.
    pub fn page(&self, index: usize) -> Result<Page, PdfError> {
        let geometry = self.doc.page_geometry(index)?;
        let collected = extract_page_chars(&self.doc, index)?;
        Ok(Page::new(
            index,
            geometry.width(),
            geometry.height(),
            collected.chars,
        ))
    }

    pub fn pages_iter(&self) -> PagesIter<'_> {
        PagesIter {
            pdf: self,
            current: 0,
            count: self.page_count(),
        }
    }

    /// Search every page, returning `(page index, match)` pairs in page
    /// order.
    pub fn search_all(
        &self,
        pattern: &str,
        options: &SearchOptions,
    ) -> Result<Vec<(usize, SearchMatch)>, PdfError> {
        let mut all = Vec::new();
        for page in self.pages_iter() {
            let page = page?;
            let index = page.page_number();
            all.extend(page.search(pattern, options).into_iter().map(|m| (index, m)));
        }
        Ok(all)
    }

    /// Remove the text under `regions` (display coordinates) and paint
    /// them white.
    pub fn redact(&mut self, index: usize, regions: &[BBox]) -> Result<RedactionReport, PdfError> {
        Ok(redact_regions(&mut self.doc, index, regions)?)
    }

    /// Draw text on page `index`. Coordinates are PDF user space.
    pub fn insert_text(
        &mut self,
        embedder: &mut FontEmbedder,
        index: usize,
        insertion: &TextInsertion<'_>,
    ) -> Result<(), PdfError> {
        Ok(embedder.insert_text(&mut self.doc, index, insertion)?)
    }

    /// The underlying lopdf document.
    pub fn document(&self) -> &lopdf::Document {
        self.doc.inner()
    }

    /// Serialize the edited document with compressed streams.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, PdfError> {
        Ok(self.doc.save_to_bytes()?)
    }
}
