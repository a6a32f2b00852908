//! Page-collection operations: merge, reorder and remove.
//!
//! Page lists are written the way people type them: `"1,3,5-7"` for a set,
//! `"3,1,2"` for a permutation, all 1-based.

use std::collections::BTreeSet;

use lopdf::Document;
use pdfreplace_core::PdfError;
use pdfreplace_parse::{LopdfDocument, page_tree};
use tracing::debug;

fn load(bytes: &[u8]) -> Result<Document, PdfError> {
    LopdfDocument::open(bytes)
        .map(LopdfDocument::into_inner)
        .map_err(|e| PdfError::invalid(format!("failed to open PDF: {e}")))
}

fn save(doc: Document) -> Result<Vec<u8>, PdfError> {
    Ok(LopdfDocument::from_document(doc).save_to_bytes()?)
}

fn parse_positive(value: &str, name: &str) -> Result<usize, PdfError> {
    let parsed: i64 = value
        .trim()
        .parse()
        .map_err(|_| PdfError::invalid(format!("{name} must be an integer")))?;
    if parsed < 1 {
        return Err(PdfError::invalid(format!("{name} must be >= 1")));
    }
    Ok(parsed as usize)
}

fn check_bounds(one_based: usize, page_count: usize) -> Result<usize, PdfError> {
    if one_based > page_count {
        return Err(PdfError::invalid(format!(
            "page {one_based} is out of bounds (1..{page_count})"
        )));
    }
    Ok(one_based - 1)
}

/// Parse a page set such as `"1,3,5-7"` into sorted 0-based indices.
pub fn parse_page_ranges(pages: &str, page_count: usize) -> Result<BTreeSet<usize>, PdfError> {
    if page_count == 0 {
        return Err(PdfError::invalid("PDF has no pages"));
    }
    let cleaned = pages.trim();
    if cleaned.is_empty() {
        return Err(PdfError::invalid("pages is required"));
    }

    let mut indices = BTreeSet::new();
    for part in cleaned.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_positive(start, "range start")?;
                let end = parse_positive(end, "range end")?;
                if end < start {
                    return Err(PdfError::invalid("range end must be >= range start"));
                }
                for one_based in start..=end {
                    indices.insert(check_bounds(one_based, page_count)?);
                }
            }
            None => {
                let one_based = parse_positive(part, "page")?;
                indices.insert(check_bounds(one_based, page_count)?);
            }
        }
    }
    Ok(indices)
}

/// Parse a permutation such as `"3,1,2"` into 0-based indices. Every page
/// must appear exactly once.
pub fn parse_reorder(order: &str, page_count: usize) -> Result<Vec<usize>, PdfError> {
    if page_count == 0 {
        return Err(PdfError::invalid("PDF has no pages"));
    }
    let cleaned = order.trim();
    if cleaned.is_empty() {
        return Err(PdfError::invalid("order is required"));
    }

    let parts: Vec<&str> = cleaned
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != page_count {
        return Err(PdfError::invalid(format!(
            "order must specify exactly {page_count} pages"
        )));
    }

    let mut seen = vec![false; page_count];
    let mut result = Vec::with_capacity(page_count);
    for part in parts {
        let one_based = parse_positive(part, "order item")?;
        if one_based > page_count {
            return Err(PdfError::invalid(format!(
                "order contains out-of-bounds page {one_based} (1..{page_count})"
            )));
        }
        let index = one_based - 1;
        if std::mem::replace(&mut seen[index], true) {
            return Err(PdfError::invalid("order contains duplicates"));
        }
        result.push(index);
    }
    Ok(result)
}

/// Concatenate `documents` in order.
pub fn merge_pdfs<B: AsRef<[u8]>>(documents: &[B]) -> Result<Vec<u8>, PdfError> {
    if documents.is_empty() {
        return Err(PdfError::invalid("At least one PDF is required"));
    }
    let docs = documents
        .iter()
        .map(|bytes| load(bytes.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let merged = page_tree::merge_documents(docs)?;
    debug!(inputs = documents.len(), "merged PDFs");
    save(merged)
}

/// Rearrange pages so output page `i` is input page `order[i]`.
pub fn reorder_pages(bytes: &[u8], order: &str) -> Result<Vec<u8>, PdfError> {
    let mut doc = load(bytes)?;
    let order = parse_reorder(order, doc.get_pages().len())?;
    page_tree::reorder_pages(&mut doc, &order)?;
    save(doc)
}

/// Drop the listed pages, keeping the rest in their original order.
pub fn remove_pages(bytes: &[u8], pages: &str) -> Result<Vec<u8>, PdfError> {
    let mut doc = load(bytes)?;
    let indices: Vec<usize> = parse_page_ranges(pages, doc.get_pages().len())?
        .into_iter()
        .collect();
    page_tree::remove_pages(&mut doc, &indices)?;
    debug!(removed = indices.len(), "removed pages");
    save(doc)
}
