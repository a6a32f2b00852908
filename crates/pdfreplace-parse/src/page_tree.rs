//! Page composition: merging documents, reordering and removing pages.
//!
//! All three rebuild a flat page tree. Attributes a page inherits from its
//! ancestors are copied onto the page first so it renders the same under the
//! new single `/Pages` node, then unreachable objects are pruned.

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfreplace_core::PdfError;

use crate::error::BackendError;
use crate::lopdf_backend::resolve_inherited;

/// Page attributes that may be inherited through the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

fn invalid(msg: impl Into<String>) -> BackendError {
    BackendError::Core(PdfError::invalid(msg))
}

fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Copy inherited attributes onto each page in `pages`.
fn flatten_inherited(doc: &mut Document, pages: &[ObjectId]) -> Result<(), BackendError> {
    for &page_id in pages {
        let mut missing: Vec<(&[u8], Object)> = Vec::new();
        for key in INHERITABLE {
            let own = doc
                .get_dictionary(page_id)
                .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?
                .has(key);
            if own {
                continue;
            }
            if let Some(value) = resolve_inherited(doc, page_id, key)? {
                missing.push((key, value.clone()));
            }
        }
        let page = doc
            .get_dictionary_mut(page_id)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        for (key, value) in missing {
            page.set(key.to_vec(), value);
        }
    }
    Ok(())
}

fn root_id(doc: &Document) -> Result<ObjectId, BackendError> {
    doc.trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|e| BackendError::Parse(format!("document has no catalog: {e}")))
}

/// Install a fresh `/Pages` node holding exactly `pages`, in order, and drop
/// whatever is no longer reachable.
fn install_page_tree(doc: &mut Document, pages: &[ObjectId]) -> Result<(), BackendError> {
    let pages_id = doc.new_object_id();
    for &page_id in pages {
        doc.get_dictionary_mut(page_id)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?
            .set("Parent", Object::Reference(pages_id));
    }
    let mut node = Dictionary::new();
    node.set("Type", Object::Name(b"Pages".to_vec()));
    node.set(
        "Kids",
        Object::Array(pages.iter().map(|&id| Object::Reference(id)).collect()),
    );
    node.set("Count", Object::Integer(pages.len() as i64));
    doc.objects.insert(pages_id, Object::Dictionary(node));

    let root = root_id(doc)?;
    doc.get_dictionary_mut(root)
        .map_err(|e| BackendError::Parse(format!("failed to get catalog: {e}")))?
        .set("Pages", Object::Reference(pages_id));
    doc.prune_objects();
    Ok(())
}

/// Concatenate the pages of `documents`, in order, into one document.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document, BackendError> {
    if documents.is_empty() {
        return Err(invalid("At least one PDF is required"));
    }

    let mut merged = Document::with_version("1.5");
    let mut kids: Vec<ObjectId> = Vec::new();
    let mut next_id: u32 = 1;
    for mut doc in documents {
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        let pages = page_ids(&doc);
        flatten_inherited(&mut doc, &pages)?;
        kids.extend(pages);
        // Source catalogs and page nodes become unreachable and are pruned.
        merged.objects.extend(doc.objects);
    }
    merged.max_id = next_id - 1;

    let catalog_id = merged.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    install_page_tree(&mut merged, &kids)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(pages = kids.len(), "merged documents");
    Ok(merged)
}

/// Rearrange pages so that output page `i` is input page `order[i]`
/// (0-based). `order` must be a permutation of every page index.
pub fn reorder_pages(doc: &mut Document, order: &[usize]) -> Result<(), BackendError> {
    let pages = page_ids(doc);
    if order.len() != pages.len() {
        return Err(invalid(format!(
            "order must specify exactly {} pages",
            pages.len()
        )));
    }
    let mut seen = vec![false; pages.len()];
    for &index in order {
        match seen.get_mut(index) {
            None => {
                return Err(invalid(format!(
                    "order contains out-of-bounds page {} (1..{})",
                    index + 1,
                    pages.len()
                )));
            }
            Some(true) => return Err(invalid("order contains duplicates")),
            Some(flag) => *flag = true,
        }
    }

    flatten_inherited(doc, &pages)?;
    let reordered: Vec<ObjectId> = order.iter().map(|&i| pages[i]).collect();
    install_page_tree(doc, &reordered)
}

/// Drop the pages at the given 0-based indices, keeping the rest in order.
pub fn remove_pages(doc: &mut Document, indices: &[usize]) -> Result<(), BackendError> {
    let pages = page_ids(doc);
    if let Some(&bad) = indices.iter().find(|&&i| i >= pages.len()) {
        return Err(invalid(format!(
            "page {} is out of bounds (1..{})",
            bad + 1,
            pages.len()
        )));
    }
    let kept: Vec<ObjectId> = pages
        .iter()
        .enumerate()
        .filter(|(i, _)| !indices.contains(i))
        .map(|(_, &id)| id)
        .collect();
    if kept.is_empty() {
        return Err(invalid("cannot remove all pages"));
    }

    flatten_inherited(doc, &kept)?;
    install_page_tree(doc, &kept)
}
