//! lopdf-based document access.
//!
//! [`LopdfDocument`] wraps a [`lopdf::Document`] with the page-level reads
//! and writes the replacement engine needs: geometry, resources, content
//! bytes, content replacement and serialization.

use lopdf::{Dictionary, Object, ObjectId, Stream};
use pdfreplace_core::BBox;

use crate::error::BackendError;
use crate::page_geometry::PageGeometry;

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Ordered page object ids (0-based page number).
    page_ids: Vec<ObjectId>,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &Object) -> Result<f64, BackendError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(f64::from(*f)),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Like [`object_to_f64`] but `None` for anything that is not a number.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    object_to_f64(obj).ok()
}

/// Follow one level of indirection.
pub(crate) fn resolve_ref<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Resolve `key` in `dict` to a dictionary, following a reference.
pub(crate) fn dict_entry<'a>(
    doc: &'a lopdf::Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    dict.get(key)
        .ok()
        .map(|o| resolve_ref(doc, o))
        .and_then(|o| o.as_dict().ok())
}

/// Look up a key on a page, walking up `/Parent` links when absent.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    // Bounded walk in case of a cyclic /Parent chain.
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent").and_then(|p| p.as_reference()) {
            Ok(parent) => current_id = parent,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

fn decode_stream(stream: &Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Decoded bytes of the stream behind `obj` (direct or referenced).
pub(crate) fn stream_bytes(doc: &lopdf::Document, obj: &Object) -> Result<Vec<u8>, BackendError> {
    let stream = resolve_ref(doc, obj)
        .as_stream()
        .map_err(|e| BackendError::Parse(format!("expected a stream: {e}")))?;
    decode_stream(stream)
}

impl LopdfDocument {
    /// Parse PDF bytes. Encrypted documents are rejected.
    pub fn open(bytes: &[u8]) -> Result<Self, BackendError> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        if inner.is_encrypted() {
            return Err(BackendError::Parse("PDF is encrypted".to_string()));
        }
        Ok(Self::from_document(inner))
    }

    /// Wrap an already loaded lopdf document.
    pub fn from_document(inner: lopdf::Document) -> Self {
        // get_pages returns a BTreeMap keyed by 1-based page number.
        let page_ids = inner.get_pages().values().copied().collect();
        Self { inner, page_ids }
    }

    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut lopdf::Document {
        &mut self.inner
    }

    pub fn into_inner(self) -> lopdf::Document {
        self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Object id of the page at 0-based `index`.
    pub fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {index} out of range (0..{})",
                self.page_ids.len()
            ))
        })
    }

    /// `/MediaBox` (inherited if needed), defaulting to US Letter.
    pub fn page_geometry(&self, index: usize) -> Result<PageGeometry, BackendError> {
        let page_id = self.page_id(index)?;
        let media_box = match resolve_inherited(&self.inner, page_id, b"MediaBox")? {
            Some(obj) => {
                let array = resolve_ref(&self.inner, obj)
                    .as_array()
                    .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
                if array.len() != 4 {
                    return Err(BackendError::Parse(format!(
                        "expected 4-element MediaBox, got {}",
                        array.len()
                    )));
                }
                let v = array
                    .iter()
                    .map(|o| object_to_f64(resolve_ref(&self.inner, o)))
                    .collect::<Result<Vec<f64>, _>>()?;
                BBox::new(v[0], v[1], v[2], v[3])
            }
            None => BBox::new(0.0, 0.0, 612.0, 792.0),
        };
        Ok(PageGeometry::new(media_box))
    }

    /// The page's resource dictionary (inherited if needed), or an empty one.
    pub fn page_resources(&self, index: usize) -> Result<Dictionary, BackendError> {
        let page_id = self.page_id(index)?;
        match resolve_inherited(&self.inner, page_id, b"Resources")? {
            Some(obj) => resolve_ref(&self.inner, obj)
                .as_dict()
                .cloned()
                .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
            None => Ok(Dictionary::new()),
        }
    }

    /// Decoded page content, concatenating every stream of a `/Contents`
    /// array.
    pub fn page_content(&self, index: usize) -> Result<Vec<u8>, BackendError> {
        let page_id = self.page_id(index)?;
        let page = self
            .inner
            .get_dictionary(page_id)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        let Ok(contents) = page.get(b"Contents") else {
            return Ok(Vec::new());
        };
        match resolve_ref(&self.inner, contents) {
            Object::Array(items) => {
                let mut content = Vec::new();
                for item in items {
                    if !content.is_empty() {
                        content.push(b'\n');
                    }
                    content.extend(stream_bytes(&self.inner, item)?);
                }
                Ok(content)
            }
            other => stream_bytes(&self.inner, other),
        }
    }

    /// Replace the page content with a single new stream.
    pub fn set_page_content(&mut self, index: usize, content: Vec<u8>) -> Result<(), BackendError> {
        let page_id = self.page_id(index)?;
        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), content));
        self.page_dict_mut(page_id)?
            .set("Contents", Object::Reference(stream_id));
        Ok(())
    }

    /// Append a content stream after the existing ones.
    pub fn append_page_content(&mut self, index: usize, content: Vec<u8>) -> Result<(), BackendError> {
        let page_id = self.page_id(index)?;
        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), content));
        let existing = self
            .inner
            .get_dictionary(page_id)
            .ok()
            .and_then(|d| d.get(b"Contents").ok().cloned());
        let mut items = match existing {
            Some(Object::Array(items)) => items,
            Some(Object::Reference(id)) => match self.inner.get_object(id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(other) => vec![other],
            None => Vec::new(),
        };
        items.push(Object::Reference(stream_id));
        self.page_dict_mut(page_id)?
            .set("Contents", Object::Array(items));
        Ok(())
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary, BackendError> {
        self.inner
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))
    }

    /// Copy the effective resources onto the page itself so they can be
    /// modified without touching shared parents, returning the font
    /// sub-dictionary for editing.
    pub fn localize_page_fonts(&mut self, index: usize) -> Result<&mut Dictionary, BackendError> {
        let page_id = self.page_id(index)?;
        let mut resources = self.page_resources(index)?;
        let fonts = dict_entry(&self.inner, &resources, b"Font")
            .cloned()
            .unwrap_or_default();
        resources.set("Font", Object::Dictionary(fonts));
        let page = self.page_dict_mut(page_id)?;
        page.set("Resources", Object::Dictionary(resources));
        page.get_mut(b"Resources")
            .and_then(|r| r.as_dict_mut())
            .and_then(|r| r.get_mut(b"Font"))
            .and_then(|f| f.as_dict_mut())
            .map_err(|e| BackendError::Parse(format!("failed to localize resources: {e}")))
    }

    /// Serialize the document, compressing streams.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, BackendError> {
        self.inner.compress();
        let mut out = Vec::new();
        self.inner
            .save_to(&mut out)
            .map_err(|e| BackendError::Write(format!("failed to save PDF: {e}")))?;
        Ok(out)
    }
}
