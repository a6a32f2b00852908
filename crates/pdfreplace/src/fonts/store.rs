//! The pass-scoped font directory.
//!
//! Uploaded fonts and programs extracted from the document are written into
//! a temporary directory owned by [`FontStore`]. Dropping the store removes
//! the directory, so nothing written during one pass is visible to another.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use lopdf::Document;
use pdfreplace_core::{PdfError, has_font_extension, normalize_font_name};
use pdfreplace_parse::{EmbeddedFont, find_in_fonts, list_embedded_fonts, write_font_program};
use regex::Regex;
use tempfile::TempDir;
use tracing::debug;

use crate::config::{MAX_UPLOADED_FONT_BYTES, MAX_UPLOADED_FONTS};

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid regex"));

/// A font file supplied with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFont {
    pub filename: String,
    pub data: Vec<u8>,
}

impl UploadedFont {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }
}

/// Base name of `name` with every run of characters outside
/// `[A-Za-z0-9._-]` replaced by `_`.
pub fn sanitize_font_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let base = if base.is_empty() { "font" } else { base };
    UNSAFE_FILENAME_CHARS.replace_all(base, "_").into_owned()
}

/// Check upload count, size and extension limits.
pub fn validate_uploads(uploads: &[UploadedFont]) -> Result<(), PdfError> {
    if uploads.len() > MAX_UPLOADED_FONTS {
        return Err(PdfError::invalid(format!(
            "at most {MAX_UPLOADED_FONTS} font files are allowed"
        )));
    }
    for upload in uploads {
        if upload.data.len() > MAX_UPLOADED_FONT_BYTES {
            return Err(PdfError::invalid(format!(
                "font file {} exceeds 5MB",
                upload.filename
            )));
        }
        if !has_font_extension(upload.filename.trim()) {
            return Err(PdfError::invalid(format!(
                "font file {} must be .ttf or .otf",
                upload.filename
            )));
        }
    }
    Ok(())
}

/// Temporary font storage for one replacement pass.
#[derive(Debug)]
pub struct FontStore {
    dir: TempDir,
    uploaded_dir: Option<PathBuf>,
    /// The document's own embedded fonts, listed before anything was
    /// inserted.
    originals: Option<Vec<EmbeddedFont>>,
    /// Normalized font name to extracted program path (`None`: not
    /// embedded or not extractable).
    embedded: HashMap<String, Option<PathBuf>>,
}

impl FontStore {
    pub fn new() -> Result<Self, PdfError> {
        let dir = tempfile::Builder::new()
            .prefix("pdfreplace_fonts_")
            .tempdir()
            .map_err(|e| PdfError::IoError(format!("failed to create font directory: {e}")))?;
        Ok(Self {
            dir,
            uploaded_dir: None,
            originals: None,
            embedded: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding this pass's uploads, once any were written.
    pub fn uploaded_dir(&self) -> Option<&Path> {
        self.uploaded_dir.as_deref()
    }

    /// Write uploads as `{index:02}_{sanitized name}`. Empty files are
    /// skipped; limits are checked by [`validate_uploads`].
    pub fn add_uploads(&mut self, uploads: &[UploadedFont]) -> Result<(), PdfError> {
        let dir = self.dir.path().join("uploaded_fonts");
        let mut written = 0;
        for (i, upload) in uploads.iter().enumerate() {
            if upload.data.is_empty() {
                continue;
            }
            let name = format!("{i:02}_{}", sanitize_font_filename(&upload.filename));
            if !has_font_extension(&name) {
                continue;
            }
            std::fs::create_dir_all(&dir)?;
            std::fs::write(dir.join(&name), &upload.data)?;
            written += 1;
        }
        if written > 0 {
            debug!(count = written, "stored uploaded fonts");
            self.uploaded_dir = Some(dir);
        }
        Ok(())
    }

    /// Record the document's embedded fonts. Must run before the pass inserts
    /// fonts of its own; otherwise the first lookup takes the snapshot.
    pub fn snapshot_embedded(&mut self, doc: &Document) {
        let fonts = list_embedded_fonts(doc);
        debug!(count = fonts.len(), "embedded fonts indexed");
        self.originals = Some(fonts);
    }

    /// Extract the document's program for `raw_name`, at most once per
    /// normalized name.
    pub fn embedded_font(&mut self, doc: &Document, raw_name: &str) -> Option<PathBuf> {
        let key = normalize_font_name(raw_name);
        if key.is_empty() {
            return None;
        }
        if let Some(cached) = self.embedded.get(&key) {
            return cached.clone();
        }
        if self.originals.is_none() {
            self.snapshot_embedded(doc);
        }
        let originals = self.originals.as_deref().unwrap_or_default();
        let extracted = find_in_fonts(originals, &key).and_then(|font| {
            match write_font_program(doc, font, self.dir.path()) {
                Ok(path) => Some(path),
                Err(e) => {
                    debug!(font = %font.base_font, error = %e, "embedded font not extractable");
                    None
                }
            }
        });
        self.embedded.insert(key, extracted.clone());
        extracted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_font_filename("My Font (Bold).ttf"), "My_Font_Bold_.ttf");
        assert_eq!(sanitize_font_filename("../../etc/evil.otf"), "evil.otf");
        assert_eq!(sanitize_font_filename("C:\\fonts\\Arial.ttf"), "Arial.ttf");
        assert_eq!(sanitize_font_filename(""), "font");
    }

    #[test]
    fn validates_limits() {
        let ok = UploadedFont::new("a.TTF", vec![1, 2, 3]);
        assert!(validate_uploads(std::slice::from_ref(&ok)).is_ok());

        let too_many = vec![ok.clone(); MAX_UPLOADED_FONTS + 1];
        let err = validate_uploads(&too_many).unwrap_err();
        assert!(err.to_string().contains("at most 20 font files"));

        let big = UploadedFont::new("big.ttf", vec![0; MAX_UPLOADED_FONT_BYTES + 1]);
        let err = validate_uploads(&[big]).unwrap_err();
        assert!(err.to_string().contains("font file big.ttf exceeds 5MB"));

        let wrong = UploadedFont::new("font.woff", vec![1]);
        let err = validate_uploads(&[wrong]).unwrap_err();
        assert!(err.to_string().contains("must be .ttf or .otf"));
    }

    #[test]
    fn writes_uploads_with_index_prefix() {
        let mut store = FontStore::new().unwrap();
        store
            .add_uploads(&[
                UploadedFont::new("empty.ttf", Vec::new()),
                UploadedFont::new("My Font.otf", b"OTTO".to_vec()),
            ])
            .unwrap();
        let dir = store.uploaded_dir().unwrap();
        let written = dir.join("01_My_Font.otf");
        assert_eq!(std::fs::read(written).unwrap(), b"OTTO");
        assert!(!dir.join("00_empty.ttf").exists());
    }

    #[test]
    fn no_uploads_means_no_directory() {
        let mut store = FontStore::new().unwrap();
        store.add_uploads(&[]).unwrap();
        assert!(store.uploaded_dir().is_none());
    }

    #[test]
    fn directory_is_removed_on_drop() {
        let store = FontStore::new().unwrap();
        let path = store.path().to_path_buf();
        assert!(path.is_dir());
        drop(store);
        assert!(!path.exists());
    }

    #[test]
    fn missing_embedded_font_is_cached_as_none() {
        let doc = Document::with_version("1.5");
        let mut store = FontStore::new().unwrap();
        assert!(store.embedded_font(&doc, "ABCDEF+Calibri").is_none());
        assert!(store.embedded.contains_key("calibri"));
        assert!(store.embedded_font(&doc, "").is_none());
    }
}
