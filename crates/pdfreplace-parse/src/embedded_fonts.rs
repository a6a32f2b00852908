//! Locating and extracting the font programs a document embeds.

use std::path::{Path, PathBuf};

use lopdf::{Document, Object};
use pdfreplace_core::normalize_font_name;

use crate::error::BackendError;
use crate::font_metrics::{FontFileRef, PdfFont};
use crate::lopdf_backend::stream_bytes;

/// A font dictionary that carries an embedded program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFont {
    /// `/BaseFont` as written, subset tag included.
    pub base_font: String,
    pub normalized_name: String,
    pub file: FontFileRef,
}

impl EmbeddedFont {
    /// `font_{object_number}.{ext}`
    pub fn file_name(&self) -> String {
        format!("font_{}.{}", self.file.id.0, self.file.kind.extension())
    }
}

/// Every top-level font dictionary (not CIDFont descendants) with an
/// embedded program, in object order.
pub fn list_embedded_fonts(doc: &Document) -> Vec<EmbeddedFont> {
    let mut fonts: Vec<EmbeddedFont> = Vec::new();
    for object in doc.objects.values() {
        let Ok(dict) = object.as_dict() else {
            continue;
        };
        let is_font = dict
            .get(b"Type")
            .and_then(Object::as_name)
            .is_ok_and(|t| t == b"Font");
        let is_descendant = dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|s| s.starts_with(b"CIDFontType"));
        if !is_font || is_descendant {
            continue;
        }
        let font = PdfFont::load(doc, dict);
        if let Some(file) = font.font_file {
            if fonts.iter().any(|f| f.file == file) {
                continue;
            }
            fonts.push(EmbeddedFont {
                normalized_name: normalize_font_name(&font.base_font),
                base_font: font.base_font,
                file,
            });
        }
    }
    fonts
}

/// Find the embedded font for a normalized name: an exact match first,
/// otherwise the first font whose name contains it or is contained in it.
pub fn find_embedded_font(doc: &Document, normalized_name: &str) -> Option<EmbeddedFont> {
    find_in_fonts(&list_embedded_fonts(doc), normalized_name).cloned()
}

/// [`find_embedded_font`] over an earlier [`list_embedded_fonts`] snapshot,
/// so fonts added to the document since then are never matched.
pub fn find_in_fonts<'f>(fonts: &'f [EmbeddedFont], normalized_name: &str) -> Option<&'f EmbeddedFont> {
    if normalized_name.is_empty() {
        return None;
    }
    fonts
        .iter()
        .find(|f| f.normalized_name == normalized_name)
        .or_else(|| {
            fonts.iter().find(|f| {
                !f.normalized_name.is_empty()
                    && (f.normalized_name.contains(normalized_name)
                        || normalized_name.contains(f.normalized_name.as_str()))
            })
        })
}

/// Decoded bytes of an embedded font program.
pub fn extract_font_program(doc: &Document, file: &FontFileRef) -> Result<Vec<u8>, BackendError> {
    let data = stream_bytes(doc, &Object::Reference(file.id))
        .map_err(|e| BackendError::Font(format!("failed to read embedded font: {e}")))?;
    if data.is_empty() {
        return Err(BackendError::Font("embedded font program is empty".to_string()));
    }
    Ok(data)
}

/// Write the program of `font` into `dir` and return its path.
pub fn write_font_program(
    doc: &Document,
    font: &EmbeddedFont,
    dir: &Path,
) -> Result<PathBuf, BackendError> {
    let data = extract_font_program(doc, &font.file)?;
    let path = dir.join(font.file_name());
    std::fs::write(&path, data)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font_metrics::FontFileKind;
    use lopdf::{Stream, dictionary};

    fn doc_with_embedded(names: &[&str]) -> Document {
        let mut doc = Document::with_version("1.5");
        for name in names {
            let file_id = doc.add_object(Stream::new(dictionary! {}, b"FONTDATA".to_vec()));
            let descriptor = doc.add_object(dictionary! {
                "Type" => "FontDescriptor",
                "FontName" => *name,
                "FontFile2" => file_id,
            });
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "TrueType",
                "BaseFont" => *name,
                "FontDescriptor" => descriptor,
            });
        }
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        doc
    }

    #[test]
    fn lists_only_fonts_with_programs() {
        let doc = doc_with_embedded(&["ABCDEF+Garamond-Bold", "Calibri"]);
        let fonts = list_embedded_fonts(&doc);
        assert_eq!(fonts.len(), 2);
        assert_eq!(fonts[0].base_font, "ABCDEF+Garamond-Bold");
        assert_eq!(fonts[0].file.kind, FontFileKind::TrueType);
        assert!(fonts[0].file_name().ends_with(".ttf"));
    }

    #[test]
    fn exact_match_beats_substring() {
        let doc = doc_with_embedded(&["Arial-BoldMT", "ArialMT"]);
        let exact = normalize_font_name("ArialMT");
        let found = find_embedded_font(&doc, &exact).unwrap();
        assert_eq!(found.base_font, "ArialMT");
    }

    #[test]
    fn substring_match_as_fallback() {
        let doc = doc_with_embedded(&["XYZABC+Calibri"]);
        let found = find_embedded_font(&doc, "calibri-light").unwrap();
        assert_eq!(found.base_font, "XYZABC+Calibri");
        assert!(find_embedded_font(&doc, "cali").is_some());
        assert!(find_embedded_font(&doc, "").is_none());
    }

    #[test]
    fn snapshot_ignores_later_fonts() {
        let mut doc = doc_with_embedded(&["XYZABC+Calibri"]);
        let snapshot = list_embedded_fonts(&doc);

        let file_id = doc.add_object(Stream::new(dictionary! {}, b"NEWDATA".to_vec()));
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => "DejaVuSans",
            "FontFile2" => file_id,
        });
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "DejaVuSans",
            "FontDescriptor" => descriptor,
        });

        assert!(find_embedded_font(&doc, "dejavusans").is_some());
        assert!(find_in_fonts(&snapshot, "dejavusans").is_none());
        assert!(find_in_fonts(&snapshot, "calibri").is_some());
    }

    #[test]
    fn writes_program_to_directory() {
        let doc = doc_with_embedded(&["Calibri"]);
        let font = list_embedded_fonts(&doc).remove(0);
        let dir = tempfile::tempdir().unwrap();
        let path = write_font_program(&doc, &font, dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"FONTDATA");
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("font_"));
    }
}
