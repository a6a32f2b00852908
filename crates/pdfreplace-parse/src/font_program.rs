//! TrueType/OpenType font programs loaded with `ttf-parser`.
//!
//! A [`FontProgram`] owns the file bytes and answers the two questions the
//! replacement engine asks of a font: can it render this text, and how wide
//! is it. It also carries the metrics needed to embed it.

use std::path::Path;

use ttf_parser::{Face, GlyphId, name_id};

use crate::error::BackendError;

/// Advance used for characters the font cannot map, in 1/1000 em.
const MISSING_ADVANCE: f64 = 500.0;

/// An owned, validated TrueType or OpenType font.
#[derive(Clone)]
pub struct FontProgram {
    data: Vec<u8>,
    units_per_em: f64,
    ascender: i16,
    descender: i16,
    cap_height: Option<i16>,
    bbox: [i16; 4],
    postscript_name: Option<String>,
    bold: bool,
    italic: bool,
    monospaced: bool,
}

impl std::fmt::Debug for FontProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontProgram")
            .field("postscript_name", &self.postscript_name)
            .field("bytes", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl FontProgram {
    /// Parse font bytes (the first face of a collection).
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, BackendError> {
        let face = Face::parse(&data, 0)
            .map_err(|e| BackendError::Font(format!("failed to parse font: {e}")))?;
        let units_per_em = f64::from(face.units_per_em().max(1));
        let rect = face.global_bounding_box();
        let postscript_name = face
            .names()
            .into_iter()
            .find(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .and_then(|name| name.to_string());
        let program = Self {
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            cap_height: face.capital_height(),
            bbox: [rect.x_min, rect.y_min, rect.x_max, rect.y_max],
            postscript_name,
            bold: face.is_bold(),
            italic: face.is_italic(),
            monospaced: face.is_monospaced(),
            data: Vec::new(),
        };
        Ok(Self { data, ..program })
    }

    /// Read and parse a font file.
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let data = std::fs::read(path).map_err(|e| {
            BackendError::Font(format!("failed to read font {}: {e}", path.display()))
        })?;
        Self::from_bytes(data)
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the outlines are CFF (an `OTTO` OpenType font).
    pub fn is_cff(&self) -> bool {
        self.data.starts_with(b"OTTO")
    }

    pub fn postscript_name(&self) -> Option<&str> {
        self.postscript_name.as_deref()
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn is_monospaced(&self) -> bool {
        self.monospaced
    }

    /// Font units to 1/1000 em.
    fn to_milli(&self, units: f64) -> f64 {
        units * 1000.0 / self.units_per_em
    }

    pub fn ascender_milli(&self) -> f64 {
        self.to_milli(f64::from(self.ascender))
    }

    pub fn descender_milli(&self) -> f64 {
        self.to_milli(f64::from(self.descender))
    }

    pub fn cap_height_milli(&self) -> f64 {
        self.to_milli(f64::from(self.cap_height.unwrap_or(self.ascender)))
    }

    /// `[llx lly urx ury]` in 1/1000 em.
    pub fn bbox_milli(&self) -> [f64; 4] {
        self.bbox.map(|v| self.to_milli(f64::from(v)))
    }

    /// Descender as a (negative) fraction of the em.
    pub fn descender_em(&self) -> f64 {
        self.descender_milli() / 1000.0
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face()?.glyph_index(ch).map(|g| g.0)
    }

    /// Advance of glyph `gid` in 1/1000 em.
    pub fn advance_milli(&self, gid: u16) -> f64 {
        self.face()
            .and_then(|face| face.glyph_hor_advance(GlyphId(gid)))
            .map_or(MISSING_ADVANCE, |adv| self.to_milli(f64::from(adv)))
    }

    /// Whether every non-whitespace character has a glyph.
    pub fn supports(&self, text: &str) -> bool {
        let Some(face) = self.face() else {
            return false;
        };
        text.chars()
            .filter(|c| !c.is_whitespace())
            .all(|c| face.glyph_index(c).is_some_and(|g| g.0 != 0))
    }

    /// Width of `text` at `size` points.
    pub fn measure(&self, text: &str, size: f64) -> f64 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let milli: f64 = text
            .chars()
            .map(|c| {
                face.glyph_index(c)
                    .and_then(|g| face.glyph_hor_advance(g))
                    .map_or(MISSING_ADVANCE, |adv| self.to_milli(f64::from(adv)))
            })
            .sum();
        milli / 1000.0 * size
    }
}

/// Locate a TrueType font on the host for font-dependent tests.
#[cfg(test)]
pub(crate) fn find_system_ttf() -> Option<std::path::PathBuf> {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation2/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    CANDIDATES
        .iter()
        .map(std::path::PathBuf::from)
        .find(|p| p.is_file())
}
