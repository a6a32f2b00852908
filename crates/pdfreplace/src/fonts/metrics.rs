//! Glyph coverage and width measurement.
//!
//! Font programs are parsed at most once per path for the lifetime of a
//! [`GlyphMetrics`], which lives exactly as long as one replacement pass.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use pdfreplace_core::{BuiltinFace, PdfError};
use pdfreplace_parse::standard_fonts;
use pdfreplace_parse::win_ansi;
use pdfreplace_parse::FontProgram;

use super::resolver::FontChoice;

/// A font ready to be measured: a parsed program or a base-14 face.
#[derive(Debug, Clone)]
pub enum MetricsFont {
    Program(Rc<FontProgram>),
    Builtin(BuiltinFace),
}

impl MetricsFont {
    /// Advance width of `text` at `size` points.
    pub fn measure(&self, text: &str, size: f64) -> f64 {
        match self {
            MetricsFont::Program(program) => program.measure(text, size),
            MetricsFont::Builtin(face) => builtin_width(*face, text, size),
        }
    }

    /// Width of each char of `text`, for distributed layout.
    pub fn char_widths(&self, text: &str, size: f64) -> Vec<f64> {
        let mut buf = [0u8; 4];
        text.chars()
            .map(|c| self.measure(c.encode_utf8(&mut buf), size))
            .collect()
    }

    /// Descender as a negative fraction of the em.
    pub fn descender_em(&self) -> f64 {
        match self {
            MetricsFont::Program(program) => program.descender_em(),
            MetricsFont::Builtin(face) => standard_fonts::for_face(*face).descender_em(),
        }
    }

    pub fn supports(&self, text: &str) -> bool {
        match self {
            MetricsFont::Program(program) => program.supports(text),
            MetricsFont::Builtin(_) => builtin_supports(text),
        }
    }
}

/// Whether a base-14 face can show `text` without substituting `?`.
pub fn builtin_supports(text: &str) -> bool {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .all(|c| win_ansi::encode(c).is_some())
}

fn builtin_width(face: BuiltinFace, text: &str, size: f64) -> f64 {
    let data = standard_fonts::for_face(face);
    let fallback = data.width(b'?');
    let milli: f64 = text
        .chars()
        .map(|c| win_ansi::encode(c).map_or(fallback, |code| data.width(code)))
        .sum();
    milli / 1000.0 * size
}

/// Per-pass cache of parsed font programs.
#[derive(Debug, Default)]
pub struct GlyphMetrics {
    programs: HashMap<PathBuf, Option<Rc<FontProgram>>>,
}

impl GlyphMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed program at `path`. A file that failed once keeps failing
    /// without being re-read.
    pub fn program(&mut self, path: &Path) -> Result<Rc<FontProgram>, PdfError> {
        let entry = self
            .programs
            .entry(path.to_path_buf())
            .or_insert_with(|| FontProgram::load(path).ok().map(Rc::new));
        entry
            .clone()
            .ok_or_else(|| PdfError::FontError(format!("cannot load font {}", path.display())))
    }

    /// Whether the program at `path` has a glyph for every non-whitespace
    /// char of `text`. Unloadable files report `false`.
    pub fn supports(&mut self, path: &Path, text: &str) -> bool {
        self.program(path).is_ok_and(|p| p.supports(text))
    }

    /// Width of `text` in `choice`, approximated with Helvetica when the
    /// program cannot be loaded.
    pub fn measure(&mut self, choice: &FontChoice, text: &str, size: f64) -> f64 {
        match self.font(choice) {
            Ok(font) => font.measure(text, size),
            Err(_) => builtin_width(BuiltinFace::default_sans(), text, size),
        }
    }

    /// Descender of `choice`, if its metrics are available.
    pub fn descender(&mut self, choice: &FontChoice) -> Option<f64> {
        self.font(choice).ok().map(|f| f.descender_em())
    }

    pub fn font(&mut self, choice: &FontChoice) -> Result<MetricsFont, PdfError> {
        match choice {
            FontChoice::File { path, .. } => self.program(path).map(MetricsFont::Program),
            FontChoice::Builtin(face) => Ok(MetricsFont::Builtin(*face)),
        }
    }

    pub fn cached_programs(&self) -> usize {
        self.programs.len()
    }
}
