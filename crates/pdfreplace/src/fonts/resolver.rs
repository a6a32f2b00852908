//! The font resolution chain.
//!
//! For one match the resolver produces every usable font in priority
//! order. The fitter tries them in turn and stops at the first insertion
//! that succeeds, so a candidate only has to be plausible here, not
//! proven.
//!
//! Order: forced choice, embedded program, installed copy of the family,
//! custom directories, a generic installed face of the same bucket, the
//! embedded program again as a last resort, then the base-14 faces.

use std::path::{Path, PathBuf};

use lopdf::Document;
use pdfreplace_core::{
    BuiltinFace, BuiltinFamily, FamilyBucket, PdfError, classify_family, introduces_new_chars,
    is_computer_modern, is_subset_name, map_to_builtin, normalize_font_name,
};
use tracing::debug;

use super::dirs::FontDirs;
use super::locale::{bucket_font, computer_modern_font, locale_font, named_family_font};
use super::metrics::{GlyphMetrics, builtin_supports};
use super::store::{FontStore, UploadedFont, validate_uploads};
use super::FontSource;
use crate::config::EngineConfig;

/// One font the replacement can be drawn with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontChoice {
    File { path: PathBuf, source: FontSource },
    Builtin(BuiltinFace),
}

impl FontChoice {
    pub fn source(&self) -> FontSource {
        match self {
            FontChoice::File { source, .. } => *source,
            FontChoice::Builtin(_) => FontSource::Builtin,
        }
    }

    /// File name of the program, or the base-14 name.
    pub fn label(&self) -> String {
        match self {
            FontChoice::File { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            FontChoice::Builtin(face) => face.pdf_name().to_string(),
        }
    }

    fn same_font(&self, other: &FontChoice) -> bool {
        match (self, other) {
            (FontChoice::File { path: a, .. }, FontChoice::File { path: b, .. }) => a == b,
            (FontChoice::Builtin(a), FontChoice::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

/// What is known about the text being replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontRequest<'a> {
    /// Font name as found on the page, possibly empty.
    pub font_name: &'a str,
    pub bold: bool,
    pub italic: bool,
    pub original_text: &'a str,
    /// Replacement after case matching.
    pub replacement_text: &'a str,
    /// Caller-forced family (`serif`, `mono`, `Garamond`, ...).
    pub forced: Option<&'a str>,
}

/// A forced family alias that names a whole bucket.
fn forced_alias(choice: &str) -> Option<(FamilyBucket, BuiltinFamily)> {
    match choice {
        "serif" | "times" => Some((FamilyBucket::Serif, BuiltinFamily::Times)),
        "sans" | "helvetica" | "arial" => Some((FamilyBucket::Sans, BuiltinFamily::Helvetica)),
        "mono" | "courier" => Some((FamilyBucket::Mono, BuiltinFamily::Courier)),
        "cm" | "computer modern" | "computer-modern" => {
            Some((FamilyBucket::ComputerModern, BuiltinFamily::Times))
        }
        _ => None,
    }
}

/// Lower-cased forced choice, with `auto` and blanks meaning none.
fn forced_key(forced: Option<&str>) -> Option<String> {
    let key = forced?.trim().to_lowercase();
    (!key.is_empty() && key != "auto").then_some(key)
}

/// Ordered candidates, deduplicated by font.
struct Chain<'m> {
    metrics: &'m mut GlyphMetrics,
    text: &'m str,
    choices: Vec<FontChoice>,
}

impl Chain<'_> {
    fn push(&mut self, choice: FontChoice) {
        if !self.choices.iter().any(|c| c.same_font(&choice)) {
            self.choices.push(choice);
        }
    }

    /// Add a file only if it can render the replacement.
    fn push_covering(&mut self, path: PathBuf, source: FontSource) {
        if self.metrics.supports(&path, self.text) {
            debug!(source = %source, font = %path.display(), "font candidate");
            self.push(FontChoice::File { path, source });
        } else {
            debug!(source = %source, font = %path.display(), "font lacks glyphs, skipped");
        }
    }
}

/// Pass-scoped font resolution state: the temporary store, the scanned
/// custom directories and the metrics cache.
#[derive(Debug)]
pub struct FontResolver<'a> {
    config: &'a EngineConfig,
    dirs: FontDirs,
    store: FontStore,
    metrics: GlyphMetrics,
}

impl<'a> FontResolver<'a> {
    /// Validate and store `uploads`, then scan the custom directories.
    pub fn new(config: &'a EngineConfig, uploads: &[UploadedFont]) -> Result<Self, PdfError> {
        validate_uploads(uploads)?;
        let mut store = FontStore::new()?;
        store.add_uploads(uploads)?;
        let dirs = FontDirs::new(store.uploaded_dir(), config);
        Ok(Self {
            config,
            dirs,
            store,
            metrics: GlyphMetrics::new(),
        })
    }

    /// Index `doc`'s own embedded fonts so fonts this pass inserts are
    /// never mistaken for them.
    pub fn snapshot_embedded(&mut self, doc: &Document) {
        self.store.snapshot_embedded(doc);
    }

    pub fn metrics(&mut self) -> &mut GlyphMetrics {
        &mut self.metrics
    }

    pub fn dirs(&self) -> &FontDirs {
        &self.dirs
    }

    /// Every candidate for `request`, best first. Never empty: the last
    /// entry is always a base-14 face.
    pub fn candidates(&mut self, doc: &Document, request: &FontRequest<'_>) -> Vec<FontChoice> {
        let normalized = normalize_font_name(request.font_name);
        let (bold, italic) = (request.bold, request.italic);
        let forced = forced_key(request.forced);

        let embedded = if request.font_name.trim().is_empty() {
            None
        } else {
            self.store.embedded_font(doc, request.font_name)
        };

        let mut chain = Chain {
            metrics: &mut self.metrics,
            text: request.replacement_text,
            choices: Vec::new(),
        };

        if let Some(choice) = forced.as_deref() {
            match forced_font(choice, bold, italic, self.config, &self.dirs) {
                Some(path) => {
                    debug!(choice, font = %path.display(), "forced font");
                    chain.push(FontChoice::File {
                        path,
                        source: FontSource::Forced,
                    });
                }
                None => debug!(choice, "forced font not installed"),
            }
        }

        let subset_gap = is_subset_name(request.font_name)
            && introduces_new_chars(request.original_text, request.replacement_text);
        if let Some(path) = embedded.clone() {
            if subset_gap {
                debug!(font = request.font_name, "subset font lacks new chars, embedded skipped");
            } else {
                chain.push_covering(path, FontSource::Embedded);
            }
        }

        let mut generic = None;
        if is_computer_modern(request.font_name) {
            let bucket = classify_family(&normalized);
            if let Some((path, source)) =
                computer_modern_file(bucket, bold, italic, self.config, &self.dirs)
            {
                chain.push_covering(path, source);
            }
        }
        if let Some(found) = locale_font(&normalized, bold, italic, &self.config.system_font_roots) {
            if found.exact_family {
                chain.push_covering(found.path, FontSource::LocaleSystem);
            } else {
                generic = Some(found.path);
            }
        }

        if let Some((path, source)) = self.dirs.find(&normalized, bold, italic) {
            chain.push_covering(path, source);
        }

        if let Some(path) = generic {
            chain.push_covering(path, FontSource::LocaleSystem);
        }

        if !builtin_supports(request.replacement_text) {
            if let Some(path) = embedded {
                chain.push(FontChoice::File {
                    path,
                    source: FontSource::Embedded,
                });
            }
        }

        if let Some((_, family)) = forced.as_deref().and_then(forced_alias) {
            chain.push(FontChoice::Builtin(BuiltinFace::from_parts(family, bold, italic)));
        }
        for face in builtin_faces(request.font_name, &normalized, bold, italic) {
            chain.push(FontChoice::Builtin(face));
        }
        chain.choices
    }
}

/// The base-14 fallbacks: the page's own font when it is a base-14 name,
/// its nearest family, then Helvetica.
fn builtin_faces(raw: &str, normalized: &str, bold: bool, italic: bool) -> Vec<BuiltinFace> {
    let mut faces = Vec::with_capacity(3);
    if let Some(face) = BuiltinFace::from_pdf_name(raw) {
        faces.push(face);
    }
    if let Some(face) = map_to_builtin(normalized, bold, italic) {
        faces.push(face);
    }
    faces.push(BuiltinFace::default_sans());
    faces
}

/// Resolve a forced family to a file. Bucket aliases use the platform
/// tables; any other name is looked up in the custom directories, then as
/// a named installed family.
fn forced_font(
    choice: &str,
    bold: bool,
    italic: bool,
    config: &EngineConfig,
    dirs: &FontDirs,
) -> Option<PathBuf> {
    let roots = &config.system_font_roots;
    match forced_alias(choice) {
        Some((FamilyBucket::ComputerModern, _)) => {
            computer_modern_file(FamilyBucket::ComputerModern, bold, italic, config, dirs)
                .map(|(path, _)| path)
        }
        Some((bucket, _)) => named_family_font(choice, bold, italic, roots)
            .or_else(|| bucket_font(bucket, bold, italic, roots)),
        None => {
            let normalized = normalize_font_name(choice);
            dirs.find(&normalized, bold, italic)
                .map(|(path, _)| path)
                .or_else(|| named_family_font(&normalized, bold, italic, roots))
        }
    }
}

/// Locate Computer Modern in the custom directories, the TeX trees and the
/// system font roots, in that order.
fn computer_modern_file(
    bucket: FamilyBucket,
    bold: bool,
    italic: bool,
    config: &EngineConfig,
    dirs: &FontDirs,
) -> Option<(PathBuf, FontSource)> {
    let custom: Vec<&Path> = dirs.paths().collect();
    if let Some(path) = computer_modern_font(bucket, bold, italic, &custom) {
        let source = dirs.source_of(&path).unwrap_or(FontSource::LocaleSystem);
        return Some((path, source));
    }
    computer_modern_font(bucket, bold, italic, &config.computer_modern_dirs)
        .or_else(|| computer_modern_font(bucket, bold, italic, &config.system_font_roots))
        .map(|path| (path, FontSource::LocaleSystem))
}
