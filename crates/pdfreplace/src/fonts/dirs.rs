//! Custom font directories: uploaded with the request, configured by the
//! operator, or bundled with the application, searched in that order.

use std::path::{Path, PathBuf};

use pdfreplace_core::{best_font_filename, family_key, has_font_extension, score_font_filename};

use super::FontSource;
use crate::config::EngineConfig;

/// One directory and the label its fonts are reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDir {
    pub path: PathBuf,
    pub source: FontSource,
    /// `.ttf`/`.otf` file names, sorted.
    files: Vec<String>,
}

impl FontDir {
    /// List the font files of `path`. A missing or unreadable directory
    /// yields an empty listing.
    pub fn scan(path: impl Into<PathBuf>, source: FontSource) -> Self {
        let path = path.into();
        let mut files: Vec<String> = match std::fs::read_dir(&path) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|name| has_font_extension(name))
                .collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        Self {
            path,
            source,
            files,
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }
}

/// The ordered custom directories of one pass.
#[derive(Debug, Clone, Default)]
pub struct FontDirs {
    dirs: Vec<FontDir>,
}

impl FontDirs {
    /// Uploaded, configured and bundled directories, skipping duplicates.
    pub fn new(uploaded: Option<&Path>, config: &EngineConfig) -> Self {
        let candidates = [
            (uploaded.map(Path::to_path_buf), FontSource::CustomUploaded),
            (config.configured_fonts_dir.clone(), FontSource::CustomConfigured),
            (config.bundled_fonts_dir.clone(), FontSource::CustomBundled),
        ];
        let mut dirs: Vec<FontDir> = Vec::new();
        for (path, source) in candidates {
            let Some(path) = path else { continue };
            if dirs.iter().any(|d| d.path == path) {
                continue;
            }
            dirs.push(FontDir::scan(path, source));
        }
        Self { dirs }
    }

    pub fn dirs(&self) -> &[FontDir] {
        &self.dirs
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(|d| d.path.as_path())
    }

    /// Label for a file found in one of the directories.
    pub fn source_of(&self, file: &Path) -> Option<FontSource> {
        self.dirs
            .iter()
            .find(|d| file.starts_with(&d.path))
            .map(|d| d.source)
    }

    /// Best-scoring file for a family across all directories. Earlier
    /// directories win ties.
    pub fn find(&self, normalized: &str, bold: bool, italic: bool) -> Option<(PathBuf, FontSource)> {
        let key = family_key(normalized)?;
        let mut best: Option<(&FontDir, &str, i32)> = None;
        for dir in &self.dirs {
            let Some(name) = best_font_filename(dir.files.iter().map(String::as_str), &key, bold, italic)
            else {
                continue;
            };
            let score = score_font_filename(name, &key, bold, italic);
            if score > best.map_or(0, |(_, _, s)| s) {
                best = Some((dir, name, score));
            }
        }
        best.map(|(dir, name, _)| (dir.path.join(name), dir.source))
    }
}
