//! Pass-scoped engine configuration.
//!
//! An [`EngineConfig`] is built once (usually with [`EngineConfig::from_env`])
//! and handed to every replacement pass. Nothing here is global: two passes
//! with different configs never observe each other's font directories.

use std::path::PathBuf;

/// Environment variable naming the operator-configured font directory.
pub const FONTS_DIR_ENV: &str = "PDFREPLACE_FONTS_DIR";

/// Environment variable naming the application-bundled font directory.
pub const BUNDLED_FONTS_DIR_ENV: &str = "PDFREPLACE_BUNDLED_FONTS_DIR";

/// Maximum number of uploaded font files per request.
pub const MAX_UPLOADED_FONTS: usize = 20;

/// Maximum size of one uploaded font file.
pub const MAX_UPLOADED_FONT_BYTES: usize = 5 * 1024 * 1024;

/// Font directories consulted by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Operator-configured font directory.
    pub configured_fonts_dir: Option<PathBuf>,
    /// Fonts shipped with the application.
    pub bundled_fonts_dir: Option<PathBuf>,
    /// Roots the locale font tables are resolved against.
    pub system_font_roots: Vec<PathBuf>,
    /// Where Computer Modern / Latin Modern files may be installed.
    pub computer_modern_dirs: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            configured_fonts_dir: None,
            bundled_fonts_dir: None,
            system_font_roots: default_system_font_roots(),
            computer_modern_dirs: default_computer_modern_dirs(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

impl EngineConfig {
    /// Platform defaults plus the directories named by
    /// [`FONTS_DIR_ENV`] and [`BUNDLED_FONTS_DIR_ENV`].
    pub fn from_env() -> Self {
        Self {
            configured_fonts_dir: non_empty_env(FONTS_DIR_ENV),
            bundled_fonts_dir: non_empty_env(BUNDLED_FONTS_DIR_ENV),
            ..Self::default()
        }
    }

    /// A config that only looks at the given system roots, without any
    /// custom or TeX directories.
    pub fn isolated(system_font_roots: Vec<PathBuf>) -> Self {
        Self {
            configured_fonts_dir: None,
            bundled_fonts_dir: None,
            system_font_roots,
            computer_modern_dirs: Vec::new(),
        }
    }

    pub fn with_configured_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.configured_fonts_dir = Some(dir.into());
        self
    }

    pub fn with_bundled_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_fonts_dir = Some(dir.into());
        self
    }
}

/// Standard font directories of the host platform.
pub fn default_system_font_roots() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let windir = std::env::var_os("WINDIR").unwrap_or_else(|| "C:\\Windows".into());
        vec![PathBuf::from(windir).join("Fonts")]
    }
    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/System/Library/Fonts/Supplemental"),
            PathBuf::from("/Library/Fonts"),
            PathBuf::from("/System/Library/Fonts"),
        ]
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        vec![
            PathBuf::from("/usr/share/fonts/truetype"),
            PathBuf::from("/usr/share/fonts"),
            PathBuf::from("/usr/local/share/fonts"),
        ]
    }
}

/// TeX Live and distribution directories holding CMU / Latin Modern fonts.
pub fn default_computer_modern_dirs() -> Vec<PathBuf> {
    [
        "/usr/share/texmf/fonts/opentype/public/lm",
        "/usr/share/texmf/fonts/truetype/public/cm-unicode",
        "/usr/share/texlive/texmf-dist/fonts/opentype/public/lm",
        "/usr/share/texlive/texmf-dist/fonts/truetype/public/cm-unicode",
        "/usr/share/fonts/opentype/latin-modern",
        "/usr/share/fonts/truetype/cmu",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}
