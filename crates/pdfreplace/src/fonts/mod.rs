//! Font resolution for replacement text.
//!
//! - [`locale`]: platform font tables and the Computer Modern locator
//! - [`dirs`]: scored lookup in uploaded, configured and bundled directories
//! - [`store`]: the pass-scoped temporary directory for font files
//! - [`metrics`]: glyph coverage and width measurement with caching
//! - [`resolver`]: the ordered chain of candidate fonts for one match

pub mod dirs;
pub mod locale;
pub mod metrics;
pub mod resolver;
pub mod store;

use std::fmt;

pub use dirs::{FontDir, FontDirs};
pub use metrics::{GlyphMetrics, MetricsFont};
pub use resolver::{FontChoice, FontRequest, FontResolver};
pub use store::{FontStore, UploadedFont, sanitize_font_filename};

/// Where a resolved font came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FontSource {
    /// The caller's explicit family choice.
    Forced,
    /// The program embedded in the source document.
    Embedded,
    /// A file uploaded with the request.
    CustomUploaded,
    /// The operator-configured font directory.
    CustomConfigured,
    /// Fonts shipped with the application.
    CustomBundled,
    /// The platform's installed fonts.
    LocaleSystem,
    /// A base-14 face, always available.
    Builtin,
}

impl FontSource {
    pub fn as_str(self) -> &'static str {
        match self {
            FontSource::Forced => "forced",
            FontSource::Embedded => "embedded",
            FontSource::CustomUploaded => "custom-uploaded",
            FontSource::CustomConfigured => "custom-configured",
            FontSource::CustomBundled => "custom-bundled",
            FontSource::LocaleSystem => "locale-system",
            FontSource::Builtin => "builtin",
        }
    }
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
