//! pdfreplace: find and replace text in PDF documents while keeping the
//! look of the original typesetting.
//!
//! This is the public API facade crate for pdfreplace. It re-exports types from
//! pdfreplace-core and uses pdfreplace-parse for reading and editing documents.
//!
//! # Architecture
//!
//! - **pdfreplace-core**: Backend-independent data types and algorithms
//! - **pdfreplace-parse**: lopdf-backed extraction, redaction, font embedding
//!   and page-tree edits
//! - **pdfreplace** (this crate): match location, style and font resolution,
//!   fitting, and the replacement pass that ties them together
//!
//! # Example
//!
//! ```ignore
//! use pdfreplace::{EngineConfig, ReplaceRequest, replace_text};
//!
//! let request = ReplaceRequest::new("Jane Doe", "John Smith");
//! let summary = replace_text(&bytes, &request, &EngineConfig::from_env())?;
//! println!("{} replacements", summary.replacements);
//! std::fs::write("out.pdf", &summary.bytes)?;
//! ```

pub mod config;
pub mod fit;
pub mod fonts;
pub mod locate;
mod page;
pub mod page_ops;
mod pdf;
pub mod replace;
pub mod style;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use fonts::{FontChoice, FontSource, UploadedFont};
pub use locate::locate_matches;
pub use page::Page;
pub use page_ops::{merge_pdfs, parse_page_ranges, parse_reorder, remove_pages, reorder_pages};
pub use pdf::{PagesIter, Pdf};
pub use replace::{Diagnostics, ReplaceRequest, ReplaceSummary, Scope, replace_text};
pub use style::{TextStyle, extract_style};

pub use pdfreplace_core;
pub use pdfreplace_core::{BBox, Color, MatchRegion, PdfError, SearchMatch, SearchOptions};
pub use pdfreplace_parse;
