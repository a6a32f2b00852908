//! pdfreplace-parse: lopdf-backed document access for pdfreplace.
//!
//! This crate reads pages into positioned chars by interpreting their
//! content streams, removes glyphs under redaction regions, embeds fonts
//! and draws replacement text, and composes page trees. It depends on
//! pdfreplace-core for shared data types.

pub mod cmap;
pub mod embed;
pub mod embedded_fonts;
pub mod error;
pub mod font_metrics;
pub mod font_program;
pub mod handler;
pub mod interpreter;
pub mod interpreter_state;
pub mod lopdf_backend;
pub mod page_geometry;
pub mod page_tree;
pub mod redact;
pub mod standard_fonts;
pub mod text_state;
pub mod win_ansi;

pub use embed::{FontEmbedder, InsertFont, TextInsertion, TextPlacement};
pub use embedded_fonts::{
    EmbeddedFont, extract_font_program, find_embedded_font, find_in_fonts, list_embedded_fonts,
    write_font_program,
};
pub use error::BackendError;
pub use font_metrics::{FontFileKind, FontFileRef, PdfFont};
pub use font_program::FontProgram;
pub use handler::{CharCollector, ContentHandler, GlyphEvent};
pub use interpreter::{extract_page_chars, interpret_operations};
pub use lopdf_backend::LopdfDocument;
pub use page_geometry::PageGeometry;
pub use page_tree::{merge_documents, remove_pages, reorder_pages};
pub use redact::{RedactionReport, redact_regions};
pub use pdfreplace_core;
