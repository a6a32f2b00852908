//! Content handler callback trait for content stream interpretation.
//!
//! The interpreter calls [`ContentHandler`] methods as it shows glyphs.
//! [`CharCollector`] is the stock implementation used for page extraction
//! and for locating glyphs to redact.

use pdfreplace_core::Char;

/// Where a glyph's code bytes live in the page content stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphLocation {
    /// Index of the text-showing operation.
    pub op_index: usize,
    /// Index of the string within a `TJ` array; 0 for `Tj`, `'` and `"`.
    pub element: usize,
    /// Byte range of the code inside that string.
    pub byte_start: usize,
    pub byte_end: usize,
}

/// One shown glyph.
#[derive(Debug, Clone)]
pub struct GlyphEvent {
    pub char: Char,
    /// `None` for glyphs shown inside Form XObjects.
    pub location: Option<GlyphLocation>,
    /// TJ adjustment that reproduces this glyph's advance, or `None` when
    /// the font size is zero.
    pub kern: Option<f64>,
}

/// Callback handler for content stream interpretation. Every method has a
/// no-op default.
pub trait ContentHandler {
    /// Called for each glyph shown by `Tj`, `TJ`, `'` or `"`.
    fn on_glyph(&mut self, _event: GlyphEvent) {}

    /// Called for recoverable problems (unknown fonts, runaway forms).
    fn on_warning(&mut self, _message: String) {}
}

/// A glyph's location and replacement kern, aligned with
/// [`CharCollector::chars`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub location: Option<GlyphLocation>,
    pub kern: Option<f64>,
}

/// Collects chars and their placements.
#[derive(Debug, Default)]
pub struct CharCollector {
    pub chars: Vec<Char>,
    pub placements: Vec<GlyphPlacement>,
    pub warnings: Vec<String>,
}

impl ContentHandler for CharCollector {
    fn on_glyph(&mut self, event: GlyphEvent) {
        self.chars.push(event.char);
        self.placements.push(GlyphPlacement {
            location: event.location,
            kern: event.kern,
        });
    }

    fn on_warning(&mut self, message: String) {
        #[cfg(feature = "tracing")]
        tracing::debug!(%message, "content interpretation warning");
        self.warnings.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfreplace_core::{BBox, Color, StyleFlags};

    struct NoopHandler;
    impl ContentHandler for NoopHandler {}

    fn sample_event() -> GlyphEvent {
        GlyphEvent {
            char: Char {
                text: "A".to_string(),
                bbox: BBox::new(72.0, 60.0, 80.0, 72.0),
                fontname: "Helvetica".to_string(),
                size: 12.0,
                color: Color::black(),
                flags: StyleFlags::default(),
                upright: true,
                char_code: 65,
            },
            location: Some(GlyphLocation {
                op_index: 3,
                element: 0,
                byte_start: 0,
                byte_end: 1,
            }),
            kern: Some(-667.0),
        }
    }

    #[test]
    fn noop_handler_accepts_events() {
        let mut handler = NoopHandler;
        handler.on_glyph(sample_event());
        handler.on_warning("ignored".to_string());
    }

    #[test]
    fn collector_keeps_chars_and_placements_aligned() {
        let mut collector = CharCollector::default();
        collector.on_glyph(sample_event());
        let mut inner = sample_event();
        inner.location = None;
        collector.on_glyph(inner);
        assert_eq!(collector.chars.len(), 2);
        assert_eq!(collector.placements.len(), 2);
        assert_eq!(collector.placements[0].location.map(|l| l.op_index), Some(3));
        assert!(collector.placements[1].location.is_none());
    }
}
