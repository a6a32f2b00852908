//! Text Fitting & Re-insertion: size, baseline and spacing of the
//! replacement inside its redacted region, and drawing it.

use pdfreplace_core::{
    BBox, Color, PdfError, TrackingCheck, baseline_y, distribute_offsets, fit_font_size,
    should_distribute, usable_width,
};
use pdfreplace_parse::{FontEmbedder, InsertFont, PageGeometry, TextInsertion, TextPlacement};

use crate::Pdf;
use crate::fonts::{FontChoice, GlyphMetrics, MetricsFont};

/// What to draw and where, before a font is chosen.
#[derive(Debug, Clone)]
pub struct FitJob<'a> {
    /// Region in top-left page coordinates.
    pub rect: BBox,
    pub original_text: &'a str,
    /// Replacement with casing already matched.
    pub text: &'a str,
    pub size: f64,
    pub color: Color,
}

/// Final size and glyph positions for one font.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub size: f64,
    /// Baseline origins in PDF user space.
    pub placements: Vec<TextPlacement>,
    /// Whether glyphs were spread out individually.
    pub distributed: bool,
}

/// Lay `job` out in `font`.
///
/// Text that mimics a letter-spaced original is placed glyph by glyph at
/// the target size; everything else is one string shrunk until it fits.
pub fn layout_text(font: &MetricsFont, job: &FitJob<'_>, geometry: &PageGeometry) -> Layout {
    let rect = &job.rect;
    let check = TrackingCheck {
        rect,
        original_text: job.original_text,
        replacement_text: job.text,
        measured_replacement: font.measure(job.text, job.size),
        measured_original: font.measure(job.original_text, job.size),
        font_size: job.size,
    };

    if should_distribute(&check) {
        let size = job.size;
        let widths = font.char_widths(job.text, size);
        let offsets = distribute_offsets(&widths, rect, size);
        let top = baseline_y(rect, size, Some(font.descender_em()));
        let placements = job
            .text
            .chars()
            .zip(offsets)
            .filter(|(c, _)| !c.is_whitespace())
            .map(|(c, dx)| {
                let (x, y) = geometry.to_pdf(rect.x0 + dx, top);
                TextPlacement {
                    text: c.to_string(),
                    x,
                    y,
                }
            })
            .collect();
        return Layout {
            size,
            placements,
            distributed: true,
        };
    }

    let size = fit_font_size(job.size, usable_width(rect), |s| font.measure(job.text, s));
    let top = baseline_y(rect, size, Some(font.descender_em()));
    let (x, y) = geometry.to_pdf(rect.x0, top);
    Layout {
        size,
        placements: vec![TextPlacement {
            text: job.text.to_string(),
            x,
            y,
        }],
        distributed: false,
    }
}

/// Draw `job` on page `index` with `choice`. Any failure, from loading the
/// program to embedding it, is returned so the caller can try the next
/// font.
pub fn insert_with(
    pdf: &mut Pdf,
    embedder: &mut FontEmbedder,
    metrics: &mut GlyphMetrics,
    index: usize,
    geometry: &PageGeometry,
    job: &FitJob<'_>,
    choice: &FontChoice,
) -> Result<Layout, PdfError> {
    let font = metrics.font(choice)?;
    let layout = layout_text(&font, job, geometry);

    let key = match choice {
        FontChoice::File { path, .. } => path.to_string_lossy().into_owned(),
        FontChoice::Builtin(face) => face.pdf_name().to_string(),
    };
    let insert_font = match &font {
        MetricsFont::Program(program) => InsertFont::Program {
            key: &key,
            program: program.as_ref(),
        },
        MetricsFont::Builtin(face) => InsertFont::Builtin(*face),
    };
    let insertion = TextInsertion {
        font: insert_font,
        size: layout.size,
        color: job.color,
        placements: layout.placements.clone(),
    };
    pdf.insert_text(embedder, index, &insertion)?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfreplace_core::{BuiltinFace, MIN_FONT_SIZE};

    fn geometry() -> PageGeometry {
        PageGeometry::new(BBox::new(0.0, 0.0, 612.0, 792.0))
    }

    fn job<'a>(rect: BBox, original: &'a str, text: &'a str, size: f64) -> FitJob<'a> {
        FitJob {
            rect,
            original_text: original,
            text,
            size,
            color: Color::black(),
        }
    }

    #[test]
    fn short_text_keeps_its_size() {
        let font = MetricsFont::Builtin(BuiltinFace::Helvetica);
        let rect = BBox::new(72.0, 100.0, 200.0, 114.0);
        let layout = layout_text(&font, &job(rect, "Hello", "World", 11.0), &geometry());
        assert!(!layout.distributed);
        assert_eq!(layout.size, 11.0);
        assert_eq!(layout.placements.len(), 1);
        let p = &layout.placements[0];
        assert_eq!(p.text, "World");
        assert!((p.x - 72.0).abs() < 1e-9);
        // Baseline: bottom + descender·size = 114 - 0.207·11, flipped.
        assert!((p.y - (792.0 - (114.0 - 0.207 * 11.0))).abs() < 1e-9);
    }

    #[test]
    fn long_text_shrinks_to_fit() {
        let font = MetricsFont::Builtin(BuiltinFace::Helvetica);
        let rect = BBox::new(72.0, 100.0, 122.0, 114.0);
        let text = "a considerably longer replacement";
        let layout = layout_text(&font, &job(rect, "short", text, 12.0), &geometry());
        assert!(layout.size < 12.0);
        assert!(layout.size >= MIN_FONT_SIZE);
        let fits = font.measure(text, layout.size) <= usable_width(&rect);
        assert!(fits || layout.size == MIN_FONT_SIZE);
    }

    #[test]
    fn letter_spaced_heading_is_distributed() {
        let font = MetricsFont::Builtin(BuiltinFace::Helvetica);
        // The original "JANE" at 20pt is ~55pt wide; the rect is 200pt.
        let rect = BBox::new(100.0, 50.0, 300.0, 74.0);
        let layout = layout_text(&font, &job(rect, "JANE", "JOHN", 20.0), &geometry());
        assert!(layout.distributed);
        assert_eq!(layout.size, 20.0);
        assert_eq!(layout.placements.len(), 4);
        assert!((layout.placements[0].x - 100.0).abs() < 1e-9);
        let xs: Vec<f64> = layout.placements.iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[1] > w[0]));
        assert!(layout.placements.iter().all(|p| p.y == layout.placements[0].y));
    }

    #[test]
    fn insert_with_builtin_writes_text() {
        let bytes = crate::test_support::text_pdf(&["Hello"]);
        let mut pdf = Pdf::open(&bytes).unwrap();
        let mut embedder = FontEmbedder::new();
        let mut metrics = GlyphMetrics::new();
        let geometry = pdf.geometry(0).unwrap();
        let rect = BBox::new(300.0, 300.0, 400.0, 314.0);

        let layout = insert_with(
            &mut pdf,
            &mut embedder,
            &mut metrics,
            0,
            &geometry,
            &job(rect, "x", "Inserted", 12.0),
            &FontChoice::Builtin(BuiltinFace::TimesRoman),
        )
        .unwrap();
        assert_eq!(layout.placements.len(), 1);

        let reopened = Pdf::open(&pdf.to_bytes().unwrap()).unwrap();
        let text = reopened.page(0).unwrap().extract_text();
        assert!(text.contains("Inserted"));
        assert!(text.contains("Hello"));
    }

    #[test]
    fn insert_with_missing_file_fails() {
        let bytes = crate::test_support::text_pdf(&["Hello"]);
        let mut pdf = Pdf::open(&bytes).unwrap();
        let geometry = pdf.geometry(0).unwrap();
        let choice = FontChoice::File {
            path: "/nonexistent/font.ttf".into(),
            source: crate::fonts::FontSource::LocaleSystem,
        };
        let result = insert_with(
            &mut pdf,
            &mut FontEmbedder::new(),
            &mut GlyphMetrics::new(),
            0,
            &geometry,
            &job(BBox::new(0.0, 0.0, 50.0, 12.0), "a", "b", 10.0),
            &choice,
        );
        assert!(result.is_err());
    }
}
