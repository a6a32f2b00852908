//! Replacement Orchestrator: one find-and-replace pass over a document.

use std::ops::Range;

use pdfreplace_core::{
    BBox, Color, MatchRegion, PdfError, compose_text, estimate_font_size, infer_bold_italic,
    match_replacement_case,
};
use pdfreplace_parse::{FontEmbedder, PageGeometry};
use tracing::{debug, info, warn};

use crate::fit::{FitJob, Layout, insert_with};
use crate::fonts::{FontChoice, FontRequest, FontResolver, FontSource, UploadedFont};
use crate::locate::locate_matches;
use crate::style::{TextStyle, extract_style};
use crate::{EngineConfig, Pdf};

/// Which pages a pass visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    /// Inclusive 1-based page range. Bounds are checked against the
    /// document once it is open.
    Range {
        from_page: Option<i64>,
        to_page: Option<i64>,
    },
}

impl Scope {
    /// Parse the `all` / `range` keyword together with its bounds.
    pub fn parse(
        scope: &str,
        from_page: Option<i64>,
        to_page: Option<i64>,
    ) -> Result<Self, PdfError> {
        match scope.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Scope::All),
            "range" => Ok(Scope::Range { from_page, to_page }),
            _ => Err(PdfError::invalid("scope must be 'all' or 'range'")),
        }
    }

    /// 0-based page indices covered in a document of `page_count` pages.
    pub fn page_range(&self, page_count: usize) -> Result<Range<usize>, PdfError> {
        let (from, to) = match *self {
            Scope::All => return Ok(0..page_count),
            Scope::Range {
                from_page: Some(from),
                to_page: Some(to),
            } => (from, to),
            Scope::Range { .. } => {
                return Err(PdfError::invalid(
                    "fromPage and toPage are required when scope='range'",
                ));
            }
        };
        let count = page_count as i64;
        if from < 1 || from > count {
            return Err(PdfError::invalid(format!(
                "fromPage must be between 1 and {count}"
            )));
        }
        if to < 1 || to > count {
            return Err(PdfError::invalid(format!(
                "toPage must be between 1 and {count}"
            )));
        }
        if to < from {
            return Err(PdfError::invalid("toPage must be >= fromPage"));
        }
        Ok((from - 1) as usize..to as usize)
    }
}

/// Parameters of one replacement pass.
#[derive(Debug, Clone, Default)]
pub struct ReplaceRequest {
    pub find_text: String,
    /// May be empty, which erases every match.
    pub replace_text: String,
    pub scope: Scope,
    /// Family to prefer over the detected one (`serif`, `Garamond`, ...).
    pub font_choice: Option<String>,
    pub uploaded_fonts: Vec<UploadedFont>,
}

impl ReplaceRequest {
    pub fn new(find_text: impl Into<String>, replace_text: impl Into<String>) -> Self {
        Self {
            find_text: find_text.into(),
            replace_text: replace_text.into(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_font_choice(mut self, choice: impl Into<String>) -> Self {
        self.font_choice = Some(choice.into());
        self
    }

    pub fn with_uploaded_font(mut self, font: UploadedFont) -> Self {
        self.uploaded_fonts.push(font);
        self
    }
}

/// How the first rendered match was styled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Diagnostics {
    /// Font name found under the match, empty when none was.
    pub detected_font: String,
    pub detected_bold: bool,
    pub detected_italic: bool,
    pub used_source: FontSource,
    pub used_font: String,
}

/// Result of a pass.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ReplaceSummary {
    #[cfg_attr(feature = "serde", serde(skip))]
    pub bytes: Vec<u8>,
    /// Merged match regions found across the visited pages.
    pub replacements: usize,
    pub diagnostics: Option<Diagnostics>,
}

/// A match with everything read from the page before redaction.
struct Target {
    region: MatchRegion,
    style: TextStyle,
}

/// Replace every occurrence of `request.find_text` in `bytes`.
///
/// Nothing is returned unless the whole pass succeeds. A match that no
/// font can render is left blank and logged, and the pass continues.
pub fn replace_text(
    bytes: &[u8],
    request: &ReplaceRequest,
    config: &EngineConfig,
) -> Result<ReplaceSummary, PdfError> {
    if request.find_text.trim().is_empty() {
        return Err(PdfError::invalid("findText is required"));
    }
    let mut pdf = Pdf::open(bytes)?;
    let pages = request.scope.page_range(pdf.page_count())?;
    let mut resolver = FontResolver::new(config, &request.uploaded_fonts)?;
    resolver.snapshot_embedded(pdf.document());
    let mut embedder = FontEmbedder::new();

    let mut replacements = 0;
    let mut diagnostics = None;
    for index in pages.clone() {
        let page = pdf.page(index)?;
        let targets: Vec<Target> =
            locate_matches(&page, &request.find_text, &request.replace_text)
                .into_iter()
                .map(|region| {
                    let style = extract_style(&page, &region.rect);
                    Target { region, style }
                })
                .collect();
        if targets.is_empty() {
            continue;
        }
        replacements += targets.len();

        let rects: Vec<BBox> = targets.iter().map(|t| t.region.rect).collect();
        let report = pdf.redact(index, &rects)?;
        debug!(
            page = index + 1,
            regions = rects.len(),
            removed_glyphs = report.removed_glyphs,
            "redacted matches"
        );

        let geometry = pdf.geometry(index)?;
        let mut pass = PagePass {
            pdf: &mut pdf,
            embedder: &mut embedder,
            resolver: &mut resolver,
            index,
            geometry: &geometry,
            forced: request.font_choice.as_deref(),
        };
        for target in &targets {
            let rendered = pass.render(target);
            if diagnostics.is_none() {
                diagnostics = rendered;
            }
        }
    }

    let bytes = pdf.to_bytes()?;
    info!(
        replacements,
        pages = pages.len(),
        used_font = diagnostics.as_ref().map(|d| d.used_font.as_str()),
        "replacement pass complete"
    );
    Ok(ReplaceSummary {
        bytes,
        replacements,
        diagnostics,
    })
}

/// Per-page rendering state.
struct PagePass<'p, 'c> {
    pdf: &'p mut Pdf,
    embedder: &'p mut FontEmbedder,
    resolver: &'p mut FontResolver<'c>,
    index: usize,
    geometry: &'p PageGeometry,
    forced: Option<&'p str>,
}

impl PagePass<'_, '_> {
    /// Draw the replacement for one target, trying each candidate font in
    /// turn. Returns diagnostics for the font that worked.
    fn render(&mut self, target: &Target) -> Option<Diagnostics> {
        let Target { region, style } = target;
        let text = compose_text(&match_replacement_case(
            &region.original_text,
            &region.replacement_text,
        ));
        if text.trim().is_empty() {
            return None;
        }

        let font_name = style.font_name.as_deref().unwrap_or("");
        let (name_bold, name_italic) = infer_bold_italic(font_name);
        let bold = style.bold || name_bold;
        let italic = style.italic || name_italic;
        let request = FontRequest {
            font_name,
            bold,
            italic,
            original_text: &region.original_text,
            replacement_text: &text,
            forced: self.forced,
        };
        let job = FitJob {
            rect: region.rect,
            original_text: &region.original_text,
            text: &text,
            size: style
                .font_size
                .filter(|s| *s > 0.0)
                .unwrap_or_else(|| estimate_font_size(&region.rect)),
            color: style.color.unwrap_or_else(Color::black),
        };

        let candidates = self.resolver.candidates(self.pdf.document(), &request);
        for choice in candidates {
            match self.try_insert(&job, &choice) {
                Ok(layout) => {
                    debug!(
                        page = self.index + 1,
                        font = %choice.label(),
                        source = %choice.source(),
                        size = layout.size,
                        distributed = layout.distributed,
                        "replacement drawn"
                    );
                    return Some(Diagnostics {
                        detected_font: font_name.to_string(),
                        detected_bold: bold,
                        detected_italic: italic,
                        used_source: choice.source(),
                        used_font: choice.label(),
                    });
                }
                Err(e) => {
                    debug!(font = %choice.label(), error = %e, "font failed, trying next");
                }
            }
        }
        warn!(
            page = self.index + 1,
            original = %region.original_text,
            "no font could render the replacement, match left blank"
        );
        None
    }

    fn try_insert(&mut self, job: &FitJob<'_>, choice: &FontChoice) -> Result<Layout, PdfError> {
        insert_with(
            self.pdf,
            self.embedder,
            self.resolver.metrics(),
            self.index,
            self.geometry,
            job,
            choice,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Line, build_pdf, text_pdf};

    fn config() -> EngineConfig {
        EngineConfig::isolated(Vec::new())
    }

    fn page_text(bytes: &[u8], index: usize) -> String {
        Pdf::open(bytes).unwrap().page(index).unwrap().extract_text()
    }

    #[test]
    fn scope_parsing() {
        assert_eq!(Scope::parse("ALL", None, None).unwrap(), Scope::All);
        assert_eq!(Scope::parse("", None, None).unwrap(), Scope::All);
        assert!(matches!(
            Scope::parse("range", Some(1), Some(2)).unwrap(),
            Scope::Range { .. }
        ));
        let err = Scope::parse("some", None, None).unwrap_err();
        assert_eq!(err.to_string(), "scope must be 'all' or 'range'");
    }

    #[test]
    fn range_bounds() {
        let range = |from, to| Scope::Range {
            from_page: from,
            to_page: to,
        };
        assert_eq!(Scope::All.page_range(3).unwrap(), 0..3);
        assert_eq!(range(Some(2), Some(3)).page_range(3).unwrap(), 1..3);
        let msg = |s: Scope| s.page_range(3).unwrap_err().to_string();
        assert_eq!(
            msg(range(None, Some(2))),
            "fromPage and toPage are required when scope='range'"
        );
        assert_eq!(msg(range(Some(0), Some(2))), "fromPage must be between 1 and 3");
        assert_eq!(msg(range(Some(1), Some(4))), "toPage must be between 1 and 3");
        assert_eq!(msg(range(Some(3), Some(2))), "toPage must be >= fromPage");
    }

    #[test]
    fn find_text_required_before_opening() {
        let err = replace_text(b"not a pdf", &ReplaceRequest::new("  ", "x"), &config())
            .unwrap_err();
        assert_eq!(err.to_string(), "findText is required");

        let err = replace_text(b"not a pdf", &ReplaceRequest::new("a", "b"), &config())
            .unwrap_err();
        assert!(matches!(err, PdfError::InvalidInput(_)));
    }

    #[test]
    fn upload_limits_are_checked() {
        let bytes = text_pdf(&["Hello"]);
        let request = ReplaceRequest::new("Hello", "Bye")
            .with_uploaded_font(UploadedFont::new("notes.txt", vec![1, 2, 3]));
        let err = replace_text(&bytes, &request, &config()).unwrap_err();
        assert_eq!(err.to_string(), "font file notes.txt must be .ttf or .otf");
    }

    #[test]
    fn replaces_word_with_builtin_font() {
        let bytes = text_pdf(&["Hello World"]);
        let summary =
            replace_text(&bytes, &ReplaceRequest::new("world", "there"), &config()).unwrap();
        assert_eq!(summary.replacements, 1);

        let text = page_text(&summary.bytes, 0);
        assert!(text.contains("There"), "got {text:?}");
        assert!(!text.contains("World"));
        assert!(text.starts_with("Hello"));

        let diag = summary.diagnostics.unwrap();
        assert_eq!(diag.detected_font, "Helvetica");
        assert!(!diag.detected_bold && !diag.detected_italic);
        assert_eq!(diag.used_source, FontSource::Builtin);
        assert_eq!(diag.used_font, "Helvetica");
    }

    #[test]
    fn bold_name_picks_bold_face() {
        let bytes = build_pdf(
            "Times-Bold",
            None,
            &[vec![Line::at("Invoice Total", 72.0, 700.0, 14.0)]],
        );
        let summary =
            replace_text(&bytes, &ReplaceRequest::new("Invoice", "Receipt"), &config()).unwrap();
        let diag = summary.diagnostics.unwrap();
        assert!(diag.detected_bold);
        assert_eq!(diag.used_font, "Times-Bold");
    }

    #[test]
    fn keeps_fill_colour() {
        let bytes = build_pdf(
            "Helvetica",
            Some([1.0, 0.0, 0.0]),
            &[vec![Line::at("Price: cheap", 72.0, 700.0, 12.0)]],
        );
        let summary =
            replace_text(&bytes, &ReplaceRequest::new("cheap", "dear"), &config()).unwrap();
        let pdf = Pdf::open(&summary.bytes).unwrap();
        let page = pdf.page(0).unwrap();
        assert!(page.extract_text().contains("dear"));
        assert!(
            page.chars()
                .iter()
                .filter(|c| !c.is_blank())
                .all(|c| c.color == Color::new(1.0, 0.0, 0.0))
        );
    }

    #[test]
    fn range_scope_limits_pages() {
        let bytes = text_pdf(&["name one", "name two", "name three"]);
        let request = ReplaceRequest::new("name", "label").with_scope(Scope::Range {
            from_page: Some(2),
            to_page: Some(2),
        });
        let summary = replace_text(&bytes, &request, &config()).unwrap();
        assert_eq!(summary.replacements, 1);
        assert!(page_text(&summary.bytes, 0).contains("name"));
        assert!(page_text(&summary.bytes, 1).contains("label"));
        assert!(page_text(&summary.bytes, 2).contains("name"));
    }

    #[test]
    fn empty_replacement_erases() {
        let bytes = text_pdf(&["keep drop"]);
        let summary = replace_text(&bytes, &ReplaceRequest::new("drop", ""), &config()).unwrap();
        assert_eq!(summary.replacements, 1);
        assert!(summary.diagnostics.is_none());
        assert_eq!(page_text(&summary.bytes, 0).trim(), "keep");
    }

    #[test]
    fn no_match_returns_zero() {
        let bytes = text_pdf(&["nothing to see"]);
        let summary =
            replace_text(&bytes, &ReplaceRequest::new("absent", "x"), &config()).unwrap();
        assert_eq!(summary.replacements, 0);
        assert!(summary.diagnostics.is_none());
        assert!(Pdf::open(&summary.bytes).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn diagnostics_serialize_camel_case() {
        let diag = Diagnostics {
            detected_font: "Arial-BoldMT".to_string(),
            detected_bold: true,
            detected_italic: false,
            used_source: FontSource::CustomBundled,
            used_font: "Arial Bold.ttf".to_string(),
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["detectedFont"], "Arial-BoldMT");
        assert_eq!(json["detectedBold"], true);
        assert_eq!(json["usedSource"], "custom-bundled");
        assert_eq!(json["usedFont"], "Arial Bold.ttf");
    }

    #[test]
    fn forced_family_overrides_detected() {
        let bytes = text_pdf(&["Hello World"]);
        let request = ReplaceRequest::new("World", "Earth").with_font_choice("mono");
        let summary = replace_text(&bytes, &request, &config()).unwrap();
        let diag = summary.diagnostics.unwrap();
        assert_eq!(diag.used_source, FontSource::Builtin);
        assert_eq!(diag.used_font, "Courier");
    }
}
