//! End-to-end replacement passes over generated documents.

mod common;

use common::{PdfBuilder, TextLine, host_ttf, page_texts, simple_pdf};
use pdfreplace::{
    Color, EngineConfig, FontSource, Pdf, PdfError, ReplaceRequest, Scope, UploadedFont,
    replace_text,
};

fn isolated() -> EngineConfig {
    EngineConfig::isolated(Vec::new())
}

#[test]
fn replaces_every_occurrence_across_pages() {
    let bytes = simple_pdf(&["Dear Jane Doe,", "Regards to Jane Doe", "Nothing here"]);
    let summary = replace_text(
        &bytes,
        &ReplaceRequest::new("jane doe", "john smith"),
        &isolated(),
    )
    .unwrap();

    assert_eq!(summary.replacements, 2);
    let texts = page_texts(&summary.bytes);
    assert!(texts[0].contains("John Smith"), "{texts:?}");
    assert!(texts[1].contains("John Smith"), "{texts:?}");
    assert!(texts.iter().all(|t| !t.contains("Jane")));
    assert_eq!(texts[2], "Nothing here");
}

#[test]
fn casing_follows_the_original() {
    let bytes = PdfBuilder::new()
        .font("F1", "Helvetica-Bold")
        .page(vec![TextLine::new("RESUME", "F1", 18.0, 72.0, 700.0)])
        .build();
    let summary =
        replace_text(&bytes, &ReplaceRequest::new("resume", "summary"), &isolated()).unwrap();
    assert!(page_texts(&summary.bytes)[0].contains("SUMMARY"));

    let diag = summary.diagnostics.unwrap();
    assert_eq!(diag.detected_font, "Helvetica-Bold");
    assert!(diag.detected_bold);
    assert_eq!(diag.used_font, "Helvetica-Bold");
}

#[test]
fn tightly_led_neighbour_line_survives() {
    let bytes = PdfBuilder::new()
        .font("F1", "Helvetica")
        .page(vec![
            TextLine::new("Name: Alice", "F1", 12.0, 72.0, 700.0),
            TextLine::new("Other words here", "F1", 12.0, 72.0, 688.0),
        ])
        .build();
    let summary =
        replace_text(&bytes, &ReplaceRequest::new("Alice", "Bobby"), &isolated()).unwrap();
    assert_eq!(summary.replacements, 1);

    let text = &page_texts(&summary.bytes)[0];
    assert!(text.contains("Bobby"), "{text:?}");
    assert!(text.contains("Other words here"), "{text:?}");
    assert!(!text.contains("Alice"));
}

#[test]
fn partial_word_expands_to_whole_word() {
    let bytes = simple_pdf(&["Please see the attached invoices today"]);
    let summary =
        replace_text(&bytes, &ReplaceRequest::new("invoice", "receipt"), &isolated()).unwrap();
    let text = &page_texts(&summary.bytes)[0];
    assert!(text.contains("receipts"), "{text:?}");
    assert!(!text.contains("invoice"));
}

#[test]
fn unknown_family_falls_back_to_builtin() {
    let bytes = PdfBuilder::new()
        .font("F1", "ABCDEF+Montserrat-Italic")
        .page(vec![TextLine::new("Project Falcon", "F1", 14.0, 72.0, 700.0)])
        .build();
    let summary =
        replace_text(&bytes, &ReplaceRequest::new("Falcon", "Heron"), &isolated()).unwrap();
    assert_eq!(summary.replacements, 1);

    let diag = summary.diagnostics.unwrap();
    assert_eq!(diag.detected_font, "ABCDEF+Montserrat-Italic");
    assert!(diag.detected_italic);
    assert_eq!(diag.used_source, FontSource::Builtin);
    assert_eq!(diag.used_font, "Helvetica");
    assert!(page_texts(&summary.bytes)[0].contains("Heron"));
}

#[test]
fn colour_is_preserved() {
    let blue = [0.0, 0.0, 1.0];
    let bytes = PdfBuilder::new()
        .font("F1", "Times-Roman")
        .page(vec![
            TextLine::new("Status: draft", "F1", 12.0, 72.0, 700.0).colored(blue),
        ])
        .build();
    let summary =
        replace_text(&bytes, &ReplaceRequest::new("draft", "final"), &isolated()).unwrap();

    let pdf = Pdf::open(&summary.bytes).unwrap();
    let page = pdf.page(0).unwrap();
    let final_chars: Vec<_> = page
        .chars()
        .iter()
        .filter(|c| "final".contains(c.text.as_str()) && !c.is_blank())
        .collect();
    assert!(!final_chars.is_empty());
    assert!(final_chars.iter().all(|c| c.color == Color::new(0.0, 0.0, 1.0)));
}

#[test]
fn range_scope_and_validation() {
    let bytes = simple_pdf(&["code A", "code B", "code C"]);
    let request = ReplaceRequest::new("code", "key").with_scope(
        Scope::parse("range", Some(2), Some(3)).unwrap(),
    );
    let summary = replace_text(&bytes, &request, &isolated()).unwrap();
    assert_eq!(summary.replacements, 2);
    let texts = page_texts(&summary.bytes);
    assert!(texts[0].contains("code"));
    assert!(texts[1].contains("key") && texts[2].contains("key"));

    let out_of_range = ReplaceRequest::new("code", "key").with_scope(Scope::Range {
        from_page: Some(1),
        to_page: Some(9),
    });
    let err = replace_text(&bytes, &out_of_range, &isolated()).unwrap_err();
    assert_eq!(err, PdfError::InvalidInput("toPage must be between 1 and 3".into()));
}

#[test]
fn failed_pass_reports_invalid_input() {
    let err = replace_text(b"%PDF-1.4 broken", &ReplaceRequest::new("a", "b"), &isolated())
        .unwrap_err();
    assert!(matches!(err, PdfError::InvalidInput(_)));

    let too_many: Vec<UploadedFont> = (0..21)
        .map(|i| UploadedFont::new(format!("f{i}.ttf"), vec![0]))
        .collect();
    let mut request = ReplaceRequest::new("code", "key");
    request.uploaded_fonts = too_many;
    let err = replace_text(&simple_pdf(&["code"]), &request, &isolated()).unwrap_err();
    assert_eq!(err.to_string(), "at most 20 font files are allowed");
}

#[test]
fn uploaded_font_is_preferred_over_builtin() {
    let Some(ttf) = host_ttf() else {
        return;
    };
    let data = std::fs::read(&ttf).unwrap();
    let family = ttf
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap()
        .to_string();

    let bytes = PdfBuilder::new()
        .font("F1", &family)
        .page(vec![TextLine::new("Hello World", "F1", 12.0, 72.0, 700.0)])
        .build();
    let request = ReplaceRequest::new("World", "Earth")
        .with_uploaded_font(UploadedFont::new(format!("{family}.ttf"), data));
    let summary = replace_text(&bytes, &request, &isolated()).unwrap();

    let diag = summary.diagnostics.unwrap();
    assert_eq!(diag.used_source, FontSource::CustomUploaded);
    assert!(diag.used_font.ends_with(".ttf"));
    assert!(Pdf::open(&summary.bytes).is_ok());
}

#[test]
fn letter_spaced_heading_keeps_its_width() {
    let bytes = PdfBuilder::new()
        .font("F1", "Helvetica")
        .page(vec![
            TextLine::new("JANE", "F1", 24.0, 100.0, 700.0).spaced(3.0),
        ])
        .build();
    let before = Pdf::open(&bytes).unwrap().page(0).unwrap();
    let original_width = {
        let chars = before.chars();
        chars.last().unwrap().bbox.x1 - chars[0].bbox.x0
    };

    let summary =
        replace_text(&bytes, &ReplaceRequest::new("JANE", "JILL"), &isolated()).unwrap();
    let after = Pdf::open(&summary.bytes).unwrap().page(0).unwrap();
    let chars: Vec<_> = after.chars().iter().filter(|c| !c.is_blank()).collect();
    assert_eq!(
        chars.iter().map(|c| c.text.as_str()).collect::<String>(),
        "JILL"
    );
    let new_width = chars.last().unwrap().bbox.x1 - chars[0].bbox.x0;
    // Set as one string, JILL would be about 45pt wide.
    assert!(new_width > original_width * 0.9, "{new_width} vs {original_width}");
}
