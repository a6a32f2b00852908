//! Serde round-trip tests for the types exposed in JSON output.

#![cfg(feature = "serde")]

use pdfreplace_core::*;

fn roundtrip<T>(value: &T)
where
    T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let json = serde_json::to_string(value).expect("serialize failed");
    let restored: T = serde_json::from_str(&json).expect("deserialize failed");
    assert_eq!(*value, restored, "round-trip mismatch for JSON: {json}");
}

#[test]
fn test_serde_bbox() {
    roundtrip(&BBox::new(10.5, 20.25, 100.0, 200.75));
}

#[test]
fn test_serde_color() {
    roundtrip(&Color::new(0.2, 0.4, 0.6));
}

#[test]
fn test_serde_char() {
    let ch = Char {
        text: "A".to_string(),
        bbox: BBox::new(10.0, 20.0, 20.0, 32.0),
        fontname: "ABCDEF+Helvetica-Bold".to_string(),
        size: 12.0,
        color: Color::black(),
        flags: StyleFlags {
            bold: true,
            italic: false,
        },
        upright: true,
        char_code: 65,
    };
    roundtrip(&ch);
}

#[test]
fn test_serde_text_run_and_word() {
    roundtrip(&TextRun {
        text: "Hello".to_string(),
        bbox: BBox::new(0.0, 0.0, 30.0, 12.0),
        font_name: "Times-Roman".to_string(),
        font_size: 12.0,
        color: Color::gray(0.5),
        bold: false,
        italic: true,
    });
    roundtrip(&Word {
        text: "Hello".to_string(),
        bbox: BBox::new(0.0, 0.0, 30.0, 12.0),
    });
}

#[test]
fn test_serde_match_region_and_descriptor() {
    roundtrip(&MatchRegion {
        rect: BBox::new(8.0, 98.0, 122.0, 114.0),
        original_text: "Arunesh".to_string(),
        replacement_text: "Varunesh".to_string(),
    });
    roundtrip(&FontDescriptor::new("ABCDEF+Arial-BoldMT", StyleFlags::default()));
}

#[test]
fn test_serde_json_shape() {
    let json = serde_json::to_value(BBox::new(1.0, 2.0, 3.0, 4.0)).unwrap();
    assert_eq!(json["x0"], 1.0);
    assert_eq!(json["bottom"], 4.0);
}
