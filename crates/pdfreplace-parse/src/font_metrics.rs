//! Font dictionaries as seen by the interpreter: widths, vertical metrics,
//! character decoding and the embedded program reference.
//!
//! Simple fonts read `/FirstChar` + `/Widths`; composite (Type0) fonts read
//! `/DW` + `/W` from their descendant CIDFont. Unembedded base fonts fall
//! back to the standard-14 tables.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfreplace_core::StyleFlags;

use crate::cmap::ToUnicodeCMap;
use crate::lopdf_backend::{dict_entry, number, resolve_ref, stream_bytes};
use crate::standard_fonts::{self, StandardFontData};
use crate::win_ansi;

/// Default ascent when the descriptor has none (1/1000 em).
const DEFAULT_ASCENT: f64 = 750.0;

/// Default descent when the descriptor has none (1/1000 em).
const DEFAULT_DESCENT: f64 = -250.0;

/// `/DW` default for CIDFonts.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Largest `/W` range we expand.
const MAX_W_RANGE: u32 = 0xFFFF;

/// Kind of font program stored in a FontDescriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFileKind {
    /// `/FontFile`: Type 1 (PFB/PFA).
    Type1,
    /// `/FontFile2`: TrueType.
    TrueType,
    /// `/FontFile3` with `/Subtype /Type1C` or `/CIDFontType0C`.
    Cff,
    /// `/FontFile3` with `/Subtype /OpenType`.
    OpenType,
}

impl FontFileKind {
    /// File extension used when the program is written to disk.
    pub fn extension(self) -> &'static str {
        match self {
            FontFileKind::Type1 => "pfb",
            FontFileKind::TrueType => "ttf",
            FontFileKind::Cff => "cff",
            FontFileKind::OpenType => "otf",
        }
    }
}

/// Reference to a font program stream inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFileRef {
    pub id: ObjectId,
    pub kind: FontFileKind,
}

/// Glyph widths in 1/1000 em.
#[derive(Debug, Clone, Default)]
enum Widths {
    Simple {
        first_char: u32,
        widths: Vec<f64>,
    },
    Cid(HashMap<u32, f64>),
    #[default]
    None,
}

/// A font resource resolved from its dictionary.
#[derive(Debug, Clone)]
pub struct PdfFont {
    /// `/BaseFont`, subset prefix preserved.
    pub base_font: String,
    /// `/Subtype` such as `Type1`, `TrueType` or `Type0`.
    pub subtype: String,
    /// Whether codes are two bytes (Type0).
    pub composite: bool,
    /// Weight and slant from the FontDescriptor.
    pub flags: StyleFlags,
    /// Ascent in 1/1000 em.
    pub ascent: f64,
    /// Descent in 1/1000 em (negative).
    pub descent: f64,
    pub font_file: Option<FontFileRef>,
    widths: Widths,
    missing_width: f64,
    standard: Option<&'static StandardFontData>,
    to_unicode: Option<ToUnicodeCMap>,
    differences: HashMap<u32, char>,
}

fn name_of(obj: &Object) -> Option<String> {
    obj.as_name()
        .ok()
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

/// Parse a CIDFont `/W` array: `c [w1 w2 ...]` and `c_first c_last w`.
fn parse_w_array(doc: &Document, objects: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < objects.len() {
        let Some(start) = number(resolve_ref(doc, &objects[i])).map(|v| v as u32) else {
            i += 1;
            continue;
        };
        let Some(next) = objects.get(i + 1).map(|o| resolve_ref(doc, o)) else {
            break;
        };
        if let Ok(list) = next.as_array() {
            for (j, obj) in list.iter().enumerate() {
                if let Some(w) = number(resolve_ref(doc, obj)) {
                    widths.insert(start + j as u32, w);
                }
            }
            i += 2;
        } else if let Some(end) = number(next).map(|v| v as u32) {
            if let Some(w) = objects.get(i + 2).and_then(|o| number(resolve_ref(doc, o))) {
                if end >= start && end - start <= MAX_W_RANGE {
                    for cid in start..=end {
                        widths.insert(cid, w);
                    }
                }
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    widths
}

fn parse_differences(doc: &Document, encoding: &Dictionary) -> HashMap<u32, char> {
    let mut map = HashMap::new();
    let Ok(diffs) = encoding
        .get(b"Differences")
        .map(|o| resolve_ref(doc, o))
        .and_then(Object::as_array)
    else {
        return map;
    };
    let mut code = 0u32;
    for item in diffs {
        match item {
            Object::Integer(n) => code = *n as u32,
            Object::Name(name) => {
                if let Some(ch) = win_ansi::glyph_name_to_char(&String::from_utf8_lossy(name)) {
                    map.insert(code, ch);
                }
                code += 1;
            }
            _ => {}
        }
    }
    map
}

fn font_file_ref(descriptor: &Dictionary) -> Option<FontFileRef> {
    let candidates: [(&[u8], FontFileKind); 2] = [
        (b"FontFile2", FontFileKind::TrueType),
        (b"FontFile", FontFileKind::Type1),
    ];
    for (key, kind) in candidates {
        if let Ok(id) = descriptor.get(key).and_then(Object::as_reference) {
            return Some(FontFileRef { id, kind });
        }
    }
    descriptor
        .get(b"FontFile3")
        .and_then(Object::as_reference)
        .ok()
        .map(|id| FontFileRef {
            id,
            kind: FontFileKind::Cff,
        })
}

impl PdfFont {
    /// Resolve a font dictionary.
    pub fn load(doc: &Document, dict: &Dictionary) -> Self {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(name_of)
            .unwrap_or_default();
        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(name_of)
            .unwrap_or_default();
        let composite = subtype == "Type0";

        // Type0 keeps its widths and descriptor on the descendant CIDFont.
        let descendant = if composite {
            dict.get(b"DescendantFonts")
                .ok()
                .map(|o| resolve_ref(doc, o))
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .map(|o| resolve_ref(doc, o))
                .and_then(|o| o.as_dict().ok())
        } else {
            None
        };
        let metrics_dict = descendant.unwrap_or(dict);
        let descriptor = dict_entry(doc, metrics_dict, b"FontDescriptor");

        let standard = if composite {
            None
        } else {
            standard_fonts::lookup(&base_font)
        };

        let widths = if composite {
            let w = metrics_dict
                .get(b"W")
                .map(|o| resolve_ref(doc, o))
                .and_then(Object::as_array)
                .map(|a| parse_w_array(doc, a))
                .unwrap_or_default();
            Widths::Cid(w)
        } else {
            match dict
                .get(b"Widths")
                .map(|o| resolve_ref(doc, o))
                .and_then(Object::as_array)
            {
                Ok(array) => Widths::Simple {
                    first_char: dict
                        .get(b"FirstChar")
                        .ok()
                        .and_then(number)
                        .map_or(0, |v| v as u32),
                    widths: array
                        .iter()
                        .map(|o| number(resolve_ref(doc, o)).unwrap_or(0.0))
                        .collect(),
                },
                Err(_) => Widths::None,
            }
        };

        let missing_width = if composite {
            metrics_dict
                .get(b"DW")
                .ok()
                .and_then(number)
                .unwrap_or(DEFAULT_CID_WIDTH)
        } else {
            descriptor
                .and_then(|d| d.get(b"MissingWidth").ok())
                .and_then(number)
                .unwrap_or(0.0)
        };

        let desc_number = |key: &[u8]| {
            descriptor
                .and_then(|d| d.get(key).ok())
                .map(|o| resolve_ref(doc, o))
                .and_then(number)
        };
        let flags = StyleFlags::from_descriptor(
            desc_number(b"Flags").map_or(0, |f| f as u32),
            desc_number(b"FontWeight"),
            desc_number(b"ItalicAngle"),
        );
        let ascent = desc_number(b"Ascent")
            .filter(|a| *a != 0.0)
            .or(standard.map(|s| f64::from(s.ascent)))
            .unwrap_or(DEFAULT_ASCENT);
        let descent = desc_number(b"Descent")
            .filter(|d| *d != 0.0)
            .or(standard.map(|s| f64::from(s.descent)))
            .unwrap_or(DEFAULT_DESCENT);

        let mut font_file = descriptor.and_then(font_file_ref);
        if let Some(file) = font_file.as_mut().filter(|f| f.kind == FontFileKind::Cff) {
            let is_opentype = doc
                .get_object(file.id)
                .and_then(Object::as_stream)
                .ok()
                .and_then(|s| s.dict.get(b"Subtype").ok())
                .and_then(name_of)
                .is_some_and(|s| s == "OpenType");
            if is_opentype {
                file.kind = FontFileKind::OpenType;
            }
        }

        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| stream_bytes(doc, o).ok())
            .and_then(|data| ToUnicodeCMap::parse(&data).ok())
            .filter(|cmap| !cmap.is_empty());

        let differences = dict_entry(doc, dict, b"Encoding")
            .map(|enc| parse_differences(doc, enc))
            .unwrap_or_default();

        Self {
            base_font,
            subtype,
            composite,
            flags,
            ascent,
            descent,
            font_file,
            widths,
            missing_width,
            standard,
            to_unicode,
            differences,
        }
    }

    /// Fallback used when a `Tf` names a resource that does not exist.
    pub fn unknown(resource: &str) -> Self {
        Self {
            base_font: resource.to_string(),
            subtype: String::new(),
            composite: false,
            flags: StyleFlags::default(),
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            font_file: None,
            widths: Widths::None,
            missing_width: 500.0,
            standard: None,
            to_unicode: None,
            differences: HashMap::new(),
        }
    }

    /// Bytes per character code.
    pub fn code_bytes(&self) -> usize {
        match self.to_unicode.as_ref().and_then(ToUnicodeCMap::code_bytes) {
            Some(n) if self.composite => n.clamp(1, 4),
            _ if self.composite => 2,
            _ => 1,
        }
    }

    /// Split a shown string into `(code, byte_start, byte_end)` triples.
    pub fn split_codes(&self, bytes: &[u8]) -> Vec<(u32, usize, usize)> {
        let step = self.code_bytes();
        let mut codes = Vec::with_capacity(bytes.len() / step + 1);
        let mut start = 0;
        while start < bytes.len() {
            let end = (start + step).min(bytes.len());
            let code = bytes[start..end]
                .iter()
                .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
            codes.push((code, start, end));
            start = end;
        }
        codes
    }

    /// Width of `code` in 1/1000 em.
    pub fn width(&self, code: u32) -> f64 {
        match &self.widths {
            Widths::Simple { first_char, widths } => {
                if let Some(w) = code
                    .checked_sub(*first_char)
                    .and_then(|i| widths.get(i as usize))
                {
                    return *w;
                }
            }
            Widths::Cid(map) => return map.get(&code).copied().unwrap_or(self.missing_width),
            Widths::None => {}
        }
        match (self.standard, u8::try_from(code)) {
            (Some(std), Ok(byte)) => std.width(byte),
            _ => self.missing_width,
        }
    }

    /// Unicode text for `code`.
    pub fn decode(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|c| c.lookup(code)) {
            return text.to_string();
        }
        if let Some(ch) = self.differences.get(&code) {
            return ch.to_string();
        }
        if !self.composite {
            if let Some(ch) = u8::try_from(code).ok().and_then(win_ansi::decode) {
                return ch.to_string();
            }
        }
        '\u{FFFD}'.to_string()
    }

    /// Descender as a fraction of the em (negative).
    pub fn descender_em(&self) -> f64 {
        self.descent / 1000.0
    }
}
