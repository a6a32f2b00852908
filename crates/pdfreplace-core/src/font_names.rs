//! Font-name heuristics: normalization, weight/slant inference, family
//! classification and the mapping onto the twelve built-in base faces.
//!
//! Everything here is a pure function over a closed set of name tokens so it
//! can be tested without touching any font file.

/// Name tokens that mark a bold (or heavier) face.
const BOLD_TOKENS: &[&str] = &["bold", "black", "heavy", "semibold", "demibold"];

/// Name tokens that mark a slanted face.
const ITALIC_TOKENS: &[&str] = &["italic", "oblique", "slanted"];

/// Computer Modern codes for bold faces (`CMBX12`, `CMSSBX10`, ...).
const CM_BOLD_CODES: &[&str] = &["cmbx", "cmssbx", "cmssb", "cmb"];

/// Computer Modern codes for italic and slanted faces.
const CM_ITALIC_CODES: &[&str] = &["cmti", "cmsl"];

/// Computer Modern serif body codes.
const CM_SERIF_CODES: &[&str] = &["cmr", "cmbx", "cmti", "cmsl", "cmu"];

/// PDF FontDescriptor `/Flags` bit for italic faces (bit 7).
pub const FLAG_ITALIC: u32 = 1 << 6;

/// PDF FontDescriptor `/Flags` bit for forced-bold faces (bit 19).
pub const FLAG_FORCE_BOLD: u32 = 1 << 18;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Strip a leading `/`, the subset tag before `+`, and lowercase.
///
/// `"/ABCDEE+TimesNewRomanPS-BoldMT"` becomes `"timesnewromanps-boldmt"`.
pub fn normalize_font_name(raw: &str) -> String {
    let name = raw.trim();
    let name = name.strip_prefix('/').unwrap_or(name);
    let name = match name.split_once('+') {
        Some((_, rest)) => rest,
        None => name,
    };
    name.trim().to_lowercase()
}

/// Whether the raw font name carries a subset tag (`ABCDEF+Name`).
pub fn is_subset_name(raw: &str) -> bool {
    raw.trim_start_matches('/').contains('+')
}

/// Infer `(bold, italic)` from name tokens, including Computer Modern codes.
pub fn infer_bold_italic(name: &str) -> (bool, bool) {
    let name = name.to_lowercase();
    let bold = contains_any(&name, BOLD_TOKENS) || contains_any(&name, CM_BOLD_CODES);
    let italic = contains_any(&name, ITALIC_TOKENS) || contains_any(&name, CM_ITALIC_CODES);
    (bold, italic)
}

/// Whether the name looks like a LaTeX Computer Modern face.
pub fn is_computer_modern(name: &str) -> bool {
    let n = normalize_font_name(name);
    n.starts_with("cm") || contains_any(&n, &["cmr", "cmbx", "cmti", "cmsl", "cmss", "cmtt", "cmu"])
}

/// Weight and slant flags reported by a font's layout information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleFlags {
    pub bold: bool,
    pub italic: bool,
}

impl StyleFlags {
    /// Interpret FontDescriptor entries: `/Flags` bits, `/FontWeight` and
    /// `/ItalicAngle`.
    pub fn from_descriptor(flags: u32, weight: Option<f64>, italic_angle: Option<f64>) -> Self {
        let bold = flags & FLAG_FORCE_BOLD != 0 || weight.is_some_and(|w| w >= 600.0);
        let italic = flags & FLAG_ITALIC != 0 || italic_angle.is_some_and(|a| a.abs() > 0.5);
        Self { bold, italic }
    }
}

/// Normalized identity of a font as seen on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontDescriptor {
    pub raw_name: String,
    pub normalized_name: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontDescriptor {
    /// Build a descriptor from a raw font name, OR-ing name inference with
    /// the layout flags.
    pub fn new(raw_name: &str, flags: StyleFlags) -> Self {
        let (name_bold, name_italic) = infer_bold_italic(raw_name);
        Self {
            raw_name: raw_name.to_string(),
            normalized_name: normalize_font_name(raw_name),
            bold: name_bold || flags.bold,
            italic: name_italic || flags.italic,
        }
    }

    pub fn is_subset(&self) -> bool {
        is_subset_name(&self.raw_name)
    }

    pub fn family_bucket(&self) -> FamilyBucket {
        classify_family(&self.normalized_name)
    }
}

/// Coarse family bucket used to pick locale/system fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyBucket {
    Serif,
    Sans,
    Mono,
    /// LaTeX Computer Modern serif body faces.
    ComputerModern,
}

/// Classify a normalized font name into a family bucket.
pub fn classify_family(normalized: &str) -> FamilyBucket {
    let n = normalized.to_lowercase();
    const MONO: &[&str] = &[
        "courier",
        "consola",
        "monospace",
        "mono",
        "cmtt",
        "cmuntt",
        "cmuntb",
        "cmutypewriter",
    ];
    if contains_any(&n, MONO) {
        return FamilyBucket::Mono;
    }
    if contains_any(&n, &["cmss", "cmunss", "cmunsx", "cmunsi", "cmunso", "cmusans", "lmsans"]) {
        return FamilyBucket::Sans;
    }
    if contains_any(&n, CM_SERIF_CODES) {
        return FamilyBucket::ComputerModern;
    }
    const SERIF: &[&str] = &[
        "times",
        "roman",
        "serif",
        "georgia",
        "garamond",
        "cambria",
        "palatino",
        "constantia",
        "bookman",
        "goudy",
        "centaur",
        "century",
        "nimbus",
        "minion",
        "baskerville",
        "caslon",
    ];
    // "sans-serif" and "dejavusans" must not land in the serif bucket.
    if contains_any(&n, SERIF) && !n.contains("sans") {
        return FamilyBucket::Serif;
    }
    FamilyBucket::Sans
}

/// The three built-in base families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFamily {
    Times,
    Helvetica,
    Courier,
}

/// One of the twelve always-available standard faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFace {
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl BuiltinFace {
    pub const ALL: [BuiltinFace; 12] = [
        BuiltinFace::TimesRoman,
        BuiltinFace::TimesBold,
        BuiltinFace::TimesItalic,
        BuiltinFace::TimesBoldItalic,
        BuiltinFace::Helvetica,
        BuiltinFace::HelveticaBold,
        BuiltinFace::HelveticaOblique,
        BuiltinFace::HelveticaBoldOblique,
        BuiltinFace::Courier,
        BuiltinFace::CourierBold,
        BuiltinFace::CourierOblique,
        BuiltinFace::CourierBoldOblique,
    ];

    pub fn from_parts(family: BuiltinFamily, bold: bool, italic: bool) -> Self {
        use BuiltinFace::*;
        match (family, bold, italic) {
            (BuiltinFamily::Times, false, false) => TimesRoman,
            (BuiltinFamily::Times, true, false) => TimesBold,
            (BuiltinFamily::Times, false, true) => TimesItalic,
            (BuiltinFamily::Times, true, true) => TimesBoldItalic,
            (BuiltinFamily::Helvetica, false, false) => Helvetica,
            (BuiltinFamily::Helvetica, true, false) => HelveticaBold,
            (BuiltinFamily::Helvetica, false, true) => HelveticaOblique,
            (BuiltinFamily::Helvetica, true, true) => HelveticaBoldOblique,
            (BuiltinFamily::Courier, false, false) => Courier,
            (BuiltinFamily::Courier, true, false) => CourierBold,
            (BuiltinFamily::Courier, false, true) => CourierOblique,
            (BuiltinFamily::Courier, true, true) => CourierBoldOblique,
        }
    }

    /// Plain Helvetica, the last-resort face.
    pub fn default_sans() -> Self {
        BuiltinFace::Helvetica
    }

    /// The PDF `/BaseFont` name of this face.
    pub fn pdf_name(self) -> &'static str {
        use BuiltinFace::*;
        match self {
            TimesRoman => "Times-Roman",
            TimesBold => "Times-Bold",
            TimesItalic => "Times-Italic",
            TimesBoldItalic => "Times-BoldItalic",
            Helvetica => "Helvetica",
            HelveticaBold => "Helvetica-Bold",
            HelveticaOblique => "Helvetica-Oblique",
            HelveticaBoldOblique => "Helvetica-BoldOblique",
            Courier => "Courier",
            CourierBold => "Courier-Bold",
            CourierOblique => "Courier-Oblique",
            CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Exact lookup by `/BaseFont` name (subset tag and leading `/` ignored).
    pub fn from_pdf_name(name: &str) -> Option<Self> {
        let trimmed = name.trim().trim_start_matches('/');
        let bare = trimmed.split_once('+').map_or(trimmed, |(_, rest)| rest);
        Self::ALL.into_iter().find(|face| face.pdf_name() == bare)
    }

    pub fn family(self) -> BuiltinFamily {
        use BuiltinFace::*;
        match self {
            TimesRoman | TimesBold | TimesItalic | TimesBoldItalic => BuiltinFamily::Times,
            Helvetica | HelveticaBold | HelveticaOblique | HelveticaBoldOblique => {
                BuiltinFamily::Helvetica
            }
            Courier | CourierBold | CourierOblique | CourierBoldOblique => BuiltinFamily::Courier,
        }
    }
}

/// Map a font name to the closest built-in face, or `None` when the name
/// gives no family hint.
///
/// `bold`/`italic` are OR-ed with what the name itself implies.
pub fn map_to_builtin(font_name: &str, bold: bool, italic: bool) -> Option<BuiltinFace> {
    let name = font_name.to_lowercase();
    if name.is_empty() {
        return None;
    }
    let (name_bold, name_italic) = infer_bold_italic(&name);
    let bold = bold || name_bold;
    let italic = italic || name_italic;

    let family = if contains_any(&name, CM_SERIF_CODES) {
        BuiltinFamily::Times
    } else if name.contains("cmss") {
        BuiltinFamily::Helvetica
    } else if name.contains("cmtt") {
        BuiltinFamily::Courier
    } else if contains_any(&name, &["times", "timenewroman"]) {
        BuiltinFamily::Times
    } else if contains_any(&name, &["courier", "consolas", "monospace"]) {
        BuiltinFamily::Courier
    } else if contains_any(
        &name,
        &["helvetica", "arial", "calibri", "verdana", "tahoma", "sans"],
    ) {
        BuiltinFamily::Helvetica
    } else {
        return None;
    };
    Some(BuiltinFace::from_parts(family, bold, italic))
}
