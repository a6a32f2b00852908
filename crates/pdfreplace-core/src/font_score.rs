//! Scoring of candidate font files against a wanted family, weight and slant.

/// Derive the family key used to match font filenames.
///
/// Known families map to a canonical key (`"arial"` for Arial and Helvetica,
/// `"times"` for Times New Roman, ...). Any other name of at least three
/// characters is used verbatim so uploaded fonts for unusual families can
/// still match.
pub fn family_key(normalized: &str) -> Option<String> {
    let n = normalized.to_lowercase();
    if n.is_empty() {
        return None;
    }
    const KNOWN: &[(&[&str], &str)] = &[
        (&["timesnewroman", "timenewroman", "times"], "times"),
        (&["arial", "helvetica"], "arial"),
        (&["calibri"], "calibri"),
        (&["cambria"], "cambria"),
        (&["georgia"], "georgia"),
        (&["garamond"], "garamond"),
        (&["palatino"], "palatino"),
        (&["constantia"], "constantia"),
        (&["dejavu-serif", "dejavuserif"], "dejavuserif"),
        (&["dejavu-sans", "dejavusans"], "dejavusans"),
        (&["dejavu"], "dejavu"),
        (&["liberation-serif", "liberationserif"], "liberationserif"),
        (&["liberation-sans", "liberationsans"], "liberationsans"),
        (&["liberation"], "liberation"),
        (&["noto"], "noto"),
        (&["courier"], "courier"),
        (&["consolas", "monospace", "mono"], "mono"),
    ];
    for (needles, key) in KNOWN {
        if needles.iter().any(|needle| n.contains(needle)) {
            return Some((*key).to_string());
        }
    }
    (n.chars().count() >= 3).then_some(n)
}

/// Score a font filename for the wanted family/weight/slant.
///
/// +10 for a family-key substring, +4 per agreeing weight/slant token,
/// -1 when a wanted attribute is missing, -2 when an unwanted one is present,
/// +1 for a plain regular face when regular is wanted, +1 for `.ttf`/`.otf`.
pub fn score_font_filename(filename: &str, family_key: &str, bold: bool, italic: bool) -> i32 {
    let f = filename.to_lowercase();
    let mut score = 0;

    if !family_key.is_empty() && f.contains(family_key) {
        score += 10;
    }

    let is_bold_name = ["bold", "bd", "black", "heavy", "semibold", "demibold"]
        .iter()
        .any(|k| f.contains(k));
    let is_italic_name = ["italic", "oblique", "slanted"]
        .iter()
        .any(|k| f.contains(k));
    let is_regular_name = ["regular", "book", "roman", "medium"]
        .iter()
        .any(|k| f.contains(k));

    if bold {
        score += if is_bold_name { 4 } else { -1 };
    } else {
        if is_regular_name && !is_bold_name {
            score += 1;
        }
        if is_bold_name {
            score -= 2;
        }
    }

    if italic {
        score += if is_italic_name { 4 } else { -1 };
    } else if is_italic_name {
        score -= 2;
    }

    if has_font_extension(&f) {
        score += 1;
    }
    score
}

/// Whether a filename ends in `.ttf` or `.otf` (case-insensitive).
pub fn has_font_extension(filename: &str) -> bool {
    let f = filename.to_lowercase();
    f.ends_with(".ttf") || f.ends_with(".otf")
}

/// Pick the best-scoring filename; ties keep the earliest candidate and only
/// strictly positive scores qualify.
pub fn best_font_filename<'a, I>(filenames: I, family_key: &str, bold: bool, italic: bool) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, i32)> = None;
    for name in filenames {
        if !has_font_extension(name) {
            continue;
        }
        let score = score_font_filename(name, family_key, bold, italic);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((name, score));
        }
    }
    best.map(|(name, _)| name)
}
