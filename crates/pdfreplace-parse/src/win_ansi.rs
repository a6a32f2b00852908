//! WinAnsiEncoding (Windows code page 1252) in both directions, plus the
//! small glyph-name table needed for `/Differences` arrays.

/// Characters for codes 0x80..=0x9F. `None` marks the five undefined codes.
const HIGH_CONTROL_BLOCK: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Decode one WinAnsi byte.
pub fn decode(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0x09 | 0x0A | 0x0D => Some(code as char),
        0x80..=0x9F => HIGH_CONTROL_BLOCK[(code - 0x80) as usize],
        0xA0..=0xFF => Some(code as char),
        _ => None,
    }
}

/// Encode one character, or `None` when WinAnsi has no code for it.
pub fn encode(ch: char) -> Option<u8> {
    let cp = ch as u32;
    match cp {
        0x20..=0x7E | 0xA0..=0xFF => Some(cp as u8),
        _ => HIGH_CONTROL_BLOCK
            .iter()
            .position(|c| *c == Some(ch))
            .map(|i| 0x80 + i as u8),
    }
}

/// Encode a string, writing `?` for every character WinAnsi cannot express.
pub fn encode_lossy(text: &str) -> Vec<u8> {
    text.chars().map(|c| encode(c).unwrap_or(b'?')).collect()
}

/// Resolve a glyph name from a `/Differences` array.
///
/// Handles `uniXXXX`, single-character names and the common Adobe names
/// for punctuation and Latin ligatures.
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 {
            if let Ok(code) = u32::from_str_radix(hex, 16) {
                return char::from_u32(code);
            }
        }
    }
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c);
    }
    const NAMES: &[(&str, char)] = &[
        ("space", ' '),
        ("exclam", '!'),
        ("quotedbl", '"'),
        ("numbersign", '#'),
        ("dollar", '$'),
        ("percent", '%'),
        ("ampersand", '&'),
        ("quotesingle", '\''),
        ("parenleft", '('),
        ("parenright", ')'),
        ("asterisk", '*'),
        ("plus", '+'),
        ("comma", ','),
        ("hyphen", '-'),
        ("period", '.'),
        ("slash", '/'),
        ("zero", '0'),
        ("one", '1'),
        ("two", '2'),
        ("three", '3'),
        ("four", '4'),
        ("five", '5'),
        ("six", '6'),
        ("seven", '7'),
        ("eight", '8'),
        ("nine", '9'),
        ("colon", ':'),
        ("semicolon", ';'),
        ("less", '<'),
        ("equal", '='),
        ("greater", '>'),
        ("question", '?'),
        ("at", '@'),
        ("bracketleft", '['),
        ("backslash", '\\'),
        ("bracketright", ']'),
        ("underscore", '_'),
        ("quoteleft", '\u{2018}'),
        ("quoteright", '\u{2019}'),
        ("quotedblleft", '\u{201C}'),
        ("quotedblright", '\u{201D}'),
        ("bullet", '\u{2022}'),
        ("endash", '\u{2013}'),
        ("emdash", '\u{2014}'),
        ("fi", '\u{FB01}'),
        ("fl", '\u{FB02}'),
        ("ff", '\u{FB00}'),
        ("ffi", '\u{FB03}'),
        ("ffl", '\u{FB04}'),
        ("eacute", '\u{E9}'),
        ("egrave", '\u{E8}'),
        ("aacute", '\u{E1}'),
        ("udieresis", '\u{FC}'),
        ("odieresis", '\u{F6}'),
        ("adieresis", '\u{E4}'),
        ("germandbls", '\u{DF}'),
        ("ccedilla", '\u{E7}'),
    ];
    NAMES.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_latin1_are_identity() {
        assert_eq!(decode(b'A'), Some('A'));
        assert_eq!(decode(0xE9), Some('\u{E9}'));
        assert_eq!(encode('z'), Some(b'z'));
        assert_eq!(encode('\u{FC}'), Some(0xFC));
    }

    #[test]
    fn windows_block_round_trips() {
        assert_eq!(decode(0x80), Some('\u{20AC}'));
        assert_eq!(encode('\u{20AC}'), Some(0x80));
        assert_eq!(encode('\u{2014}'), Some(0x97));
        assert_eq!(decode(0x81), None);
    }

    #[test]
    fn encode_lossy_substitutes_question_mark() {
        assert_eq!(encode_lossy("a\u{4E2D}b"), b"a?b".to_vec());
    }

    #[test]
    fn glyph_names() {
        assert_eq!(glyph_name_to_char("uni00E9"), Some('\u{E9}'));
        assert_eq!(glyph_name_to_char("x"), Some('x'));
        assert_eq!(glyph_name_to_char("fi"), Some('\u{FB01}'));
        assert_eq!(glyph_name_to_char("nonsense"), None);
    }
}
