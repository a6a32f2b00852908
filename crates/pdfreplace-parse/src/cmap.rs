//! ToUnicode CMaps: reading the ones fonts carry and writing the ones we
//! attach to embedded fonts.
//!
//! Reading supports `bfchar` and `bfrange` (both the offset and the array
//! destination form) and records the code width from `codespacerange`.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::BackendError;

/// A parsed ToUnicode CMap.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
    /// Bytes per character code, from the first `codespacerange` entry.
    code_bytes: usize,
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Hex(&'a str),
    ArrayStart,
    ArrayEnd,
    Keyword(&'a str),
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'>' if bytes.get(i + 1) == Some(&bytes[i]) => i += 2,
            b'<' => {
                let end = text[i + 1..].find('>').map_or(bytes.len(), |e| i + 1 + e);
                tokens.push(Token::Hex(text[i + 1..end].trim()));
                i = end + 1;
            }
            b'[' => {
                tokens.push(Token::ArrayStart);
                i += 1;
            }
            b']' => {
                tokens.push(Token::ArrayEnd);
                i += 1;
            }
            b if b.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                tokens.push(Token::Keyword(&text[start..i]));
            }
            _ => i += 1,
        }
    }
    tokens
}

fn parse_code(hex: &str) -> Result<u32, BackendError> {
    let cleaned: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    u32::from_str_radix(&cleaned, 16)
        .map_err(|e| BackendError::Parse(format!("invalid CMap code <{hex}>: {e}")))
}

/// Decode a UTF-16BE hex string. Two-digit values are treated as one code
/// unit.
fn decode_utf16_hex(hex: &str) -> Result<String, BackendError> {
    let cleaned: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    let padded = if cleaned.len() % 4 == 2 {
        format!("00{cleaned}")
    } else {
        cleaned
    };
    let units = padded
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            let s = std::str::from_utf8(chunk).unwrap_or("");
            u16::from_str_radix(s, 16)
                .map_err(|e| BackendError::Parse(format!("invalid UTF-16 unit '{s}': {e}")))
        })
        .collect::<Result<Vec<u16>, _>>()?;
    Ok(String::from_utf16_lossy(&units))
}

impl ToUnicodeCMap {
    /// Parse the decoded bytes of a `/ToUnicode` stream.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(data);
        let tokens = tokenize(&text);
        let mut cmap = ToUnicodeCMap::default();

        let mut section: Option<&str> = None;
        let mut i = 0;
        while i < tokens.len() {
            match (&tokens[i], section) {
                (Token::Keyword(k), _) if k.starts_with("begin") => {
                    section = Some(&k["begin".len()..]);
                    i += 1;
                }
                (Token::Keyword(k), _) if k.starts_with("end") => {
                    section = None;
                    i += 1;
                }
                (Token::Hex(lo), Some("codespacerange")) => {
                    if cmap.code_bytes == 0 {
                        let digits = lo.chars().filter(|c| c.is_ascii_hexdigit()).count();
                        cmap.code_bytes = digits.div_ceil(2);
                    }
                    i += 2;
                }
                (Token::Hex(src), Some("bfchar")) => {
                    if let Some(Token::Hex(dst)) = tokens.get(i + 1) {
                        cmap.mappings.insert(parse_code(src)?, decode_utf16_hex(dst)?);
                    }
                    i += 2;
                }
                (Token::Hex(lo), Some("bfrange")) => {
                    let Some(Token::Hex(hi)) = tokens.get(i + 1) else {
                        break;
                    };
                    let (lo, hi) = (parse_code(lo)?, parse_code(hi)?);
                    match tokens.get(i + 2) {
                        Some(Token::Hex(dst)) => {
                            let base = decode_utf16_hex(dst)?;
                            cmap.insert_offset_range(lo, hi, &base);
                            i += 3;
                        }
                        Some(Token::ArrayStart) => {
                            let mut j = i + 3;
                            let mut code = lo;
                            while let Some(Token::Hex(dst)) = tokens.get(j) {
                                if code <= hi {
                                    cmap.mappings.insert(code, decode_utf16_hex(dst)?);
                                }
                                code += 1;
                                j += 1;
                            }
                            i = j + 1;
                        }
                        _ => i += 2,
                    }
                }
                _ => i += 1,
            }
        }
        Ok(cmap)
    }

    /// Map `lo..=hi` onto consecutive values starting at `base`; only the
    /// last character of `base` is incremented.
    fn insert_offset_range(&mut self, lo: u32, hi: u32, base: &str) {
        let Some(last) = base.chars().last() else {
            return;
        };
        let prefix = &base[..base.len() - last.len_utf8()];
        for (offset, code) in (lo..=hi).enumerate() {
            if let Some(ch) = char::from_u32(last as u32 + offset as u32) {
                self.mappings.insert(code, format!("{prefix}{ch}"));
            }
        }
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// Bytes per code declared by `codespacerange`, or `None` if absent.
    pub fn code_bytes(&self) -> Option<usize> {
        (self.code_bytes > 0).then_some(self.code_bytes)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Write a ToUnicode CMap for two-byte glyph-id codes.
pub fn write_identity_to_unicode(entries: &[(u16, char)]) -> String {
    let mut out = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    for chunk in entries.chunks(100) {
        let _ = writeln!(out, "{} beginbfchar", chunk.len());
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let hex: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            let _ = writeln!(out, "<{gid:04X}> <{hex}>");
        }
        out.push_str("endbfchar\n");
    }
    out.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    out
}
