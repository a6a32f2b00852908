//! Casing normalization between original and replacement text.

use regex::RegexBuilder;
use unicode_normalization::UnicodeNormalization;

/// Mirror the casing convention of `original` onto `replacement`.
///
/// - every letter uppercase: uppercase the replacement
/// - every letter lowercase: lowercase the replacement
/// - every word title-cased: title-case the replacement
///
/// Anything else leaves the replacement untouched.
pub fn match_replacement_case(original: &str, replacement: &str) -> String {
    if replacement.is_empty() {
        return String::new();
    }
    let original = original.trim();
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return replacement.to_string();
    }
    if letters.iter().all(|c| c.is_uppercase()) {
        return replacement.to_uppercase();
    }
    if letters.iter().all(|c| c.is_lowercase()) {
        return replacement.to_lowercase();
    }
    if original.split_whitespace().all(is_title_word) {
        return title_case(replacement);
    }
    replacement.to_string()
}

fn is_title_word(word: &str) -> bool {
    let mut letters = word.chars().filter(|c| c.is_alphabetic());
    match letters.next() {
        None => true,
        Some(first) => first.is_uppercase() && letters.all(|c| c.is_lowercase()),
    }
}

/// Uppercase the first letter of every alphabetic run and lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

/// Compose decomposed sequences (`e` + U+0301 becomes `é`) so each visible
/// character maps to a single glyph lookup.
pub fn compose_text(text: &str) -> String {
    text.nfc().collect()
}

/// Whether `replacement` uses any character absent from `original`.
pub fn introduces_new_chars(original: &str, replacement: &str) -> bool {
    replacement.chars().any(|c| !original.contains(c))
}

/// Replace every case-insensitive occurrence of `find` in `text`.
pub fn replace_case_insensitive(text: &str, find: &str, replacement: &str) -> String {
    if text.is_empty() || find.is_empty() {
        return text.to_string();
    }
    match RegexBuilder::new(&regex::escape(find))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re
            .replace_all(text, regex::NoExpand(replacement))
            .into_owned(),
        Err(_) => text.replace(find, replacement),
    }
}
