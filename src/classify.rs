//! Lyric classification.
//! Decides what kind of note a raw lyric denotes (already Hangul, breath,
//! bare consonant, held vowel, convertible syllable) before the rewriter
//! picks a rule for it. Everything here is a pure function of the text.

use jamo;
use regex::Regex;

lazy_static! {
    /// Everything that is not a letter.
    static ref NON_ALPHA: Regex = Regex::new(r"[^a-zA-Z]").unwrap();

    /// Everything that is not a letter or whitespace.
    static ref NON_ALPHA_SPACE: Regex = Regex::new(r"[^a-zA-Z\s]").unwrap();
}

/// Letters only, lowercased. "- Na" -> "na".
pub fn clean(lyric: &str) -> String {
    NON_ALPHA.replace_all(lyric, "").to_lowercase()
}

/// Letters and whitespace, lowercased. Used where token boundaries matter.
pub fn clean_keep_spaces(lyric: &str) -> String {
    NON_ALPHA_SPACE.replace_all(lyric, "").to_lowercase()
}

/// The lyric already starts inside (or beyond) the Hangul syllable block.
pub fn is_hangul(lyric: &str) -> bool {
    match lyric.chars().next() {
        Some(first) => first as u32 >= jamo::BASE_CODE,
        None => false,
    }
}

/// Breath or aside notes: the uppercase R/H markers, or anything spelled
/// with "bre". These are never converted.
pub fn is_breath(lyric: &str) -> bool {
    lyric.contains('R') || lyric.contains('H') || lyric.to_lowercase().contains("bre")
}

/// The note carries only consonant sounds ("- n", "k", "n m"): nothing in
/// the cleaned text spells a nucleus.
pub fn is_consonant_only(lyric: &str) -> bool {
    let cleaned = clean(lyric);
    if cleaned.is_empty() {
        return false;
    }

    for &(key, _) in jamo::NUCLEI.iter() {
        if cleaned.contains(key) {
            return false;
        }
    }
    true
}

/// A held vowel written out ("o o", "wa a"): the last token is exactly a
/// nucleus spelling and the token before it already ends with it, so the
/// note continues a sound rather than starting one.
pub fn is_vowel_sustain(lyric: &str) -> bool {
    let cleaned = clean_keep_spaces(lyric);
    if cleaned.contains("bre") {
        return false;
    }

    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    if parts.len() < 2 {
        return false;
    }

    let previous = parts[parts.len() - 2];
    let current = parts[parts.len() - 1];

    jamo::nucleus_slot(current).is_some() && previous.ends_with(current)
}

/// The longest onset spelling at the start of the cleaned lyric.
/// "- na" -> "n", "chwa" -> "ch".
pub fn leading_consonant(lyric: &str) -> Option<&'static str> {
    let cleaned = clean(lyric);
    jamo::longest_onset_prefix(&cleaned).map(|(key, _)| key)
}

/// Best-effort conversion of a whole lyric to one Hangul syllable.
///
/// Breath notes never convert. A lone sustain marker is already final.
/// Multi-token lyrics ("- na", "u na") usually carry the real syllable in
/// the last token, so that is tried alone before the full cleaned text.
pub fn smart_parse(lyric: &str) -> Option<String> {
    if lyric.to_lowercase().contains("bre") {
        return None;
    }
    if lyric == "+" {
        return Some("+".to_string());
    }

    let parts: Vec<&str> = lyric.split_whitespace().collect();
    if parts.len() > 1 {
        if let Some(syllable) = jamo::decode_syllable(&clean(parts[parts.len() - 1])) {
            return Some(syllable.to_string());
        }
    }

    jamo::decode_syllable(&clean(lyric)).map(|syllable| syllable.to_string())
}
