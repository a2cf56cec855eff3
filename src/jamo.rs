//! Jamo tables and syllable composition.
//! Maps romanised onset/nucleus/coda spellings to the slot indices of the
//! precomposed Hangul syllable block range, and assembles code points from
//! them. Pure data and pure functions; the tables never change after start.

/// Origin of the precomposed Hangul syllable block range.
pub const BASE_CODE: u32 = 0xAC00;

/// Nucleus slots per onset in the syllable block numbering.
const NUCLEUS_COUNT: u32 = 21;

/// Coda slots per nucleus.
const CODA_COUNT: u32 = 28;

/// The silent onset ㅇ, used for vowel-initial syllables.
const NULL_ONSET_INDEX: u32 = 11;

/// Onset spellings → leading consonant slot.
/// Several spellings are synonyms on purpose (voicing pairs like g/k for
/// the tensed consonants, r/l) and share a slot.
pub const ONSETS: &[(&str, u32)] = &[
    ("kk", 1),
    ("gg", 1),
    ("g", 0),
    ("k", 15),
    ("n", 2),
    ("d", 3),
    ("tt", 4),
    ("dd", 4),
    ("t", 16),
    ("r", 5),
    ("l", 5),
    ("m", 6),
    ("b", 7),
    ("pp", 8),
    ("bb", 8),
    ("p", 17),
    ("ss", 10),
    ("s", 9),
    ("j", 12),
    ("jj", 13),
    ("ch", 14),
    ("c", 14),
    ("z", 12),
    ("h", 18),
    ("", NULL_ONSET_INDEX),
];

/// Nucleus spellings → vowel slot.
pub const NUCLEI: &[(&str, u32)] = &[
    ("yae", 3),
    ("yeo", 6),
    ("wae", 10),
    ("woe", 11),
    ("wuo", 14),
    ("we", 15),
    ("wi", 16),
    ("ui", 19),
    ("a", 0),
    ("ae", 1),
    ("ya", 2),
    ("eo", 4),
    ("e", 5),
    ("ye", 7),
    ("o", 8),
    ("wa", 9),
    ("yo", 12),
    ("u", 13),
    ("woo", 13),
    ("wo", 14),
    ("yu", 17),
    ("eu", 18),
    ("i", 20),
    ("y", 20),
];

/// Coda spellings → trailing consonant slot. The empty spelling is the
/// open syllable.
pub const CODAS: &[(&str, u32)] = &[
    ("", 0),
    ("kk", 2),
    ("ks", 3),
    ("nc", 5),
    ("nh", 6),
    ("lk", 9),
    ("lm", 10),
    ("lb", 11),
    ("ls", 12),
    ("lt", 13),
    ("lp", 14),
    ("lh", 15),
    ("bs", 18),
    ("ss", 20),
    ("ng", 21),
    ("g", 1),
    ("k", 1),
    ("n", 4),
    ("d", 7),
    ("t", 7),
    ("r", 8),
    ("l", 8),
    ("m", 16),
    ("b", 17),
    ("p", 17),
    ("s", 19),
    ("j", 22),
    ("ch", 23),
    ("z", 22),
    ("h", 27),
];

lazy_static! {
    /// Onset spellings ordered for greedy matching, longest first.
    static ref ONSETS_BY_LENGTH: Vec<(&'static str, u32)> = sort_longest_first(ONSETS);

    /// Nucleus spellings ordered for greedy matching, longest first.
    static ref NUCLEI_BY_LENGTH: Vec<(&'static str, u32)> = sort_longest_first(NUCLEI);
}

/// Sort a table for longest-match-first search. Ties are broken
/// alphabetically so the order is deterministic, although the tables
/// contain no equal-length spellings that prefix the same input.
fn sort_longest_first(table: &'static [(&'static str, u32)]) -> Vec<(&'static str, u32)> {
    let mut sorted = table.to_vec();
    sorted.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    sorted
}

/// The longest non-empty onset spelling `text` starts with.
pub fn longest_onset_prefix(text: &str) -> Option<(&'static str, u32)> {
    for &(key, index) in ONSETS_BY_LENGTH.iter() {
        if !key.is_empty() && text.starts_with(key) {
            return Some((key, index));
        }
    }
    None
}

/// The longest nucleus spelling `text` starts with.
pub fn longest_nucleus_prefix(text: &str) -> Option<(&'static str, u32)> {
    for &(key, index) in NUCLEI_BY_LENGTH.iter() {
        if text.starts_with(key) {
            return Some((key, index));
        }
    }
    None
}

/// Exact-match nucleus lookup.
pub fn nucleus_slot(text: &str) -> Option<u32> {
    for &(key, index) in NUCLEI.iter() {
        if key == text {
            return Some(index);
        }
    }
    None
}

/// Exact-match coda lookup, including the empty spelling.
pub fn coda_slot(text: &str) -> Option<u32> {
    for &(key, index) in CODAS.iter() {
        if key == text {
            return Some(index);
        }
    }
    None
}

/// Decompose a cleaned lowercase string into (onset, nucleus, coda) and
/// assemble the Hangul code point. None when the string is not exactly one
/// syllable; the caller decides what to do with that.
pub fn decode_syllable(text: &str) -> Option<char> {
    if text.is_empty() {
        return None;
    }

    // A vowel-initial syllable takes the silent ㅇ onset.
    let (onset_index, onset_length) = if longest_nucleus_prefix(text).is_some() {
        (NULL_ONSET_INDEX, 0)
    } else {
        // Longest onset first, but it only counts if a nucleus follows.
        let mut found = None;
        for &(key, index) in ONSETS_BY_LENGTH.iter() {
            if key.is_empty() || !text.starts_with(key) {
                continue;
            }
            if longest_nucleus_prefix(&text[key.len()..]).is_some() {
                found = Some((index, key.len()));
                break;
            }
        }
        match found {
            Some(onset) => onset,
            None => return None,
        }
    };

    let rest = &text[onset_length..];
    let (nucleus_key, nucleus_index) = longest_nucleus_prefix(rest)?;

    // Whatever remains must be exactly one coda spelling ("" included).
    let coda_index = coda_slot(&rest[nucleus_key.len()..])?;

    ::std::char::from_u32(
        BASE_CODE + (onset_index * NUCLEUS_COUNT + nucleus_index) * CODA_COUNT + coda_index,
    )
}
