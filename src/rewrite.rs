//! Note stream rewriting.
//! The one forward pass over the note list that decides, per note, whether
//! to merge it with a neighbour, split it in two, mark it as a sustain, or
//! convert its lyric in place. All cross-note decisions live here; the
//! classifier and decoder stay pure.

use std::cmp;

use classify;
use jamo;
use ust::Note;

/// The lyric that means "keep sounding the previous syllable".
pub const SUSTAIN: &str = "+";

/// Notes shorter than this never split.
const MIN_SPLIT_LENGTH: i64 = 10;

/// Longest consonant note a split may carve off.
const MAX_CONSONANT_LENGTH: i64 = 60;

/// Identifier suffix for the consonant half of a split.
const SPLIT_SUFFIX: &str = "_split_c";

/// Feature switches for one conversion run. Fixed before processing
/// starts; the rewriter never re-reads them mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub merge_forward: bool,
    pub split_start: bool,
    pub sustain_to_marker: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            merge_forward: true,
            split_start: false,
            sustain_to_marker: true,
        }
    }
}

/// Rewrite the note stream.
///
/// One pass, strict rule priority per note:
/// 1. Hangul and breath notes pass through untouched.
/// 2. A split (when enabled) reshapes the current note and emits the
///    consonant half, then falls through to the rules below.
/// 3. Consonant-only notes merge forward into the next note or backward
///    into the last emitted one.
/// 4. Written-out held vowels become the sustain marker.
/// 5. Everything else gets a best-effort conversion; failure leaves the
///    lyric untouched.
///
/// The cursor may consume one or two input notes per step and the output
/// may end up longer or shorter than the input. Nothing is ever silently
/// dropped: every input note's duration ends up in some emitted note.
pub fn rewrite(mut notes: Vec<Note>, options: &Options) -> Vec<Note> {
    let mut output: Vec<Note> = Vec::with_capacity(notes.len());

    let mut i = 0;
    while i < notes.len() {
        let mut curr = notes[i].clone();

        // Already converted, or a breath/aside: hands off entirely.
        if !curr.lyric.is_empty()
            && (classify::is_hangul(&curr.lyric) || classify::is_breath(&curr.lyric))
        {
            output.push(curr);
            i += 1;
            continue;
        }

        // Start-consonant split: "- na" (or the written-out "-n na")
        // becomes a short consonant note plus the remaining vowel note.
        // The vowel half stays in `curr` and continues through the rules
        // below within this same step.
        if options.split_start
            && curr.lyric.trim().starts_with('-')
            && !classify::is_consonant_only(&curr.lyric)
            && curr.length >= MIN_SPLIT_LENGTH
        {
            if let Some((consonant, vowel_text)) = split_targets(&curr.lyric) {
                let consonant_length = cmp::min(MAX_CONSONANT_LENGTH, curr.length / 2);
                if consonant_length > 0 {
                    let mut head = curr.clone_with_suffix(SPLIT_SUFFIX);
                    head.lyric = format!("- {}", consonant);
                    head.length = consonant_length;
                    output.push(head);

                    curr.length -= consonant_length;
                    curr.lyric = vowel_text;
                }
            }
        }

        if classify::is_consonant_only(&curr.lyric) {
            // Forward merge: "- n" plus "na" is one syllable, "나".
            if options.merge_forward
                && curr.lyric.trim().starts_with('-')
                && i + 1 < notes.len()
                && !classify::is_breath(&notes[i + 1].lyric)
            {
                if let Some(merged) = merge_forward(&curr.lyric, &notes[i + 1].lyric) {
                    if curr.note_num == notes[i + 1].note_num {
                        // Same pitch: the pair collapses into one note.
                        curr.lyric = merged;
                        curr.length += notes[i + 1].length;
                        output.push(curr);
                        i += 2;
                        continue;
                    } else {
                        // Pitch change: keep both notes, but the second
                        // one only sustains the merged syllable. It will
                        // be visited next step with its lyric already
                        // final.
                        curr.lyric = merged;
                        notes[i + 1].lyric = SUSTAIN.to_string();
                        output.push(curr);
                        i += 1;
                        continue;
                    }
                }
            }

            // Backward merge: a bare consonant extends whatever was just
            // emitted, or at worst holds its pitch as a sustain.
            if !curr.lyric.trim().starts_with('-') && !output.is_empty() {
                let last = output.len() - 1;
                if curr.note_num == output[last].note_num {
                    output[last].length += curr.length;
                } else {
                    curr.lyric = SUSTAIN.to_string();
                    output.push(curr);
                }
                i += 1;
                continue;
            }
        }

        // A written-out held vowel ("o o") only continues the sound.
        if options.sustain_to_marker && classify::is_vowel_sustain(&curr.lyric) {
            curr.lyric = SUSTAIN.to_string();
            output.push(curr);
            i += 1;
            continue;
        }

        // Default conversion. Failure is fine; the romanised text stays.
        if let Some(hangul) = classify::smart_parse(&curr.lyric) {
            curr.lyric = hangul;
        }
        output.push(curr);
        i += 1;
    }

    output
}

/// The consonant and vowel texts a splittable lyric divides into, if both
/// are present.
fn split_targets(lyric: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = lyric.trim().split_whitespace().collect();

    let (consonant, vowel) = if parts.len() >= 2 && parts[0].starts_with('-') && parts[0].len() > 1
    {
        // Already written out, e.g. "-n na".
        (classify::clean(parts[0]), classify::clean(parts[1]))
    } else {
        // Lumped together, e.g. "- na" or "-na". The whole cleaned text
        // stays as the vowel note's lyric; smart parse deals with the
        // leading consonant again when converting it.
        let consonant = match classify::leading_consonant(lyric) {
            Some(onset) => onset.to_string(),
            None => return None,
        };
        (consonant, classify::clean(lyric))
    };

    if consonant.is_empty() || vowel.is_empty() {
        return None;
    }
    Some((consonant, vowel))
}

/// Combine a detached consonant with the next note's syllable text.
/// Tried both ways: the next note may already spell the consonant
/// ("-n" then "na"), otherwise the consonant is prepended.
fn merge_forward(consonant_lyric: &str, next_lyric: &str) -> Option<String> {
    let consonant = classify::clean(consonant_lyric);
    let next = classify::clean(next_lyric);

    if next.starts_with(&consonant[..]) {
        if let Some(syllable) = jamo::decode_syllable(&next) {
            return Some(syllable.to_string());
        }
    }

    jamo::decode_syllable(&format!("{}{}", consonant, next)).map(|syllable| syllable.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ust;

    /// Build a minimal note list from (lyric, length, note_num) triples.
    fn notes(entries: &[(&str, i64, i64)]) -> Vec<Note> {
        let mut source = String::new();
        for (i, &(lyric, length, note_num)) in entries.iter().enumerate() {
            source.push_str(&format!(
                "[#{:04}]\nLyric={}\nLength={}\nNoteNum={}\n",
                i, lyric, length, note_num
            ));
        }
        ust::parse(&source)
    }

    fn lyrics(notes: &[Note]) -> Vec<String> {
        notes.iter().map(|n| n.lyric.clone()).collect()
    }

    #[test]
    fn default_conversion() {
        let output = rewrite(notes(&[("na", 480, 60), ("han", 480, 62)]), &Options::default());

        assert_eq!(lyrics(&output), vec!["나", "한"]);
        assert_eq!(output[0].length, 480, "Plain conversion keeps durations");
    }

    #[test]
    fn conversion_failure_preserves_text() {
        let output = rewrite(notes(&[("xyz123", 480, 60)]), &Options::default());

        assert_eq!(lyrics(&output), vec!["xyz123"]);
    }

    #[test]
    fn hangul_passes_through_byte_identical() {
        let input = notes(&[("나", 480, 60)]);
        let output = rewrite(input.clone(), &Options::default());

        assert_eq!(output, input);
    }

    #[test]
    fn breath_notes_are_never_touched() {
        let all_on = Options {
            merge_forward: true,
            split_start: true,
            sustain_to_marker: true,
        };
        let input = notes(&[("Bre", 480, 60), ("R", 480, 60), ("- haH", 480, 60)]);
        let output = rewrite(input.clone(), &all_on);

        assert_eq!(output, input);
    }

    #[test]
    fn forward_merge_same_pitch_consumes_next() {
        let output = rewrite(
            notes(&[("- n", 100, 60), ("na", 200, 60)]),
            &Options::default(),
        );

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].lyric, "나");
        assert_eq!(output[0].length, 300, "Durations fold together");
        assert_eq!(output[0].note_num, 60);
    }

    #[test]
    fn forward_merge_differing_pitch_marks_sustain() {
        let output = rewrite(
            notes(&[("- n", 100, 60), ("na", 200, 62)]),
            &Options::default(),
        );

        assert_eq!(lyrics(&output), vec!["나", "+"]);
        assert_eq!(output[0].length, 100);
        assert_eq!(output[1].length, 200);
        assert_eq!(output[1].note_num, 62);
    }

    #[test]
    fn forward_merge_skips_breath_neighbour() {
        let output = rewrite(
            notes(&[("- n", 100, 60), ("Bre", 200, 60)]),
            &Options::default(),
        );

        assert_eq!(lyrics(&output), vec!["- n", "Bre"]);
    }

    #[test]
    fn forward_merge_disabled_leaves_both() {
        let options = Options {
            merge_forward: false,
            ..Options::default()
        };
        let output = rewrite(notes(&[("- n", 100, 60), ("na", 200, 60)]), &options);

        assert_eq!(lyrics(&output), vec!["- n", "나"]);
    }

    /// The next note already spells its consonant: no doubling.
    #[test]
    fn forward_merge_consonant_already_written() {
        let output = rewrite(
            notes(&[("-n", 100, 60), ("na", 200, 60)]),
            &Options::default(),
        );

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].lyric, "나");
    }

    #[test]
    fn backward_merge_same_pitch_extends_previous() {
        let output = rewrite(
            notes(&[("na", 100, 60), ("n", 50, 60)]),
            &Options::default(),
        );

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].lyric, "나");
        assert_eq!(output[0].length, 150);
    }

    #[test]
    fn backward_merge_differing_pitch_becomes_sustain() {
        let output = rewrite(
            notes(&[("na", 100, 60), ("n", 50, 62)]),
            &Options::default(),
        );

        assert_eq!(lyrics(&output), vec!["나", "+"]);
        assert_eq!(output[1].length, 50);
    }

    /// Backward merge is not gated on the merge flag.
    #[test]
    fn backward_merge_ignores_merge_flag() {
        let options = Options {
            merge_forward: false,
            ..Options::default()
        };
        let output = rewrite(notes(&[("na", 100, 60), ("n", 50, 60)]), &options);

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].length, 150);
    }

    #[test]
    fn vowel_sustain_becomes_marker() {
        let output = rewrite(
            notes(&[("o", 480, 60), ("o o", 480, 60)]),
            &Options::default(),
        );

        assert_eq!(lyrics(&output), vec!["오", "+"]);
    }

    #[test]
    fn vowel_sustain_disabled_converts_instead() {
        let options = Options {
            sustain_to_marker: false,
            ..Options::default()
        };
        let output = rewrite(notes(&[("o", 480, 60), ("o o", 480, 60)]), &options);

        assert_eq!(lyrics(&output), vec!["오", "오"]);
    }

    #[test]
    fn split_start_carves_a_consonant_note() {
        let options = Options {
            split_start: true,
            ..Options::default()
        };
        let output = rewrite(notes(&[("- na", 40, 60)]), &options);

        assert_eq!(lyrics(&output), vec!["- n", "나"]);
        assert_eq!(output[0].length, 20);
        assert_eq!(output[1].length, 20);
        assert_eq!(output[0].id, "0000_split_c", "Split artifact is marked");
        assert_eq!(output[1].id, "0000");
    }

    #[test]
    fn split_start_caps_the_consonant_length() {
        let options = Options {
            split_start: true,
            ..Options::default()
        };
        let output = rewrite(notes(&[("- na", 480, 60)]), &options);

        assert_eq!(output[0].length, 60, "Consonant half is capped");
        assert_eq!(output[1].length, 420);
    }

    #[test]
    fn split_start_keeps_written_out_consonant() {
        let options = Options {
            split_start: true,
            ..Options::default()
        };
        let output = rewrite(notes(&[("-n na", 100, 60)]), &options);

        assert_eq!(lyrics(&output), vec!["- n", "나"]);
        assert_eq!(output[0].length, 50);
        assert_eq!(output[1].length, 50);
    }

    #[test]
    fn split_start_skips_short_and_consonant_only_notes() {
        let options = Options {
            split_start: true,
            ..Options::default()
        };

        let output = rewrite(notes(&[("- na", 8, 60)]), &options);
        assert_eq!(lyrics(&output), vec!["나"], "Too short to split");

        let output = rewrite(notes(&[("- n", 100, 60)]), &options);
        assert_eq!(
            lyrics(&output),
            vec!["- n"],
            "Bare consonants are the merge rules' business"
        );
    }

    #[test]
    fn split_disabled_converts_in_one_note() {
        let output = rewrite(notes(&[("- na", 40, 60)]), &Options::default());

        assert_eq!(lyrics(&output), vec!["나"]);
        assert_eq!(output[0].length, 40);
    }

    /// A zero-length note is still emitted in order, never dropped.
    #[test]
    fn zero_length_notes_are_emitted() {
        let output = rewrite(notes(&[("n", 0, 60), ("na", 480, 62)]), &Options::default());

        assert_eq!(lyrics(&output), vec!["n", "나"]);
        assert_eq!(output[0].length, 0);
    }

    /// The "+" planted on the next note by a differing-pitch forward
    /// merge survives its own visit unchanged.
    #[test]
    fn planted_sustain_marker_is_stable() {
        let output = rewrite(
            notes(&[("- n", 100, 60), ("na", 200, 62), ("ga", 300, 62)]),
            &Options::default(),
        );

        assert_eq!(lyrics(&output), vec!["나", "+", "가"]);
    }
}
