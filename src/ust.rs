//! Note records.
//! Read a stream of record blocks (the UST-style format the host hands
//! us), carry them through the rewrite as `Note` values, and write the
//! same shape back out. Unrecognised fields ride along untouched and in
//! their original order.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Default duration for records without a usable Length field.
const DEFAULT_LENGTH: i64 = 480;

/// Default pitch for records without a usable NoteNum field.
const DEFAULT_NOTE_NUM: i64 = 60;

/// An error that aborts the whole run. Recoverable conditions
/// (undecodable lyrics, merge misses, malformed record lines) are handled
/// where they occur and never surface here.
#[derive(Debug)]
pub enum Fatal {
    /// I/O failure, with the path that was being touched.
    Io(PathBuf, io::Error),

    /// A config file that exists but doesn't parse.
    BadConfig(PathBuf, String),

    /// Unusable command line.
    Usage(String),
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &Fatal::Io(ref path, ref e) => write!(f, "{}: {}", path.display(), e),
            &Fatal::BadConfig(ref path, ref message) => {
                write!(f, "bad config {}: {}", path.display(), message)
            }
            &Fatal::Usage(ref message) => write!(f, "{}", message),
        }
    }
}

/// One record block from the note stream.
///
/// `fields` keeps every key/value pair in arrival order. `lyric`,
/// `length` and `note_num` are typed copies of the recognised fields;
/// rendering writes them back over their original positions, so a field
/// the record never had is never invented for it either.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub lyric: String,
    pub length: i64,
    pub note_num: i64,
    fields: Vec<(String, String)>,
}

impl Note {
    pub fn new(id: String, fields: Vec<(String, String)>) -> Note {
        let mut lyric = String::new();
        let mut length = DEFAULT_LENGTH;
        let mut note_num = DEFAULT_NOTE_NUM;

        for &(ref key, ref value) in fields.iter() {
            match key.as_ref() {
                "Lyric" => lyric = value.clone(),
                "Length" => length = value.parse().unwrap_or(DEFAULT_LENGTH),
                "NoteNum" => note_num = value.parse().unwrap_or(DEFAULT_NOTE_NUM),
                _ => (),
            }
        }

        Note {
            id,
            lyric,
            length,
            note_num,
            fields,
        }
    }

    /// Duplicate this note, marking the copy's identifier so split
    /// artifacts stay traceable. The copy is fully independent.
    pub fn clone_with_suffix(&self, suffix: &str) -> Note {
        let mut copy = self.clone();
        copy.id = format!("{}{}", self.id, suffix);
        copy
    }

    /// Render back to record-block lines, preserving field order.
    pub fn render(&self) -> String {
        let mut lines = vec![format!("[#{}]", self.id)];

        for &(ref key, ref value) in self.fields.iter() {
            match key.as_ref() {
                "Lyric" => lines.push(format!("Lyric={}", self.lyric)),
                "Length" => lines.push(format!("Length={}", self.length)),
                "NoteNum" => lines.push(format!("NoteNum={}", self.note_num)),
                _ => lines.push(format!("{}={}", key, value)),
            }
        }

        lines.join("\n")
    }
}

/// Parse record blocks out of the raw text.
///
/// A block starts at a `[#id]` header line; `key=value` lines fill it.
/// Anything else (including key/value lines before the first header) is a
/// malformed line and is skipped without taking its record down.
pub fn parse(content: &str) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_fields: Vec<(String, String)> = Vec::new();

    for raw_line in content.lines() {
        let line = raw_line.trim();

        if line.starts_with("[#") && line.ends_with("]") {
            if let Some(id) = current_id.take() {
                notes.push(Note::new(id, current_fields));
                current_fields = Vec::new();
            }
            current_id = Some(line[2..line.len() - 1].to_string());
        } else if current_id.is_some() {
            if let Some(eq) = line.find('=') {
                let key = line[..eq].to_string();
                let value = line[eq + 1..].to_string();
                current_fields.push((key, value));
            }
        }
    }

    if let Some(id) = current_id {
        notes.push(Note::new(id, current_fields));
    }

    notes
}

/// Render a whole stream, one block per record, trailing newline.
pub fn render(notes: &[Note]) -> String {
    let mut out = String::new();
    for note in notes.iter() {
        out.push_str(&note.render());
        out.push('\n');
    }
    out
}

/// Read the note stream from a file. The host writes UTF-8 with a BOM;
/// the BOM is stripped and undecodable bytes are replaced, not fatal.
pub fn read_notes(path: &Path) -> Result<Vec<Note>, Fatal> {
    let mut buffer = Vec::new();
    {
        let mut file = File::open(path).map_err(|e| Fatal::Io(path.to_path_buf(), e))?;
        file.read_to_end(&mut buffer)
            .map_err(|e| Fatal::Io(path.to_path_buf(), e))?;
    }

    let content = String::from_utf8_lossy(&buffer).into_owned();
    let content = if content.starts_with('\u{feff}') {
        &content[3..]
    } else {
        &content[..]
    };

    Ok(parse(content))
}

/// Render everything and atomically replace `path`: the full output goes
/// to a sibling temporary file which is then renamed over the original.
/// A failure anywhere leaves the input exactly as it was.
pub fn write_notes(path: &Path, notes: &[Note]) -> Result<(), Fatal> {
    // The host reads the result back as utf-8-sig, so lead with a BOM.
    let mut out = String::from("\u{feff}");
    out.push_str(&render(notes));

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".swap");
    let tmp = PathBuf::from(tmp_name);

    let written = File::create(&tmp)
        .and_then(|mut file| file.write_all(out.as_bytes()))
        .map_err(|e| Fatal::Io(tmp.clone(), e));

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| Fatal::Io(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = "[#0001]
Lyric=na
Length=240
NoteNum=64
Velocity=100
";

    #[test]
    fn parse_single_record() {
        let notes = parse(SINGLE);

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, "0001");
        assert_eq!(notes[0].lyric, "na");
        assert_eq!(notes[0].length, 240);
        assert_eq!(notes[0].note_num, 64);
    }

    #[test]
    fn defaults_when_fields_missing_or_bad() {
        let notes = parse("[#SETTING]\nTempo=120\n[#0000]\nLyric=a\nLength=oops\n");

        assert_eq!(notes[0].length, 480, "Missing Length defaults");
        assert_eq!(notes[0].note_num, 60, "Missing NoteNum defaults");
        assert_eq!(notes[0].lyric, "", "Missing Lyric is empty");
        assert_eq!(notes[1].length, 480, "Unparseable Length defaults");
    }

    #[test]
    fn render_round_trip_preserves_field_order() {
        let rendered = render(&parse(SINGLE));
        assert_eq!(rendered, SINGLE);
    }

    #[test]
    fn render_reflects_mutations_in_place() {
        let mut notes = parse(SINGLE);
        notes[0].lyric = "나".to_string();
        notes[0].length = 300;

        assert_eq!(
            notes[0].render(),
            "[#0001]\nLyric=나\nLength=300\nNoteNum=64\nVelocity=100"
        );
    }

    /// A record that never had a Lyric line doesn't grow one.
    #[test]
    fn render_never_invents_fields() {
        let notes = parse("[#PREV]\nTempo=120\n");
        assert_eq!(notes[0].render(), "[#PREV]\nTempo=120");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let notes = parse("stray line\nLyric=lost\n[#0000]\nLyric=na\ngarbage without equals\n");

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].lyric, "na");
        assert_eq!(notes[0].render(), "[#0000]\nLyric=na");
    }

    #[test]
    fn clone_with_suffix_marks_the_copy() {
        let notes = parse(SINGLE);
        let copy = notes[0].clone_with_suffix("_split_c");

        assert_eq!(copy.id, "0001_split_c");
        assert_eq!(copy.lyric, notes[0].lyric);
        assert_eq!(copy.length, notes[0].length);
    }
}
