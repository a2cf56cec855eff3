//! Failure trace log.
//! The host never sees our errors, so fatal failures leave a timestamped
//! trace in debug_log.txt next to the file being converted. Logging is
//! best effort: a log that can't be written must not take the run down
//! with it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use time;

const LOG_FILE: &str = "debug_log.txt";

/// The log sits beside the file being converted; with no file in play
/// (bad usage, stream mode) it lands in the working directory.
fn log_path(target: Option<&Path>) -> PathBuf {
    match target.and_then(|path| path.parent()) {
        Some(dir) if dir.as_os_str().len() > 0 => dir.join(LOG_FILE),
        _ => PathBuf::from(LOG_FILE),
    }
}

/// Append one timestamped line to the trace log.
pub fn record(target: Option<&Path>, message: &str) {
    let line = format!("{} {}\n", time::now().rfc3339(), message);

    let opened = OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_path(target));

    if let Ok(mut file) = opened {
        let _ = file.write_all(line.as_bytes());
    }
}
