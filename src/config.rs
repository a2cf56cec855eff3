//! Feature flag configuration.
//! Defaults first, then an optional JSON config file, then command line
//! switches, each layer overriding the one before it. The result is fixed
//! for the whole run.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json;

use rewrite::Options;
use ust::Fatal;

/// Resolve the options for a run from the trailing command line
/// arguments. `--config <file>` loads a JSON options document; the
/// boolean switches then override individual flags.
pub fn from_args(args: &[String]) -> Result<Options, Fatal> {
    let mut options = Options::default();

    // The config file layer goes first regardless of switch order.
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            match iter.next() {
                Some(path) => options = load_file(Path::new(path))?,
                None => {
                    return Err(Fatal::Usage("--config needs a file argument".to_string()));
                }
            }
        }
    }

    let mut skip_value = false;
    for arg in args.iter() {
        if skip_value {
            skip_value = false;
            continue;
        }

        match arg.as_ref() {
            "--config" => skip_value = true,
            "--merge" => options.merge_forward = true,
            "--no-merge" => options.merge_forward = false,
            "--split" => options.split_start = true,
            "--no-split" => options.split_start = false,
            "--sustain" => options.sustain_to_marker = true,
            "--no-sustain" => options.sustain_to_marker = false,
            other => {
                return Err(Fatal::Usage(format!("unrecognised option: {}", other)));
            }
        }
    }

    Ok(options)
}

/// Load an options document. Fields absent from the file keep their
/// defaults; a file that exists but doesn't parse is fatal.
pub fn load_file(path: &Path) -> Result<Options, Fatal> {
    let mut content = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut content))
        .map_err(|e| Fatal::Io(path.to_path_buf(), e))?;

    serde_json::from_str(&content)
        .map_err(|e| Fatal::BadConfig(PathBuf::from(path), e.to_string()))
}
