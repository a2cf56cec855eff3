use std::env;
use std::io::{self, Read};
use std::path::Path;
use std::process;

extern crate regex;
#[macro_use]
extern crate lazy_static;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate time;

mod classify;
mod config;
mod jamo;
mod logging;
mod rewrite;
mod ust;


/// Get STDIN as a string.
fn get_stdin() -> Result<String, ust::Fatal> {
    let mut buffer = String::new();

    match io::stdin().read_to_string(&mut buffer) {
        Ok(_) => Ok(buffer),
        Err(e) => Err(ust::Fatal::Io(Path::new("<stdin>").to_path_buf(), e)),
    }
}

/// Convert a note stream file in place: read it whole, rewrite, then
/// atomically replace it. On failure the file is left untouched, the
/// trace goes to the debug log, and nothing unwinds past here.
fn main_convert(args: &[String]) -> i32 {
    let (path_arg, flag_args) = match args.split_first() {
        Some(split) => split,
        None => {
            eprintln!("convert needs a note stream file");
            return 2;
        }
    };

    let options = match config::from_args(flag_args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("hangultool: {}", e);
            return 2;
        }
    };

    let path = Path::new(path_arg);
    match convert_file(path, &options) {
        Ok(count) => {
            eprintln!("Wrote {} notes to {}", count, path.display());
            0
        }
        Err(e) => {
            logging::record(Some(path), &format!("fatal: {}", e));
            eprintln!("hangultool: {}", e);
            1
        }
    }
}

fn convert_file(path: &Path, options: &rewrite::Options) -> Result<usize, ust::Fatal> {
    let notes = ust::read_notes(path)?;
    let converted = rewrite::rewrite(notes, options);
    ust::write_notes(path, &converted)?;
    Ok(converted.len())
}

/// Convert a note stream from STDIN to STDOUT.
fn main_pipe(args: &[String]) -> i32 {
    let options = match config::from_args(args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("hangultool: {}", e);
            return 2;
        }
    };

    match get_stdin() {
        Ok(content) => {
            let converted = rewrite::rewrite(ust::parse(&content), &options);
            print!("{}", ust::render(&converted));
            0
        }
        Err(e) => {
            logging::record(None, &format!("fatal: {}", e));
            eprintln!("hangultool: {}", e);
            1
        }
    }
}

fn main_unrecognised() -> i32 {
    eprintln!(
        "Unrecognised command. Try:
 - convert <file> [--split] [--no-merge] [--no-sustain] [--config <file>]
 - pipe [options] < input > output"
    );
    2
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let status = match args.split_first() {
        Some((command, rest)) => match command.as_ref() {
            "convert" => main_convert(rest),
            "pipe" => main_pipe(rest),
            _ => main_unrecognised(),
        },
        None => main_unrecognised(),
    };

    process::exit(status);
}
