//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands,
//! visible or hidden (via `.hide(true)`).

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Pattern file (positional).
pub fn pattern_path_arg() -> Arg {
    Arg::new("pattern_path")
        .value_name("PATTERN")
        .value_parser(value_parser!(PathBuf))
        .help("Pattern file, or - for stdin")
}

/// Inline pattern text (-p/--pattern).
pub fn pattern_text_arg() -> Arg {
    Arg::new("pattern_text")
        .short('p')
        .long("pattern")
        .value_name("TEXT")
        .help("Inline pattern text")
}

/// Binary input file (positional).
pub fn data_path_arg() -> Arg {
    Arg::new("data_path")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Binary input file, or - for stdin")
}

/// Inline hex input (-x/--hex).
pub fn hex_arg() -> Arg {
    Arg::new("hex")
        .short('x')
        .long("hex")
        .value_name("HEX")
        .help("Inline input bytes as hex (whitespace is ignored)")
}

/// JSON values to encode (-j/--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .short('j')
        .long("json")
        .value_name("JSON")
        .help("JSON array of values to encode")
}

/// JSON values file (positional, encode only).
pub fn json_path_arg() -> Arg {
    Arg::new("json_path")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("File holding a JSON array of values, or - for stdin")
}

/// Write output to file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write the raw bytes to a file instead of printing hex")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Allow unread trailing bits (--no-eof-check).
pub fn no_eof_check_arg() -> Arg {
    Arg::new("no_eof_check")
        .long("no-eof-check")
        .action(ArgAction::SetTrue)
        .help("Accept input with unread bits after the pattern ends")
}

/// Output compact JSON (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Output compact JSON (default: pretty when stdout is a TTY)")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Verbosity level (-v for verbose, -vv for very verbose)")
}

/// Skip the values after a trace (--no-result).
pub fn no_result_arg() -> Arg {
    Arg::new("no_result")
        .long("no-result")
        .action(ArgAction::SetTrue)
        .help("Print the trace only")
}

/// Instruction limit (--max-steps).
pub fn max_steps_arg() -> Arg {
    Arg::new("max_steps")
        .long("max-steps")
        .value_name("N")
        .default_value("1000000")
        .value_parser(value_parser!(usize))
        .help("Maximum number of executed instructions")
}
