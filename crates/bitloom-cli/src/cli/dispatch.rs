//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs populated from clap, ignoring hidden flags
//! - `Into<*Args>` impls that bridge dispatch to the command handlers
//! - Positional shifting (`-p` moves the first positional to the input slot)

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::decode::DecodeArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::encode::EncodeArgs;
use crate::commands::trace::TraceArgs;

const DEFAULT_MAX_STEPS: usize = 1_000_000;

pub struct DecodeParams {
    pub pattern_path: Option<PathBuf>,
    pub pattern_text: Option<String>,
    pub data_path: Option<PathBuf>,
    pub hex: Option<String>,
    pub check_eof: bool,
    pub max_steps: usize,
    pub compact: bool,
    pub color: ColorChoice,
    // Note: verbose, no_result are parsed but not extracted
}

impl DecodeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let pattern_text = m.get_one::<String>("pattern_text").cloned();
        let (pattern_path, data_path) = shift_positional_to_input(
            pattern_text.is_some(),
            m.get_one::<PathBuf>("pattern_path").cloned(),
            m.get_one::<PathBuf>("data_path").cloned(),
        );

        Self {
            pattern_path,
            pattern_text,
            data_path,
            hex: m.get_one::<String>("hex").cloned(),
            check_eof: !m.get_flag("no_eof_check"),
            max_steps: parse_max_steps(m),
            compact: m.get_flag("compact"),
            color: parse_color(m),
        }
    }
}

impl From<DecodeParams> for DecodeArgs {
    fn from(p: DecodeParams) -> Self {
        // Pretty by default when stdout is a TTY, unless --compact is passed
        let pretty = !p.compact && std::io::IsTerminal::is_terminal(&std::io::stdout());

        Self {
            pattern_path: p.pattern_path,
            pattern_text: p.pattern_text,
            data_path: p.data_path,
            hex: p.hex,
            check_eof: p.check_eof,
            max_steps: p.max_steps,
            pretty,
            color: p.color.should_colorize(),
        }
    }
}

pub struct EncodeParams {
    pub pattern_path: Option<PathBuf>,
    pub pattern_text: Option<String>,
    pub json_path: Option<PathBuf>,
    pub json: Option<String>,
    pub output: Option<PathBuf>,
    pub max_steps: usize,
    pub color: ColorChoice,
}

impl EncodeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let pattern_text = m.get_one::<String>("pattern_text").cloned();
        let (pattern_path, json_path) = shift_positional_to_input(
            pattern_text.is_some(),
            m.get_one::<PathBuf>("pattern_path").cloned(),
            m.get_one::<PathBuf>("json_path").cloned(),
        );

        Self {
            pattern_path,
            pattern_text,
            json_path,
            json: m.get_one::<String>("json").cloned(),
            output: m.get_one::<PathBuf>("output").cloned(),
            max_steps: parse_max_steps(m),
            color: parse_color(m),
        }
    }
}

impl From<EncodeParams> for EncodeArgs {
    fn from(p: EncodeParams) -> Self {
        Self {
            pattern_path: p.pattern_path,
            pattern_text: p.pattern_text,
            json_path: p.json_path,
            json: p.json,
            output: p.output,
            max_steps: p.max_steps,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub pattern_path: Option<PathBuf>,
    pub pattern_text: Option<String>,
    pub color: ColorChoice,
    // Note: data_path, hex, run and trace flags are parsed but not extracted
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            pattern_path: m.get_one::<PathBuf>("pattern_path").cloned(),
            pattern_text: m.get_one::<String>("pattern_text").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            pattern_path: p.pattern_path,
            pattern_text: p.pattern_text,
            color: p.color.should_colorize(),
        }
    }
}

pub struct TraceParams {
    pub pattern_path: Option<PathBuf>,
    pub pattern_text: Option<String>,
    pub data_path: Option<PathBuf>,
    pub hex: Option<String>,
    pub verbose: u8,
    pub no_result: bool,
    pub check_eof: bool,
    pub max_steps: usize,
    pub color: ColorChoice,
}

impl TraceParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let pattern_text = m.get_one::<String>("pattern_text").cloned();
        let (pattern_path, data_path) = shift_positional_to_input(
            pattern_text.is_some(),
            m.get_one::<PathBuf>("pattern_path").cloned(),
            m.get_one::<PathBuf>("data_path").cloned(),
        );

        Self {
            pattern_path,
            pattern_text,
            data_path,
            hex: m.get_one::<String>("hex").cloned(),
            verbose: m.get_count("verbose"),
            no_result: m.get_flag("no_result"),
            check_eof: !m.get_flag("no_eof_check"),
            max_steps: parse_max_steps(m),
            color: parse_color(m),
        }
    }
}

impl From<TraceParams> for TraceArgs {
    fn from(p: TraceParams) -> Self {
        use bitloom::Verbosity;

        let verbosity = match p.verbose {
            0 => Verbosity::Default,
            1 => Verbosity::Verbose,
            _ => Verbosity::VeryVerbose,
        };

        Self {
            pattern_path: p.pattern_path,
            pattern_text: p.pattern_text,
            data_path: p.data_path,
            hex: p.hex,
            verbosity,
            no_result: p.no_result,
            check_eof: p.check_eof,
            max_steps: p.max_steps,
            color: p.color.should_colorize(),
        }
    }
}

/// Parse --color flag into ColorChoice.
fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn parse_max_steps(m: &ArgMatches) -> usize {
    m.get_one::<usize>("max_steps")
        .copied()
        .unwrap_or(DEFAULT_MAX_STEPS)
}

/// When -p is used with a single positional arg, shift it from pattern to input.
/// This enables: `bitloom decode -p 'u8' data.bin`
fn shift_positional_to_input(
    has_pattern_text: bool,
    pattern_path: Option<PathBuf>,
    input_path: Option<PathBuf>,
) -> (Option<PathBuf>, Option<PathBuf>) {
    if has_pattern_text && pattern_path.is_some() && input_path.is_none() {
        (None, pattern_path)
    } else {
        (pattern_path, input_path)
    }
}
