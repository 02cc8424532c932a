//! Decode binary input into JSON values.

use std::path::PathBuf;

use bitloom::{Colors, Decoder, RunLimits, Value};

use super::input::{compile_or_exit, exit_with, load_data, load_pattern};

pub struct DecodeArgs {
    pub pattern_path: Option<PathBuf>,
    pub pattern_text: Option<String>,
    pub data_path: Option<PathBuf>,
    pub hex: Option<String>,
    pub check_eof: bool,
    pub max_steps: usize,
    pub pretty: bool,
    pub color: bool,
}

pub fn run(args: DecodeArgs) {
    let source = load_pattern(args.pattern_path.as_deref(), args.pattern_text.as_deref())
        .unwrap_or_else(|e| exit_with(e));
    let data = load_data(
        args.data_path.as_deref(),
        args.hex.as_deref(),
        args.pattern_path.as_deref(),
    )
    .unwrap_or_else(|e| exit_with(e));
    let template = compile_or_exit(&source, args.color);

    let values = Decoder::builder(&data)
        .check_eof(args.check_eof)
        .limits(RunLimits::new().max_steps(args.max_steps))
        .build()
        .decode(template.program());

    match values {
        Ok(values) => {
            let output = Value::List(values).format(args.pretty, Colors::new(args.color));
            println!("{output}");
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            std::process::exit(2);
        }
    }
}
