//! Encode JSON values into bytes.

use std::path::PathBuf;

use bitloom::{Encoder, RunLimits, hex_string};

use super::input::{compile_or_exit, exit_with, load_pattern, load_values};

pub struct EncodeArgs {
    pub pattern_path: Option<PathBuf>,
    pub pattern_text: Option<String>,
    pub json_path: Option<PathBuf>,
    pub json: Option<String>,
    pub output: Option<PathBuf>,
    pub max_steps: usize,
    pub color: bool,
}

pub fn run(args: EncodeArgs) {
    let source = load_pattern(args.pattern_path.as_deref(), args.pattern_text.as_deref())
        .unwrap_or_else(|e| exit_with(e));
    let values = load_values(
        args.json_path.as_deref(),
        args.json.as_deref(),
        args.pattern_path.as_deref(),
    )
    .unwrap_or_else(|e| exit_with(e));
    let template = compile_or_exit(&source, args.color);

    let bytes = Encoder::builder(values)
        .limits(RunLimits::new().max_steps(args.max_steps))
        .build()
        .encode(template.program());

    let bytes = match bytes {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("runtime error: {e}");
            std::process::exit(2);
        }
    };

    // Raw bytes go to the file, hex to stdout.
    match args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &bytes) {
                eprintln!("error: failed to write '{}': {e}", path.display());
                std::process::exit(1);
            }
        }
        None => println!("{}", hex_string(&bytes)),
    }
}
