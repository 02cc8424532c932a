use std::path::PathBuf;

use bitloom::Colors;

use super::input::{compile_or_exit, exit_with, load_pattern};

pub struct DumpArgs {
    pub pattern_path: Option<PathBuf>,
    pub pattern_text: Option<String>,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    let source = load_pattern(args.pattern_path.as_deref(), args.pattern_text.as_deref())
        .unwrap_or_else(|e| exit_with(e));

    if source.trim().is_empty() {
        eprintln!("error: pattern cannot be empty");
        std::process::exit(1);
    }

    let template = compile_or_exit(&source, args.color);
    print!("{}", template.dump(Colors::new(args.color)));
}
