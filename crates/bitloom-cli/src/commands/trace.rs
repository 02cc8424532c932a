//! Trace a decode for debugging.

use std::path::PathBuf;

use bitloom::{Colors, Decoder, PrintTracer, RunLimits, Value, Verbosity};

use super::input::{compile_or_exit, exit_with, load_data, load_pattern};

pub struct TraceArgs {
    pub pattern_path: Option<PathBuf>,
    pub pattern_text: Option<String>,
    pub data_path: Option<PathBuf>,
    pub hex: Option<String>,
    pub verbosity: Verbosity,
    pub no_result: bool,
    pub check_eof: bool,
    pub max_steps: usize,
    pub color: bool,
}

pub fn run(args: TraceArgs) {
    let source = load_pattern(args.pattern_path.as_deref(), args.pattern_text.as_deref())
        .unwrap_or_else(|e| exit_with(e));
    let data = load_data(
        args.data_path.as_deref(),
        args.hex.as_deref(),
        args.pattern_path.as_deref(),
    )
    .unwrap_or_else(|e| exit_with(e));
    let template = compile_or_exit(&source, args.color);

    let decoder = Decoder::builder(&data)
        .check_eof(args.check_eof)
        .limits(RunLimits::new().max_steps(args.max_steps))
        .build();
    let colors = Colors::new(args.color);
    let mut tracer = PrintTracer::builder(template.program())
        .verbosity(args.verbosity)
        .colored(args.color)
        .build();

    let values = match decoder.decode_with(template.program(), &mut tracer) {
        Ok(values) => {
            tracer.print();
            values
        }
        Err(e) => {
            tracer.print();
            eprintln!("runtime error: {e}");
            std::process::exit(2);
        }
    };

    if args.no_result {
        return;
    }

    println!("{}---{}", colors.dim, colors.reset);
    println!("{}", Value::List(values).format(true, colors));
}
