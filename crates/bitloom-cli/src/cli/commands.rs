//! Command builders for the CLI.
//!
//! Each command is built from the shared arg builders in `args.rs`. Run
//! flags are accepted everywhere: decode/trace/dump take each other's flags,
//! with irrelevant ones hidden from `--help`.

use clap::Command;

use super::args::*;

/// Add hidden data input args (for commands that don't read binary input).
fn with_hidden_data_args(cmd: Command) -> Command {
    cmd.arg(data_path_arg().hide(true)).arg(hex_arg().hide(true))
}

/// Add hidden run args (for commands that don't execute).
fn with_hidden_run_args(cmd: Command) -> Command {
    cmd.arg(no_eof_check_arg().hide(true))
        .arg(max_steps_arg().hide(true))
}

/// Add hidden trace args (for commands that don't trace).
fn with_hidden_trace_args(cmd: Command) -> Command {
    cmd.arg(verbose_arg().hide(true))
        .arg(no_result_arg().hide(true))
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("bitloom")
        .about("Decode and encode binary records with bit-level patterns")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(decode_command())
        .subcommand(encode_command())
        .subcommand(dump_command())
        .subcommand(trace_command())
}

/// Decode binary input into JSON values.
pub fn decode_command() -> Command {
    let cmd = Command::new("decode")
        .about("Decode binary input into JSON values")
        .override_usage(
            "\
  bitloom decode <PATTERN> <FILE>
  bitloom decode <PATTERN> -x <HEX>
  bitloom decode -p <TEXT> <FILE>
  bitloom decode -p <TEXT> -x <HEX>",
        )
        .after_help(
            r#"EXAMPLES:
  bitloom decode header.blm image.bmp       # pattern file + binary file
  bitloom decode -p 'u4 u4 B$' image.bmp    # inline pattern
  bitloom decode -p 'Ey u16' -x '34 12'     # all inline"#,
        )
        .arg(pattern_path_arg())
        .arg(data_path_arg())
        .arg(pattern_text_arg())
        .arg(hex_arg())
        .arg(no_eof_check_arg())
        .arg(max_steps_arg())
        .arg(compact_arg())
        .arg(color_arg());

    with_hidden_trace_args(cmd)
}

/// Encode JSON values into bytes.
pub fn encode_command() -> Command {
    Command::new("encode")
        .about("Encode JSON values into bytes")
        .override_usage(
            "\
  bitloom encode <PATTERN> -j <JSON>
  bitloom encode <PATTERN> <FILE>
  bitloom encode -p <TEXT> -j <JSON>",
        )
        .after_help(
            r#"EXAMPLES:
  bitloom encode header.blm -j '["BM", 70]'    # prints hex
  bitloom encode -p 'Ey u16' -j '[4660]'       # prints 3412
  bitloom encode header.blm values.json -o out.bin"#,
        )
        .arg(pattern_path_arg())
        .arg(json_path_arg())
        .arg(pattern_text_arg())
        .arg(json_arg())
        .arg(output_file_arg())
        .arg(max_steps_arg())
        .arg(color_arg())
}

/// Show compiled instructions.
///
/// Accepts run flags, but only uses pattern/color.
pub fn dump_command() -> Command {
    let cmd = Command::new("dump")
        .about("Show compiled instructions")
        .override_usage(
            "\
  bitloom dump <PATTERN>
  bitloom dump -p <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  bitloom dump header.blm          # from file
  bitloom dump -p '{u4 x4}3'       # repetition is expanded"#,
        )
        .arg(pattern_path_arg())
        .arg(pattern_text_arg())
        .arg(color_arg());

    with_hidden_trace_args(with_hidden_run_args(with_hidden_data_args(cmd)))
        .arg(compact_arg().hide(true))
}

/// Trace a decode for debugging.
pub fn trace_command() -> Command {
    let cmd = Command::new("trace")
        .about("Trace a decode for debugging")
        .override_usage(
            "\
  bitloom trace <PATTERN> <FILE>
  bitloom trace -p <TEXT> -x <HEX> [-v|-vv]",
        )
        .after_help(
            r#"EXAMPLES:
  bitloom trace header.blm image.bmp        # instructions and values
  bitloom trace -p 'Ry u4 u4' -x 5a -v      # also transforms and labels
  bitloom trace -p 'r$ u8' -x 01 -vv        # also the cursor"#,
        )
        .arg(pattern_path_arg())
        .arg(data_path_arg())
        .arg(pattern_text_arg())
        .arg(hex_arg())
        .arg(verbose_arg())
        .arg(no_result_arg())
        .arg(no_eof_check_arg())
        .arg(max_steps_arg())
        .arg(color_arg());

    cmd.arg(compact_arg().hide(true))
}
