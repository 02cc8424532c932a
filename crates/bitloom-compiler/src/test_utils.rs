//! Test utilities and snapshot helpers.

use bitloom_bytecode::dump;
use bitloom_core::Colors;

use crate::{CompileError, compile};

/// Compile and dump a pattern that is expected to be valid.
pub fn dump_valid(pattern: &str) -> String {
    match compile(pattern) {
        Ok(program) => dump(&program, Colors::OFF),
        Err(e) => panic!("expected `{pattern}` to compile, got: {e}"),
    }
}

/// Compile a pattern that is expected to fail.
pub fn compile_err(pattern: &str) -> CompileError {
    match compile(pattern) {
        Ok(program) => panic!("expected `{pattern}` to fail, got {} instructions", program.len()),
        Err(e) => e,
    }
}
