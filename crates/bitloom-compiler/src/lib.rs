//! bitloom compiler: pattern text to executable programs.
//!
//! This crate provides the compilation pipeline for bitloom patterns:
//! - `lexer` - span-based tokens, with unrecognized input coalesced
//! - `compiler` - operand validation and eager repetition expansion
//! - `error` - compile errors and annotated rendering

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod compiler;
pub mod error;
pub mod lexer;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod compiler_tests;
#[cfg(test)]
mod error_tests;
#[cfg(test)]
mod lexer_tests;

pub use compiler::{MAX_INSTRUCTIONS, compile};
pub use error::CompileError;
pub use lexer::{Token, TokenKind, lex, token_text};
