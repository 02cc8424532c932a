//! Compiled patterns.

use bitloom_bytecode::{Program, dump};
use bitloom_compiler::{CompileError, compile};
use bitloom_core::{Colors, Value};
use bitloom_vm::{Decoder, Encoder, RuntimeError};

/// A pattern compiled once and run any number of times.
#[derive(Clone, Debug)]
pub struct Template {
    source: String,
    program: Program,
}

impl Template {
    pub fn compile(pattern: &str) -> Result<Self, CompileError> {
        Ok(Self {
            source: pattern.to_string(),
            program: compile(pattern)?,
        })
    }

    /// Pattern text this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<Value>, RuntimeError> {
        Decoder::new(bytes).decode(&self.program)
    }

    pub fn encode(&self, values: Vec<Value>) -> Result<Vec<u8>, RuntimeError> {
        Encoder::new(values).encode(&self.program)
    }

    /// One line per instruction.
    pub fn dump(&self, colors: Colors) -> String {
        dump(&self.program, colors)
    }
}

impl TryFrom<&str> for Template {
    type Error = CompileError;

    fn try_from(pattern: &str) -> Result<Self, Self::Error> {
        Self::compile(pattern)
    }
}
