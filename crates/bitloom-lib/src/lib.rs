//! bitloom: bit-level binary templates.
//!
//! A pattern describes the layout of a binary record. The same compiled
//! pattern decodes bytes into values and encodes values back into the same
//! bytes.
//!
//! # Example
//!
//! ```
//! use bitloom::{Template, Value};
//!
//! let template = Template::compile(r#"C16 ="BM"; Ey u16 En [u4 u4]"#).unwrap();
//! let values = template.decode(&[b'B', b'M', 0x34, 0x12, 0xA5]).unwrap();
//! assert_eq!(values[1], Value::UInt(0x1234));
//! assert_eq!(template.encode(values).unwrap(), [b'B', b'M', 0x34, 0x12, 0xA5]);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod template;


pub use bitloom_bytecode::{Directive, Instruction, Program};
pub use bitloom_compiler::CompileError;
pub use bitloom_core::codec::parse_hex_bytes;
pub use bitloom_core::{
    Colors, Encoding, FromJsonError, StructureError, Value, deflatten, flatten, get_stream_index,
    get_structure_index, hex_string,
};
pub use bitloom_vm::{
    Decoder, DecoderBuilder, Encoder, EncoderBuilder, ErrorContext, ErrorKind, NoopTracer,
    PrintTracer, RunLimits, RuntimeError, Tracer, Verbosity,
};
pub use template::Template;

/// Errors from the one-shot entry points.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Result type for bitloom operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Compile `pattern` and decode `bytes` with it.
pub fn decode(pattern: &str, bytes: &[u8]) -> Result<Vec<Value>> {
    Ok(Template::compile(pattern)?.decode(bytes)?)
}

/// Compile `pattern` and encode `values` with it.
pub fn encode(pattern: &str, values: Vec<Value>) -> Result<Vec<u8>> {
    Ok(Template::compile(pattern)?.encode(values)?)
}
