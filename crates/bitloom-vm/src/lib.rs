#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Decoder and encoder engines for compiled bitloom patterns.
//!
//! This crate executes a [`bitloom_bytecode::Program`] against a byte buffer
//! (decoding) or a sequence of values (encoding).

pub mod engine;

// Re-export commonly used items at crate root
pub use engine::{
    BitBuffer, Decoder, DecoderBuilder, Encoder, EncoderBuilder, Engine, ErrorContext, ErrorKind,
    Flags, LabelEntry, NoopTracer, PrintTracer, RunLimits, RuntimeError, Tracer, Transform,
    TranslationLog, Verbosity,
};
