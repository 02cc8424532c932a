//! Runtime engine for executing compiled bitloom patterns.
//!
//! The decoder turns bytes into values and the encoder turns values into
//! bytes. Both walk the same program over the same per-run [`Engine`] state
//! and record storage transforms in a translation log.

mod decoder;
mod encoder;
mod error;
mod state;
mod storage;
mod trace;
mod translate;

#[cfg(test)]
mod roundtrip_tests;
#[cfg(test)]
mod storage_tests;
#[cfg(test)]
mod translate_tests;

pub use decoder::{Decoder, DecoderBuilder};
pub use encoder::{Encoder, EncoderBuilder};
pub use error::{ErrorContext, ErrorKind, RuntimeError};
pub use state::{Engine, Flags, LabelEntry, RunLimits};
pub use storage::BitBuffer;
pub use trace::{NoopTracer, PrintTracer, PrintTracerBuilder, Tracer, Verbosity};
pub use translate::{
    Edge, LogEntry, Transform, TransformKind, TranslationLog, endian_swap, pull,
};
