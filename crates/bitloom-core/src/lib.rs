#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for bitloom.
//!
//! - [`Value`]: semantic field values, with serde and colored JSON output
//! - [`codec`]: conversion between MSB-first bit patterns and values
//! - [`structure`]: flatten/deflatten and path/index translation
//! - [`Colors`]: terminal palette shared by dumps and traces

pub mod codec;
pub mod colors;
pub mod structure;
pub mod value;

#[cfg(test)]
mod codec_tests;

pub use codec::{Bits, BitsRef, CodecError, Encoding};
pub use colors::Colors;
pub use structure::{
    StructureError, deflatten, flatten, get_stream_index, get_structure_index, scalar_count,
};
pub use value::{FromJsonError, Value, hex_string};
