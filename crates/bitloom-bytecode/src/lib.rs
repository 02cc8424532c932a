#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Instruction model for compiled bitloom patterns.
//!
//! This crate contains:
//! - The [`Instruction`]/[`Directive`] model shared by compiler and engines
//! - Pattern literals and their matching rules
//! - A human-readable [`dump`] of compiled programs

pub mod dump;
pub mod instruction;

#[cfg(test)]
mod dump_tests;

pub use bitloom_core::Encoding;
pub use dump::{dump, format_directive, width_for_count};
pub use instruction::{
    Directive, Flag, Instruction, JumpKind, Literal, ModKind, OffsetKind, Program, Setting, Width,
};
