//! Decoder: bytes to values.
//!
//! Storage is mutated in place. Each transform the pattern asks for is
//! applied to the buffer before the bits under it are read, and recorded so
//! that jumps can be expressed in original stream coordinates.

use std::io::SeekFrom;

use bitloom_bytecode::{Directive, JumpKind, Program, Width};
use bitloom_core::{Bits, BitsRef, Encoding, Value, codec, hex_string};

use super::error::{ErrorKind, RuntimeError};
use super::state::{Engine, LabelEntry, RunLimits};
use super::storage::BitBuffer;
use super::trace::{NoopTracer, Tracer};
use super::translate::{LogEntry, Transform, at_cursor, at_offset, from_original, to_original};

/// Builder for [`Decoder`].
pub struct DecoderBuilder {
    buffer: BitBuffer,
    limits: RunLimits,
    check_eof: bool,
    labels: Vec<(String, Value)>,
}

impl DecoderBuilder {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            buffer: BitBuffer::from_bytes(bytes),
            limits: RunLimits::default(),
            check_eof: true,
            labels: Vec::new(),
        }
    }

    /// Set the run limits.
    pub fn limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Fail at finish when unread bits remain (default: true).
    pub fn check_eof(mut self, check: bool) -> Self {
        self.check_eof = check;
        self
    }

    /// Pre-seed a label with a value.
    pub fn label(mut self, name: impl Into<String>, value: Value) -> Self {
        self.labels.push((name.into(), value));
        self
    }

    pub fn build(self) -> Decoder {
        let mut engine = Engine::new(self.buffer, self.limits);
        for (name, value) in self.labels {
            engine.define(
                &name,
                LabelEntry {
                    position: 0,
                    path: Vec::new(),
                    value: Some(value),
                },
            );
        }
        Decoder {
            engine,
            check_eof: self.check_eof,
        }
    }
}

/// Runs programs against a byte buffer, producing values.
///
/// A decoder may run several programs in sequence over the same buffer;
/// [`Decoder::finish`] closes the run and returns everything produced.
#[derive(Debug)]
pub struct Decoder {
    engine: Engine,
    check_eof: bool,
}

impl Decoder {
    pub fn builder(bytes: &[u8]) -> DecoderBuilder {
        DecoderBuilder::new(bytes)
    }

    pub fn new(bytes: &[u8]) -> Self {
        Self::builder(bytes).build()
    }

    /// Read-only view of the run state.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run `program` and finish.
    pub fn decode(mut self, program: &Program) -> Result<Vec<Value>, RuntimeError> {
        self.run(program)?;
        self.finish()
    }

    /// Run `program` with a tracer and finish.
    pub fn decode_with<T: Tracer>(
        mut self,
        program: &Program,
        tracer: &mut T,
    ) -> Result<Vec<Value>, RuntimeError> {
        self.run_with(program, tracer)?;
        self.finish()
    }

    /// Execute `program` from the current cursor.
    ///
    /// Uses `NoopTracer`, which is optimized away at compile time.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.run_with(program, &mut NoopTracer)
    }

    /// Execute `program` with a tracer for debugging.
    pub fn run_with<T: Tracer>(
        &mut self,
        program: &Program,
        tracer: &mut T,
    ) -> Result<(), RuntimeError> {
        for (step, instr) in program.into_iter().enumerate() {
            self.engine
                .begin(step, &instr.token)
                .map_err(|kind| self.engine.error(kind))?;
            tracer.trace_instruction(step, instr, self.engine.tell_buffer());
            self.exec(&instr.directive, tracer)
                .map_err(|kind| self.engine.error(kind))?;
        }
        self.engine.end();
        Ok(())
    }

    /// Check that the run is complete and return the decoded values.
    pub fn finish(mut self) -> Result<Vec<Value>, RuntimeError> {
        self.engine.end();
        if self.check_eof && !self.engine.buffer.at_eof() {
            let kind = ErrorKind::IncompleteData(format!(
                "{} unread bits remain",
                self.engine.buffer.remaining()
            ));
            return Err(self.engine.error(kind));
        }
        self.engine
            .finish_structure()
            .map_err(|kind| self.engine.error(kind))
    }

    fn exec<T: Tracer>(&mut self, directive: &Directive, tracer: &mut T) -> Result<(), ErrorKind> {
        match directive {
            Directive::Value { encoding, width } => {
                let width = match width {
                    Width::Bits(n) => *n,
                    Width::Rest => self.engine.buffer.remaining(),
                };
                let start = self.engine.tell_buffer();
                let value = self.read_field(*encoding, width, tracer)?;
                self.produce(value, start, tracer);
                Ok(())
            }
            Directive::Next { width } => {
                self.engine.buffer.require(*width)?;
                self.engine.buffer.seek(SeekFrom::Current(*width as i64))?;
                Ok(())
            }
            Directive::Zeros { width } => {
                let bits = self.read_bits(Encoding::UInt, *width, tracer)?;
                if bits.any() {
                    return Err(ErrorKind::DataMismatch(format!(
                        "expected {width} zero bits, found {}",
                        bin_string(&bits)
                    )));
                }
                Ok(())
            }
            Directive::Ones { width } => {
                let bits = self.read_bits(Encoding::UInt, *width, tracer)?;
                if !bits.all() {
                    return Err(ErrorKind::DataMismatch(format!(
                        "expected {width} one bits, found {}",
                        bin_string(&bits)
                    )));
                }
                Ok(())
            }
            Directive::TakeAll { encoding } => {
                self.require_aligned("take-all")?;
                let start = self.engine.tell_buffer();
                let width = self.engine.buffer.remaining();
                let value = self.read_field(*encoding, width, tracer)?;
                self.produce(value, start, tracer);
                Ok(())
            }
            Directive::Mod { kind, width } => {
                let transforms = at_cursor(*kind, self.engine.tell_buffer(), *width)?;
                self.apply_all(transforms, tracer)
            }
            Directive::ModOff {
                kind,
                offset,
                width,
            } => {
                let transforms = at_offset(*kind, self.engine.tell_buffer(), *offset, *width);
                self.apply_all(transforms, tracer)
            }
            Directive::ModSet { flag, setting } => {
                self.engine.set_flag(*flag, *setting);
                Ok(())
            }
            Directive::SetLabel { name } => {
                self.engine.set_label(name)?;
                tracer.trace_label(name, self.engine.label(name));
                Ok(())
            }
            Directive::DefLabel { name, value } => {
                self.engine.def_label(name, value.as_ref());
                tracer.trace_label(name, self.engine.label(name));
                Ok(())
            }
            Directive::MatchLabel { name } => self.engine.match_label(name),
            Directive::NestOpen => {
                self.engine.open_nest();
                Ok(())
            }
            Directive::NestClose => self.engine.close_nest(),
            Directive::Assertion { expected } => self.engine.assert_last(expected),
            Directive::Jump { kind, bits } => self.jump(*kind, *bits, tracer),
            Directive::MarkerStart { bytes } => self.marker(bytes, false, tracer),
            Directive::MarkerEnd { bytes } => self.marker(bytes, true, tracer),
        }
    }

    fn produce<T: Tracer>(&mut self, value: Value, start: usize, tracer: &mut T) {
        tracer.trace_value(&value, start..self.engine.tell_buffer());
        self.engine.push_value(value, start);
    }

    fn apply_all<T: Tracer>(
        &mut self,
        transforms: Vec<Transform>,
        tracer: &mut T,
    ) -> Result<(), ErrorKind> {
        for t in transforms {
            self.engine.transform(t)?;
            tracer.trace_transform(&t);
        }
        Ok(())
    }

    /// Apply the persistent transforms to the next `width` bits and read them.
    fn read_bits<T: Tracer>(
        &mut self,
        encoding: Encoding,
        width: usize,
        tracer: &mut T,
    ) -> Result<Bits, ErrorKind> {
        self.engine.buffer.require(width)?;
        let pos = self.engine.tell_buffer();
        let transforms = self.engine.flags.transforms(pos, width, encoding)?;
        self.apply_all(transforms, tracer)?;
        self.engine.buffer.read(width)
    }

    fn read_field<T: Tracer>(
        &mut self,
        encoding: Encoding,
        width: usize,
        tracer: &mut T,
    ) -> Result<Value, ErrorKind> {
        let bits = self.read_bits(encoding, width, tracer)?;
        Ok(codec::decode(&bits, encoding)?)
    }

    fn require_aligned(&self, what: &str) -> Result<(), ErrorKind> {
        let pos = self.engine.tell_buffer();
        if pos % 8 != 0 {
            return Err(ErrorKind::Alignment(format!(
                "{what} needs a byte-aligned cursor, cursor is at bit {pos}"
            )));
        }
        Ok(())
    }

    fn marker<T: Tracer>(
        &mut self,
        literal: &[u8],
        last: bool,
        tracer: &mut T,
    ) -> Result<(), ErrorKind> {
        self.require_aligned("marker scan")?;
        let pos = self.engine.tell_buffer();
        let needle = self.engine.flags.disguise(literal)?;
        let found = self
            .engine
            .buffer
            .find(&needle, pos, last)
            .ok_or_else(|| ErrorKind::MarkerNotFound(hex_string(literal)))?;
        tracer.trace_seek(pos, found);

        let gap = self.engine.buffer.read(found - pos)?;
        let gap = codec::decode(&gap, Encoding::Bytes)?;
        self.produce(gap, pos, tracer);

        let marker = self.read_field(Encoding::Bytes, literal.len() * 8, tracer)?;
        if marker != Value::Bytes(literal.to_vec()) {
            return Err(ErrorKind::DataMismatch(format!(
                "marker {} read back as {marker}",
                hex_string(literal)
            )));
        }
        Ok(())
    }

    fn jump<T: Tracer>(
        &mut self,
        kind: JumpKind,
        bits: usize,
        tracer: &mut T,
    ) -> Result<(), ErrorKind> {
        let pos = self.engine.tell_buffer();
        let len = self.engine.buffer.len();
        let target = jump_target(self.engine.log.entries(), kind, bits, pos, len)?;
        tracer.trace_seek(pos, target);

        let gap_width = target - pos;
        let gap = self.engine.buffer.read(gap_width)?;
        let encoding = if pos % 8 == 0 && gap_width % 8 == 0 {
            Encoding::Bytes
        } else {
            Encoding::Bin
        };
        let gap = codec::decode(&gap, encoding)?;
        self.produce(gap, pos, tracer);
        Ok(())
    }
}

/// Buffer position a jump lands on, given the transforms applied before it.
pub(crate) fn jump_target(
    entries: &[LogEntry],
    kind: JumpKind,
    bits: usize,
    pos: usize,
    len: usize,
) -> Result<usize, ErrorKind> {
    let origin = match kind {
        JumpKind::Start => 0,
        JumpKind::End => len as i128,
        JumpKind::Forward | JumpKind::Backward => to_original(entries, pos, len) as i128,
    };
    let original = match kind {
        JumpKind::Start | JumpKind::Forward => origin + bits as i128,
        JumpKind::End | JumpKind::Backward => origin - bits as i128,
    };
    if original < 0 {
        return Err(ErrorKind::JumpRange(format!(
            "target lies {} bits before the start",
            -original
        )));
    }
    if original > len as i128 {
        return Err(ErrorKind::IncompleteData(format!(
            "jump target {original} lies past the end of the {len}-bit buffer"
        )));
    }
    let target = from_original(entries, original as usize, len);
    if target < pos {
        return Err(ErrorKind::JumpRange(format!(
            "target {target} lies before the cursor at bit {pos}"
        )));
    }
    Ok(target)
}

fn bin_string(bits: &BitsRef) -> String {
    bits.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect()
}
