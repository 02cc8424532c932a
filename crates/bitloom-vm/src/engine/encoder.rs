//! Encoder: values to bytes.
//!
//! The encoder writes the buffer as the decoder would see it after every
//! transform had run, and only records the transforms. Finish undoes them
//! newest-first to recover the wire layout. Checks that depend on the final
//! length (jumps, marker scans) are queued and verified against a replay of
//! the log once that length is known.
//!
//! A field that runs to the end of the data (`u$`, `B$`, ...) must be the last
//! thing written. Its value is widened so the field ends on the byte boundary
//! the decoder stops at.

use bitloom_bytecode::{Directive, JumpKind, Program};
use bitloom_core::{Bits, Encoding, Value, codec, flatten, hex_string};

use super::decoder::jump_target;
use super::error::{ErrorContext, ErrorKind, RuntimeError};
use super::state::{Engine, LabelEntry, RunLimits};
use super::storage::BitBuffer;
use super::trace::{NoopTracer, Tracer};
use super::translate::{LogEntry, Transform, at_cursor, at_offset};

/// Builder for [`Encoder`].
pub struct EncoderBuilder {
    values: Vec<Value>,
    limits: RunLimits,
    labels: Vec<(String, Value)>,
}

impl EncoderBuilder {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            limits: RunLimits::default(),
            labels: Vec::new(),
        }
    }

    /// Set the run limits.
    pub fn limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Pre-seed a label with a value.
    pub fn label(mut self, name: impl Into<String>, value: Value) -> Self {
        self.labels.push((name.into(), value));
        self
    }

    pub fn build(self) -> Encoder {
        let mut engine = Engine::new(BitBuffer::new(), self.limits);
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
        let (input, template) = flatten(self.values);
        Encoder {
            engine,
            input: input.into_iter(),
            template,
            pending: Vec::new(),
            rest_end: None,
        }
    }
}

/// A check that needs the final buffer length.
#[derive(Debug)]
struct Pending {
    /// Log entries applied when the decoder reaches this point.
    log_len: usize,
    /// Cursor before the gap.
    pos: usize,
    gap_width: usize,
    check: Check,
    context: ErrorContext,
}

#[derive(Debug)]
enum Check {
    Jump { kind: JumpKind, bits: usize },
    Marker { needle: Bits, literal: Vec<u8>, last: bool },
}

/// Runs programs over a sequence of values, producing bytes.
#[derive(Debug)]
pub struct Encoder {
    engine: Engine,
    input: std::vec::IntoIter<Value>,
    /// Structural template of the input.
    template: String,
    pending: Vec<Pending>,
    /// Buffer length after the first field that runs to the end of the data.
    rest_end: Option<(usize, ErrorContext)>,
}

impl Encoder {
    pub fn builder(values: Vec<Value>) -> EncoderBuilder {
        EncoderBuilder::new(values)
    }

    pub fn new(values: Vec<Value>) -> Self {
        Self::builder(values).build()
    }

    /// Read-only view of the run state.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run `program` and finish.
    pub fn encode(mut self, program: &Program) -> Result<Vec<u8>, RuntimeError> {
        self.run(program)?;
        self.finish()
    }

    /// Run `program` with a tracer and finish.
    pub fn encode_with<T: Tracer>(
        mut self,
        program: &Program,
        tracer: &mut T,
    ) -> Result<Vec<u8>, RuntimeError> {
        self.run_with(program, tracer)?;
        self.finish()
    }

    /// Execute `program`, consuming input from where the last run stopped.
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

    /// Verify the run and return the encoded bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, RuntimeError> {
        self.engine.end();
        let leftover = self.input.len();
        if leftover > 0 {
            let kind = ErrorKind::Structural(format!("{leftover} input values were not consumed"));
            return Err(self.engine.error(kind));
        }
        self.engine
            .finish_structure()
            .map_err(|kind| self.engine.error(kind))?;
        // Flat input fills any shape; nested input must match it.
        let nested = self.template.contains('[');
        if nested && self.engine.template() != self.template {
            let kind = ErrorKind::Structural(format!(
                "input has shape {:?} but the pattern produced {:?}",
                self.template,
                self.engine.template()
            ));
            return Err(self.engine.error(kind));
        }
        if let Some((end, context)) = &self.rest_end {
            let len = self.engine.buffer.len();
            if len != *end {
                let kind = ErrorKind::Structural(format!(
                    "{} bits written after a field that runs to the end of the data",
                    len - end
                ));
                return Err(RuntimeError::new(kind, context.clone()));
            }
        }

        // Decoders see whole bytes, so open-ended regions resolve against the padded length.
        self.engine.buffer.pad_to_byte();
        let entries = self.engine.log.entries();
        let mut original = self.engine.buffer.clone();
        for entry in entries.iter().rev() {
            original
                .apply(&entry.transform)
                .map_err(|kind| self.engine.error(kind))?;
        }

        let mut view = original.clone();
        let mut applied = 0;
        for pending in &self.pending {
            for entry in &entries[applied..pending.log_len] {
                view.apply(&entry.transform)
                    .map_err(|kind| RuntimeError::new(kind, pending.context.clone()))?;
            }
            applied = pending.log_len;
            verify(pending, &view, &entries[..pending.log_len])
                .map_err(|kind| RuntimeError::new(kind, pending.context.clone()))?;
        }

        Ok(original.into_bytes())
    }

    fn exec<T: Tracer>(&mut self, directive: &Directive, tracer: &mut T) -> Result<(), ErrorKind> {
        match directive {
            Directive::Value { encoding, width } => {
                let value = self.next_input()?;
                let Some(width) = width.fixed() else {
                    let bits = self.rest_bits(&value, *encoding)?;
                    self.write_field(value, &bits, *encoding, tracer)?;
                    self.mark_rest();
                    return Ok(());
                };
                self.engine.reserve(width)?;
                let bits = codec::encode(&value, *encoding, Some(width))?;
                self.write_field(value, &bits, *encoding, tracer)
            }
            Directive::Next { width } => {
                self.engine.reserve(*width)?;
                self.engine.buffer.write(&Bits::repeat(false, *width));
                Ok(())
            }
            Directive::Zeros { width } => self.write_constant(false, *width, tracer),
            Directive::Ones { width } => self.write_constant(true, *width, tracer),
            Directive::TakeAll { encoding } => {
                self.require_aligned("take-all")?;
                let value = self.next_input()?;
                let bits = codec::encode(&value, *encoding, None)?;
                self.write_field(value, &bits, *encoding, tracer)?;
                self.mark_rest();
                Ok(())
            }
            Directive::Mod { kind, width } => {
                let transforms = at_cursor(*kind, self.engine.tell_buffer(), *width)?;
                self.record_all(transforms, tracer);
                Ok(())
            }
            Directive::ModOff {
                kind,
                offset,
                width,
            } => {
                let transforms = at_offset(*kind, self.engine.tell_buffer(), *offset, *width);
                self.record_all(transforms, tracer);
                Ok(())
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

    fn next_input(&mut self) -> Result<Value, ErrorKind> {
        self.input.next().ok_or(ErrorKind::Underflow)
    }

    fn record_all<T: Tracer>(&mut self, transforms: Vec<Transform>, tracer: &mut T) {
        for t in transforms {
            self.engine.record(t);
            tracer.trace_transform(&t);
        }
    }

    /// Write field bits at the cursor and record the persistent transforms over them.
    fn write_bits<T: Tracer>(
        &mut self,
        bits: &Bits,
        encoding: Encoding,
        tracer: &mut T,
    ) -> Result<(), ErrorKind> {
        let pos = self.engine.tell_buffer();
        let transforms = self.engine.flags.transforms(pos, bits.len(), encoding)?;
        self.engine.buffer.write(bits);
        self.record_all(transforms, tracer);
        Ok(())
    }

    fn write_field<T: Tracer>(
        &mut self,
        value: Value,
        bits: &Bits,
        encoding: Encoding,
        tracer: &mut T,
    ) -> Result<(), ErrorKind> {
        let start = self.engine.tell_buffer();
        self.write_bits(bits, encoding, tracer)?;
        self.produce(value, start, tracer);
        Ok(())
    }

    fn write_constant<T: Tracer>(
        &mut self,
        bit: bool,
        width: usize,
        tracer: &mut T,
    ) -> Result<(), ErrorKind> {
        self.engine.reserve(width)?;
        self.write_bits(&Bits::repeat(bit, width), Encoding::UInt, tracer)
    }

    /// Bits for a value that runs to the end of the data, widened to the next
    /// byte boundary. Fails when the widened field would decode differently.
    fn rest_bits(&self, value: &Value, encoding: Encoding) -> Result<Bits, ErrorKind> {
        let bits = codec::encode(value, encoding, None)?;
        let end = self.engine.tell_buffer() + bits.len();
        let pad = (8 - end % 8) % 8;
        if pad == 0 {
            return Ok(bits);
        }
        codec::encode(value, encoding, Some(bits.len() + pad))
            .ok()
            .filter(|widened| {
                codec::decode(widened, encoding).is_ok_and(|back| absorbs_padding(value, &back))
            })
            .ok_or_else(|| {
                ErrorKind::Alignment(format!(
                    "{value} ends at bit {end}, and {pad} bits of padding before the byte boundary would change it"
                ))
            })
    }

    fn mark_rest(&mut self) {
        if self.rest_end.is_none() {
            self.rest_end = Some((self.engine.tell_buffer(), self.engine.context()));
        }
    }

    /// Write the next input verbatim as a gap, with no transforms. Returns its width.
    fn write_gap<T: Tracer>(
        &mut self,
        encoding: Encoding,
        tracer: &mut T,
    ) -> Result<usize, ErrorKind> {
        let value = self.next_input()?;
        let encoding = match (&value, encoding) {
            (Value::Bin(_), Encoding::Bin) => Encoding::Bin,
            _ => Encoding::Bytes,
        };
        let bits = codec::encode(&value, encoding, None)?;
        let start = self.engine.tell_buffer();
        tracer.trace_seek(start, start + bits.len());
        self.engine.buffer.write(&bits);
        self.produce(value, start, tracer);
        Ok(bits.len())
    }

    fn produce<T: Tracer>(&mut self, value: Value, start: usize, tracer: &mut T) {
        tracer.trace_value(&value, start..self.engine.tell_buffer());
        self.engine.push_value(value, start);
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
        let gap_width = self.write_gap(Encoding::Bytes, tracer)?;

        self.pending.push(Pending {
            log_len: self.engine.log.len(),
            pos,
            gap_width,
            check: Check::Marker {
                needle,
                literal: literal.to_vec(),
                last,
            },
            context: self.engine.context(),
        });
        let bits = Bits::from_slice(literal);
        self.write_bits(&bits, Encoding::Bytes, tracer)
    }

    fn jump<T: Tracer>(
        &mut self,
        kind: JumpKind,
        bits: usize,
        tracer: &mut T,
    ) -> Result<(), ErrorKind> {
        let pos = self.engine.tell_buffer();
        let log_len = self.engine.log.len();
        let context = self.engine.context();
        let gap_width = self.write_gap(Encoding::Bin, tracer)?;
        self.pending.push(Pending {
            log_len,
            pos,
            gap_width,
            check: Check::Jump { kind, bits },
            context,
        });
        Ok(())
    }
}

/// Whether `back`, decoded from a widened field, still reads as `value`.
fn absorbs_padding(value: &Value, back: &Value) -> bool {
    match (value, back) {
        (Value::Hex(a) | Value::Text(a), Value::Hex(b)) => a
            .trim_start_matches('0')
            .eq_ignore_ascii_case(b.trim_start_matches('0')),
        _ => back.same_as(value),
    }
}

/// Check a queued jump or marker against the buffer the decoder would see.
fn verify(
    pending: &Pending,
    view: &BitBuffer,
    entries: &[LogEntry],
) -> Result<(), ErrorKind> {
    let expected = pending.pos + pending.gap_width;
    match &pending.check {
        Check::Jump { kind, bits } => {
            let target = jump_target(entries, *kind, *bits, pending.pos, view.len())?;
            if target != expected {
                return Err(ErrorKind::JumpRange(format!(
                    "a gap of {} bits ends at bit {expected}, but the jump lands on bit {target}",
                    pending.gap_width
                )));
            }
        }
        Check::Marker {
            needle,
            literal,
            last,
        } => {
            let found = view.find(needle, pending.pos, *last);
            if found != Some(expected) {
                return Err(ErrorKind::DataMismatch(format!(
                    "marker {} would be found at {found:?} instead of bit {expected}",
                    hex_string(literal)
                )));
            }
        }
    }
    Ok(())
}
