//! Per-run state shared by the decoder and the encoder.
//!
//! The engine owns the storage, the translation log, the persistent flags,
//! the label table and the nesting stack. Both interpreters drive it with a
//! `match` over [`Directive`](bitloom_bytecode::Directive) and differ only in
//! the direction data flows.

use indexmap::IndexMap;

use bitloom_bytecode::{Flag, Literal, Setting};
use bitloom_core::{Bits, Encoding, Value};

use super::error::{ErrorContext, ErrorKind, RuntimeError};
use super::storage::BitBuffer;
use super::translate::{Transform, TranslationLog, endian_swap};

/// Runtime limits for one run.
#[derive(Clone, Copy, Debug)]
pub struct RunLimits {
    /// Maximum executed instructions (default: 1,000,000).
    pub(crate) max_steps: usize,
    /// Maximum bits an encode may write (default: 2^30, 128 MiB).
    pub(crate) max_bits: usize,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            max_bits: 1 << 30,
        }
    }
}

impl RunLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the instruction limit.
    pub fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn get_max_steps(&self) -> usize {
        self.max_steps
    }

    /// Set the output size limit, in bits.
    pub fn max_bits(mut self, bits: usize) -> Self {
        self.max_bits = bits;
        self
    }

    pub fn get_max_bits(&self) -> usize {
        self.max_bits
    }
}

/// Persistent transforms applied to every later field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub reverse_all: bool,
    pub invert_all: bool,
    pub endian_swap_all: bool,
}

impl Flags {
    pub fn set(&mut self, flag: Flag, setting: Setting) {
        let slot = match flag {
            Flag::ReverseAll => &mut self.reverse_all,
            Flag::InvertAll => &mut self.invert_all,
            Flag::EndianSwapAll => &mut self.endian_swap_all,
        };
        *slot = setting.apply(*slot);
    }

    /// Transforms for a `width`-bit field at `start`, in application order:
    /// reverse, invert, then endian swap (never for text).
    pub fn transforms(
        self,
        start: usize,
        width: usize,
        encoding: Encoding,
    ) -> Result<Vec<Transform>, ErrorKind> {
        let mut out = Vec::new();
        if self.reverse_all {
            out.push(Transform::reverse(start, width));
        }
        if self.invert_all {
            out.push(Transform::invert(start, width));
        }
        if self.endian_swap_all && encoding != Encoding::Char {
            out.extend(endian_swap(start, width)?);
        }
        Ok(out)
    }

    /// How `literal` looks in storage before the field transforms run.
    pub fn disguise(self, literal: &[u8]) -> Result<Bits, ErrorKind> {
        let mut buffer = BitBuffer::from_bytes(literal);
        let transforms = self.transforms(0, buffer.len(), Encoding::Bytes)?;
        for t in transforms.iter().rev() {
            buffer.apply(t)?;
        }
        Ok(buffer.read_all())
    }
}

/// One definition or binding of a label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelEntry {
    /// Stream position in original coordinates.
    pub position: usize,
    /// Structural path of the bound value.
    pub path: Vec<usize>,
    /// `None` for a bare definition.
    pub value: Option<Value>,
}

/// The most recent value and where it came from.
#[derive(Clone, Debug)]
struct Produced {
    value: Value,
    position: usize,
    path: Vec<usize>,
}

/// State of one decode or encode run.
#[derive(Debug)]
pub struct Engine {
    pub(crate) buffer: BitBuffer,
    pub(crate) log: TranslationLog,
    pub(crate) flags: Flags,
    labels: IndexMap<String, Vec<LabelEntry>>,
    /// Open records; the root is always at the bottom.
    stack: Vec<Vec<Value>>,
    path: Vec<usize>,
    template: String,
    flat_index: usize,
    last: Option<Produced>,
    limits: RunLimits,
    steps: usize,
    step: Option<usize>,
    token: String,
}

impl Engine {
    pub fn new(buffer: BitBuffer, limits: RunLimits) -> Self {
        Self {
            buffer,
            log: TranslationLog::new(),
            flags: Flags::default(),
            labels: IndexMap::new(),
            stack: vec![Vec::new()],
            path: vec![0],
            template: String::new(),
            flat_index: 0,
            last: None,
            limits,
            steps: 0,
            step: None,
            token: String::new(),
        }
    }

    /// Account for one instruction and remember it for error reports.
    pub(crate) fn begin(&mut self, step: usize, token: &str) -> Result<(), ErrorKind> {
        self.step = Some(step);
        self.token.clear();
        self.token.push_str(token);
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(ErrorKind::StepLimitExceeded(self.limits.max_steps));
        }
        Ok(())
    }

    /// Fail if `width` more bits would take the buffer past the size limit.
    pub(crate) fn reserve(&self, width: usize) -> Result<(), ErrorKind> {
        if self.buffer.len().saturating_add(width) > self.limits.max_bits {
            return Err(ErrorKind::SizeLimitExceeded(self.limits.max_bits));
        }
        Ok(())
    }

    /// Mark the end of instruction execution; later errors belong to the run.
    pub(crate) fn end(&mut self) {
        self.step = None;
        self.token.clear();
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext {
            token: self.token.clone(),
            step: self.step,
            flat_index: self.flat_index,
            path: self.path.clone(),
        }
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> RuntimeError {
        RuntimeError::new(kind, self.context())
    }

    // Queries

    /// Cursor in buffer coordinates.
    pub fn tell_buffer(&self) -> usize {
        self.buffer.tell()
    }

    /// Cursor in original stream coordinates.
    pub fn tell_stream(&self) -> usize {
        self.log.to_original(self.buffer.tell(), self.buffer.len())
    }

    /// Flat index of the next value.
    pub fn index_stream(&self) -> usize {
        self.flat_index
    }

    /// Structural path of the next value.
    pub fn index_structure(&self) -> &[usize] {
        &self.path
    }

    /// Most recent value bound to `name`.
    pub fn label(&self, name: &str) -> Option<&Value> {
        self.labels.get(name)?.last()?.value.as_ref()
    }

    pub fn label_entries(&self, name: &str) -> &[LabelEntry] {
        self.labels.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Label names in order of first definition.
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Structural template of everything produced so far.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn log(&self) -> &TranslationLog {
        &self.log
    }

    pub fn last_value(&self) -> Option<&Value> {
        self.last.as_ref().map(|p| &p.value)
    }

    // Mutations

    /// Apply a transform to storage and record it.
    pub(crate) fn transform(&mut self, transform: Transform) -> Result<(), ErrorKind> {
        self.buffer.apply(&transform)?;
        self.record(transform);
        Ok(())
    }

    /// Record a transform without applying it.
    pub(crate) fn record(&mut self, transform: Transform) {
        self.log.push(self.flat_index, transform);
    }

    /// Append a value that started at buffer position `start`.
    pub(crate) fn push_value(&mut self, value: Value, start: usize) {
        let position = self.log.to_original(start, self.buffer.len());
        self.last = Some(Produced {
            value: value.clone(),
            position,
            path: self.path.clone(),
        });
        self.append(value);
        self.template.push('.');
        self.flat_index += 1;
    }

    fn append(&mut self, value: Value) {
        if let Some(top) = self.stack.last_mut() {
            top.push(value);
        }
        if let Some(index) = self.path.last_mut() {
            *index += 1;
        }
    }

    pub(crate) fn open_nest(&mut self) {
        self.stack.push(Vec::new());
        self.path.push(0);
        self.template.push('[');
    }

    pub(crate) fn close_nest(&mut self) -> Result<(), ErrorKind> {
        if self.stack.len() == 1 {
            return Err(ErrorKind::Structural("`]` without a matching `[`".into()));
        }
        let items = self.stack.pop().unwrap_or_default();
        self.path.pop();
        self.template.push(']');
        let path = self.path.clone();
        let list = Value::List(items);
        self.last = Some(Produced {
            value: list.clone(),
            position: self.tell_stream(),
            path,
        });
        self.append(list);
        Ok(())
    }

    pub fn set_flag(&mut self, flag: Flag, setting: Setting) {
        self.flags.set(flag, setting);
    }

    /// Bind the last value to `name`.
    pub(crate) fn set_label(&mut self, name: &str) -> Result<(), ErrorKind> {
        let Some(last) = &self.last else {
            return Err(ErrorKind::Label(format!(
                "cannot bind \"{name}\" before any value"
            )));
        };
        let entry = LabelEntry {
            position: last.position,
            path: last.path.clone(),
            value: Some(last.value.clone()),
        };
        self.labels.entry(name.to_string()).or_default().push(entry);
        Ok(())
    }

    /// Define `name` at the cursor, optionally with a literal value.
    pub(crate) fn def_label(&mut self, name: &str, literal: Option<&Literal>) {
        let entry = LabelEntry {
            position: self.tell_stream(),
            path: self.path.clone(),
            value: literal.map(Literal::to_value),
        };
        self.define(name, entry);
    }

    /// Append an entry for `name`, creating the label if needed.
    pub fn define(&mut self, name: &str, entry: LabelEntry) {
        self.labels.entry(name.to_string()).or_default().push(entry);
    }

    /// Compare the last value with the latest value of `name`.
    pub(crate) fn match_label(&self, name: &str) -> Result<(), ErrorKind> {
        let Some(entry) = self.labels.get(name).and_then(|v| v.last()) else {
            return Err(ErrorKind::Label(format!("label \"{name}\" is not defined")));
        };
        let Some(expected) = &entry.value else {
            return Err(ErrorKind::Label(format!("label \"{name}\" has no value")));
        };
        let Some(last) = &self.last else {
            return Err(ErrorKind::Label(format!(
                "nothing to match against label \"{name}\""
            )));
        };
        if !last.value.same_as(expected) {
            return Err(ErrorKind::DataMismatch(format!(
                "value {} does not match label \"{name}\" = {expected}",
                last.value
            )));
        }
        Ok(())
    }

    /// Compare the last value with a pattern literal.
    pub(crate) fn assert_last(&self, expected: &Literal) -> Result<(), ErrorKind> {
        match &self.last {
            Some(last) if expected.matches(&last.value) => Ok(()),
            Some(last) => Err(ErrorKind::DataMismatch(format!(
                "expected {expected}, found {}",
                last.value
            ))),
            None => Err(ErrorKind::DataMismatch(format!(
                "expected {expected}, but no value has been produced"
            ))),
        }
    }

    /// Close the run: all brackets balanced. Returns the root record.
    pub(crate) fn finish_structure(&mut self) -> Result<Vec<Value>, ErrorKind> {
        if self.stack.len() != 1 {
            return Err(ErrorKind::Structural(format!(
                "{} `[` left open",
                self.stack.len() - 1
            )));
        }
        Ok(self
            .stack
            .first_mut()
            .map(std::mem::take)
            .unwrap_or_default())
    }
}
