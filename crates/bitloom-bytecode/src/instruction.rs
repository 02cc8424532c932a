//! Compiled instructions.
//!
//! A pattern compiles to a flat list of [`Instruction`]s. Each carries the
//! token it came from (for diagnostics) and a [`Directive`] with typed
//! operands. Repetition is expanded before this point, so the list is
//! executed strictly in order by both the decoder and the encoder.

use std::fmt;
use std::ops::Range;

use bitloom_core::{Encoding, Value};

/// Field width: a fixed number of bits, or everything up to the end of data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    Bits(usize),
    Rest,
}

impl Width {
    pub fn fixed(self) -> Option<usize> {
        match self {
            Width::Bits(n) => Some(n),
            Width::Rest => None,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Width::Bits(n) => write!(f, "{n}"),
            Width::Rest => f.write_str("$"),
        }
    }
}

/// One-shot transform applied at the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModKind {
    Reverse,
    Invert,
    /// Reverse byte order over the window; the window must be whole bytes.
    EndianSwap,
}

/// Transform applied to a window at an offset from the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OffsetKind {
    Reverse,
    Invert,
    /// Move the window to the cursor, shifting the skipped bits after it.
    Pull,
}

/// Persistent transform applied to every subsequent value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flag {
    ReverseAll,
    InvertAll,
    EndianSwapAll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Setting {
    Set,
    Clear,
    Toggle,
}

impl Setting {
    pub fn apply(self, current: bool) -> bool {
        match self {
            Setting::Set => true,
            Setting::Clear => false,
            Setting::Toggle => !current,
        }
    }
}

/// Reference point of a jump, in original stream coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JumpKind {
    Start,
    Forward,
    Backward,
    End,
}

/// Constant written in pattern text, used by assertions and label definitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i128),
    Float(f64),
    Str(String),
}

impl Literal {
    /// Whether a produced value equals this literal.
    ///
    /// Uses the same cross-kind rules as label matching ([`Value::same_as`]):
    /// integers compare numerically with any integer or float value, strings
    /// with text, digit strings and Latin-1 byte strings.
    pub fn matches(&self, value: &Value) -> bool {
        self.to_value().same_as(value)
    }

    /// The value a label defined with this literal holds.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Int(n) if *n >= 0 => Value::UInt(*n as u128),
            Literal::Int(n) => Value::SInt(*n),
            Literal::Float(x) => Value::Float(*x),
            Literal::Str(s) => Value::Text(s.clone()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// What an instruction does, with its operands.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    Value { encoding: Encoding, width: Width },
    /// Skip don't-care bits.
    Next { width: usize },
    Zeros { width: usize },
    Ones { width: usize },
    Mod { kind: ModKind, width: Width },
    ModOff { kind: OffsetKind, offset: usize, width: Width },
    ModSet { flag: Flag, setting: Setting },
    SetLabel { name: String },
    DefLabel { name: String, value: Option<Literal> },
    MatchLabel { name: String },
    NestOpen,
    NestClose,
    Assertion { expected: Literal },
    TakeAll { encoding: Encoding },
    Jump { kind: JumpKind, bits: usize },
    /// Scan for the first occurrence of the bytes.
    MarkerStart { bytes: Vec<u8> },
    /// Scan for the last occurrence of the bytes.
    MarkerEnd { bytes: Vec<u8> },
}

impl Directive {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Directive::Value { .. } => "VALUE",
            Directive::Next { .. } => "NEXT",
            Directive::Zeros { .. } => "ZEROS",
            Directive::Ones { .. } => "ONES",
            Directive::Mod { .. } => "MOD",
            Directive::ModOff { .. } => "MODOFF",
            Directive::ModSet { .. } => "MODSET",
            Directive::SetLabel { .. } => "SETLABEL",
            Directive::DefLabel { .. } => "DEFLABEL",
            Directive::MatchLabel { .. } => "MATCHLABEL",
            Directive::NestOpen => "NESTOPEN",
            Directive::NestClose => "NESTCLOSE",
            Directive::Assertion { .. } => "ASSERTION",
            Directive::TakeAll { .. } => "TAKEALL",
            Directive::Jump { .. } => "JUMP",
            Directive::MarkerStart { .. } => "MARKERSTART",
            Directive::MarkerEnd { .. } => "MARKEREND",
        }
    }
}

/// A compiled instruction and the pattern text it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub token: String,
    /// Byte range of `token` in the pattern.
    pub span: Range<usize>,
    pub directive: Directive,
}

impl Instruction {
    pub fn new(token: impl Into<String>, span: Range<usize>, directive: Directive) -> Self {
        Self {
            token: token.into(),
            span,
            directive,
        }
    }
}

/// An executable instruction stream.
///
/// Immutable once built; one program can drive any number of runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, step: usize) -> Option<&Instruction> {
        self.instructions.get(step)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
