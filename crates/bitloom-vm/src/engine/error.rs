//! Errors that can occur while running a program.

use std::fmt;

use bitloom_core::CodecError;

/// What went wrong, without the location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Unbalanced brackets, leftover input, or input shaped differently from the pattern.
    #[error("structural error: {0}")]
    Structural(String),

    /// ZEROS/ONES/ASSERTION/MATCHLABEL expectation violated.
    #[error("data mismatch: {0}")]
    DataMismatch(String),

    /// Fewer bits than required, or unread bits at the end of a decode.
    #[error("incomplete data: {0}")]
    IncompleteData(String),

    /// Label referenced before any binding, or bound to nothing.
    #[error("label error: {0}")]
    Label(String),

    #[error("marker {0} not found before the end of data")]
    MarkerNotFound(String),

    #[error("jump out of range: {0}")]
    JumpRange(String),

    /// Cursor or width not on the byte boundary an operation needs.
    #[error("alignment error: {0}")]
    Alignment(String),

    #[error("input exhausted: no value left to encode")]
    Underflow,

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Execution step limit exceeded.
    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(usize),

    /// Encoded output would grow past the size limit.
    #[error("size limit of {0} bits exceeded")]
    SizeLimitExceeded(usize),
}

/// Where an error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Pattern text of the failing instruction.
    pub token: String,
    /// Instruction index, `None` for failures while finishing a run.
    pub step: Option<usize>,
    /// Flat index of the next value.
    pub flat_index: usize,
    /// Structural path of the next value.
    pub path: Vec<usize>,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(f, "at `{}` (step {step}", self.token)?,
            None => f.write_str("at end of run (")?,
        }
        if self.step.is_some() {
            f.write_str(", ")?;
        }
        write!(f, "value {}, path {:?})", self.flat_index, self.path)
    }
}

/// A failed run: the error and the instruction it happened at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} {context}")]
pub struct RuntimeError {
    kind: ErrorKind,
    context: ErrorContext,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, context: ErrorContext) -> Self {
        Self { kind, context }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}
