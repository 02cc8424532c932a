//! Storage transforms and position translation.
//!
//! Every reversal or inversion applied to storage is recorded in a
//! [`TranslationLog`]. Replaying the log maps a boundary position between
//! buffer coordinates (what the engine sees now) and original coordinates
//! (the input as laid out on the wire). Endian swaps and pulls are recorded
//! as their constituent reversals, so two kinds of entry are enough.
//!
//! Positions are boundaries between bits: `0` is before the first bit and
//! `len` is after the last.

use std::fmt;
use std::ops::Range;

use bitloom_bytecode::{ModKind, OffsetKind, Width};

use super::error::ErrorKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformKind {
    Reverse,
    Invert,
}

/// Region boundary: fixed, or measured back from the end of the buffer.
///
/// The encoder does not know the final length while it runs, so regions
/// that extend "to the end" stay symbolic until finalize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    At(usize),
    FromEnd(usize),
}

impl Edge {
    pub fn resolve(self, len: usize) -> Option<usize> {
        match self {
            Edge::At(pos) => Some(pos),
            Edge::FromEnd(back) => len.checked_sub(back),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::At(pos) => write!(f, "{pos}"),
            Edge::FromEnd(0) => f.write_str("$"),
            Edge::FromEnd(back) => write!(f, "$-{back}"),
        }
    }
}

/// A reversal or inversion of the region `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    pub kind: TransformKind,
    pub start: Edge,
    pub end: Edge,
}

impl Transform {
    pub fn new(kind: TransformKind, start: usize, width: Width) -> Self {
        let end = match width {
            Width::Bits(n) => Edge::At(start + n),
            Width::Rest => Edge::FromEnd(0),
        };
        Self {
            kind,
            start: Edge::At(start),
            end,
        }
    }

    pub fn reverse(start: usize, width: usize) -> Self {
        Self::new(TransformKind::Reverse, start, Width::Bits(width))
    }

    pub fn invert(start: usize, width: usize) -> Self {
        Self::new(TransformKind::Invert, start, Width::Bits(width))
    }

    /// Concrete region in a buffer of `len` bits, if it fits.
    pub fn region(&self, len: usize) -> Option<Range<usize>> {
        let start = self.start.resolve(len)?;
        let end = self.end.resolve(len)?;
        (start <= end && end <= len).then_some(start..end)
    }

    /// Map a boundary through this transform. Reversal is an involution,
    /// so the same map serves both directions.
    fn map(&self, pos: usize, len: usize) -> usize {
        if self.kind == TransformKind::Invert {
            return pos;
        }
        match self.region(len) {
            Some(r) if r.start < pos && pos < r.end => r.start + r.end - pos,
            _ => pos,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TransformKind::Reverse => "reverse",
            TransformKind::Invert => "invert",
        };
        write!(f, "{kind} [{}, {})", self.start, self.end)
    }
}

/// Reverse byte order over `width` bits: a full reversal, then each byte
/// reversed back.
pub fn endian_swap(start: usize, width: usize) -> Result<Vec<Transform>, ErrorKind> {
    if width % 8 != 0 {
        return Err(ErrorKind::Alignment(format!(
            "endian swap of {width} bits is not a whole number of bytes"
        )));
    }
    let mut out = Vec::with_capacity(1 + width / 8);
    out.push(Transform::reverse(start, width));
    out.extend((start..start + width).step_by(8).map(|b| Transform::reverse(b, 8)));
    Ok(out)
}

/// Move `width` bits found `offset` bits past `start` to `start`.
pub fn pull(start: usize, offset: usize, width: Width) -> Vec<Transform> {
    let reverse = |start, end| Transform {
        kind: TransformKind::Reverse,
        start,
        end,
    };
    match width {
        Width::Bits(n) => vec![
            Transform::reverse(start, offset + n),
            Transform::reverse(start, n),
            Transform::reverse(start + n, offset),
        ],
        Width::Rest => vec![
            reverse(Edge::At(start), Edge::FromEnd(0)),
            reverse(Edge::At(start), Edge::FromEnd(offset)),
            reverse(Edge::FromEnd(offset), Edge::FromEnd(0)),
        ],
    }
}

/// Transforms for a one-shot modifier at the cursor.
pub fn at_cursor(kind: ModKind, pos: usize, width: Width) -> Result<Vec<Transform>, ErrorKind> {
    match (kind, width) {
        (ModKind::Reverse, _) => Ok(vec![Transform::new(TransformKind::Reverse, pos, width)]),
        (ModKind::Invert, _) => Ok(vec![Transform::new(TransformKind::Invert, pos, width)]),
        (ModKind::EndianSwap, Width::Bits(n)) => endian_swap(pos, n),
        (ModKind::EndianSwap, Width::Rest) => Err(ErrorKind::Alignment(
            "endian swap needs a fixed width".into(),
        )),
    }
}

/// Transforms for a modifier on a window `offset` bits past the cursor.
pub fn at_offset(kind: OffsetKind, pos: usize, offset: usize, width: Width) -> Vec<Transform> {
    match kind {
        OffsetKind::Reverse => vec![Transform::new(TransformKind::Reverse, pos + offset, width)],
        OffsetKind::Invert => vec![Transform::new(TransformKind::Invert, pos + offset, width)],
        OffsetKind::Pull => pull(pos, offset, width),
    }
}

/// A transform and the flat value index at the time it was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub flat_index: usize,
    pub transform: Transform,
}

/// Append-only record of transforms applied during one run.
#[derive(Clone, Debug, Default)]
pub struct TranslationLog {
    entries: Vec<LogEntry>,
}

impl TranslationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, flat_index: usize, transform: Transform) {
        self.entries.push(LogEntry {
            flat_index,
            transform,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_original(&self, pos: usize, len: usize) -> usize {
        to_original(&self.entries, pos, len)
    }

    pub fn from_original(&self, pos: usize, len: usize) -> usize {
        from_original(&self.entries, pos, len)
    }
}

/// Buffer position to original position, replaying newest-first.
pub fn to_original(entries: &[LogEntry], pos: usize, len: usize) -> usize {
    entries
        .iter()
        .rev()
        .fold(pos, |p, e| e.transform.map(p, len))
}

/// Original position to buffer position, replaying oldest-first.
pub fn from_original(entries: &[LogEntry], pos: usize, len: usize) -> usize {
    entries.iter().fold(pos, |p, e| e.transform.map(p, len))
}
