//! Bit storage with a cursor.
//!
//! Bits are numbered MSB-first: bit 0 is the most significant bit of byte 0.

use std::io::SeekFrom;

use bitloom_core::{Bits, BitsRef};

use super::error::ErrorKind;
use super::translate::{Transform, TransformKind};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bits: Bits,
    pos: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_bits(Bits::from_slice(bytes))
    }

    pub fn from_bits(bits: Bits) -> Self {
        Self { bits, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn tell(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bits.len().saturating_sub(self.pos)
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.bits.len()
    }

    pub fn as_bits(&self) -> &BitsRef {
        &self.bits
    }

    /// Move the cursor. The target must lie within `[0, len]`.
    pub fn seek(&mut self, to: SeekFrom) -> Result<usize, ErrorKind> {
        let len = self.bits.len() as i128;
        let target = match to {
            SeekFrom::Start(p) => p as i128,
            SeekFrom::Current(d) => self.pos as i128 + d as i128,
            SeekFrom::End(d) => len + d as i128,
        };
        if target < 0 || target > len {
            return Err(ErrorKind::IncompleteData(format!(
                "seek to bit {target} outside the {len}-bit buffer"
            )));
        }
        self.pos = target as usize;
        Ok(self.pos)
    }

    /// Fail unless `width` bits are left after the cursor.
    pub fn require(&self, width: usize) -> Result<(), ErrorKind> {
        let available = self.remaining();
        if width > available {
            return Err(ErrorKind::IncompleteData(format!(
                "needed {width} bits at bit {}, only {available} available",
                self.pos
            )));
        }
        Ok(())
    }

    pub fn read(&mut self, width: usize) -> Result<Bits, ErrorKind> {
        self.require(width)?;
        let out = self.bits[self.pos..self.pos + width].to_bitvec();
        self.pos += width;
        Ok(out)
    }

    pub fn read_all(&mut self) -> Bits {
        let start = self.pos.min(self.bits.len());
        self.pos = self.bits.len();
        self.bits[start..].to_bitvec()
    }

    /// Overwrite at the cursor, extending the buffer as needed, and advance.
    pub fn write(&mut self, bits: &BitsRef) {
        let end = self.pos + bits.len();
        if end > self.bits.len() {
            self.bits.resize(end, false);
        }
        self.bits[self.pos..end].copy_from_bitslice(bits);
        self.pos = end;
    }

    pub fn reverse(&mut self, start: usize, width: usize) -> Result<(), ErrorKind> {
        self.apply(&Transform::reverse(start, width))
    }

    pub fn invert(&mut self, start: usize, width: usize) -> Result<(), ErrorKind> {
        self.apply(&Transform::invert(start, width))
    }

    /// Apply a transform in place. The cursor does not move.
    pub fn apply(&mut self, transform: &Transform) -> Result<(), ErrorKind> {
        let len = self.bits.len();
        let region = transform.region(len).ok_or_else(|| {
            ErrorKind::IncompleteData(format!(
                "{transform} does not fit the {len}-bit buffer"
            ))
        })?;
        let slice = &mut self.bits[region];
        match transform.kind {
            TransformKind::Reverse => slice.reverse(),
            TransformKind::Invert => {
                for mut bit in slice.iter_mut() {
                    let flipped = !*bit;
                    bit.set(flipped);
                }
            }
        }
        Ok(())
    }

    /// Find `pattern` at a byte-aligned offset at or after `from`: the first
    /// occurrence, or the last one when `last` is set.
    pub fn find(&self, pattern: &BitsRef, from: usize, last: bool) -> Option<usize> {
        let len = self.bits.len();
        if pattern.len() > len {
            return None;
        }
        let first = from.next_multiple_of(8);
        let mut offsets = (first..len - pattern.len() + 1).step_by(8);
        let hit = |o: &usize| self.bits[*o..*o + pattern.len()] == *pattern;
        if last {
            offsets.rev().find(hit)
        } else {
            offsets.find(hit)
        }
    }

    /// Zero-fill up to the next byte boundary.
    pub fn pad_to_byte(&mut self) {
        let len = self.bits.len().next_multiple_of(8);
        self.bits.resize(len, false);
    }

    /// Bytes of the buffer, zero-padded to a byte boundary.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.pad_to_byte();
        self.bits.set_uninitialized(false);
        self.bits.into_vec()
    }
}
