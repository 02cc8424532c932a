//! Conversion between raw bit patterns and semantic values.
//!
//! Bits are MSB-first: the first bit of a slice is the most significant bit
//! of the number it encodes. Integer encodings are limited to 128 bits; the
//! digit-string and byte encodings work at any width.

use std::fmt;

use bitvec::prelude::*;

use crate::value::{Value, hex_string};

/// Owned bit storage used throughout the workspace.
pub type Bits = BitVec<u8, Msb0>;

/// Borrowed view of [`Bits`].
pub type BitsRef = BitSlice<u8, Msb0>;

/// Widest integer field the codec can represent.
pub const MAX_INT_BITS: usize = 128;

/// How a raw bit pattern is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    UInt,
    /// Two's complement.
    SInt,
    LowerHex,
    UpperHex,
    /// Binary digit string.
    Bin,
    Bytes,
    /// Latin-1 text.
    Char,
    /// IEEE-754 big-endian, 32 or 64 bits.
    Float,
}

impl Encoding {
    /// Pattern letter for this encoding.
    pub fn letter(self) -> char {
        match self {
            Encoding::UInt => 'u',
            Encoding::SInt => 's',
            Encoding::LowerHex => 'x',
            Encoding::UpperHex => 'X',
            Encoding::Bin => 'b',
            Encoding::Bytes => 'B',
            Encoding::Char => 'C',
            Encoding::Float => 'f',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Some(match letter {
            'u' => Encoding::UInt,
            's' => Encoding::SInt,
            'x' => Encoding::LowerHex,
            'X' => Encoding::UpperHex,
            'b' => Encoding::Bin,
            'B' => Encoding::Bytes,
            'C' => Encoding::Char,
            'f' => Encoding::Float,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::UInt => "uint",
            Encoding::SInt => "sint",
            Encoding::LowerHex => "hex",
            Encoding::UpperHex => "HEX",
            Encoding::Bin => "bin",
            Encoding::Bytes => "bytes",
            Encoding::Char => "char",
            Encoding::Float => "float",
        }
    }

    /// Bytes and text occupy whole bytes.
    pub fn needs_byte_multiple(self) -> bool {
        matches!(self, Encoding::Bytes | Encoding::Char)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from converting between bits and values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("{encoding} field of {width} bits exceeds the 128-bit limit")]
    TooWide { encoding: Encoding, width: usize },

    #[error("{encoding} field width {width} is not a multiple of 8")]
    NotByteMultiple { encoding: Encoding, width: usize },

    #[error("float field must be 32 or 64 bits, got {width}")]
    FloatWidth { width: usize },

    #[error("{encoding} field cannot be empty")]
    EmptyField { encoding: Encoding },

    #[error("value {value} does not fit in {width} bits as {encoding}")]
    OutOfRange {
        value: String,
        encoding: Encoding,
        width: usize,
    },

    #[error("{encoding} field cannot encode a {kind} value")]
    Incompatible { encoding: Encoding, kind: &'static str },

    #[error("invalid {encoding} digits {text:?}")]
    InvalidDigits { encoding: Encoding, text: String },

    #[error("character {ch:?} is outside Latin-1")]
    NotLatin1 { ch: char },
}

/// Interpret `bits` according to `encoding`.
pub fn decode(bits: &BitsRef, encoding: Encoding) -> Result<Value, CodecError> {
    let width = bits.len();
    match encoding {
        Encoding::UInt => Ok(Value::UInt(load_uint(bits, encoding)?)),
        Encoding::SInt => {
            if width == 0 {
                return Err(CodecError::EmptyField { encoding });
            }
            let raw = load_uint(bits, encoding)?;
            Ok(Value::SInt(sign_extend(raw, width)))
        }
        Encoding::LowerHex => Ok(Value::Hex(hex_digits(bits, false))),
        Encoding::UpperHex => Ok(Value::Hex(hex_digits(bits, true))),
        Encoding::Bin => Ok(Value::Bin(
            bits.iter().by_vals().map(|b| if b { '1' } else { '0' }).collect(),
        )),
        Encoding::Bytes => Ok(Value::Bytes(load_bytes(bits, encoding)?)),
        Encoding::Char => {
            let bytes = load_bytes(bits, encoding)?;
            Ok(Value::Text(bytes.iter().map(|&b| b as char).collect()))
        }
        Encoding::Float => {
            let raw = load_uint(bits, encoding)?;
            match width {
                32 => Ok(Value::Float(f32::from_bits(raw as u32) as f64)),
                64 => Ok(Value::Float(f64::from_bits(raw as u64))),
                _ => Err(CodecError::FloatWidth { width }),
            }
        }
    }
}

/// Render `value` as bits.
///
/// With `width == None` the value's natural width is used (see
/// [`natural_width`]). Lenient inputs are accepted where unambiguous:
/// `Text` for hex/bin digits and for bytes (as hex), integers of either
/// signedness when in range, and lists of byte-sized integers for bytes.
pub fn encode(value: &Value, encoding: Encoding, width: Option<usize>) -> Result<Bits, CodecError> {
    match encoding {
        Encoding::UInt => {
            let n = value
                .as_u128()
                .ok_or_else(|| out_of_range_or_incompatible(value, encoding, width))?;
            let width = width.unwrap_or_else(|| uint_width(n));
            check_int_width(encoding, width)?;
            if width < MAX_INT_BITS && n >> width != 0 {
                return Err(out_of_range(value, encoding, width));
            }
            Ok(store_uint(n, width))
        }
        Encoding::SInt => {
            let n = value
                .as_i128()
                .ok_or_else(|| out_of_range_or_incompatible(value, encoding, width))?;
            let width = width.unwrap_or_else(|| sint_width(n));
            check_int_width(encoding, width)?;
            if width == 0 {
                return Err(CodecError::EmptyField { encoding });
            }
            if width < MAX_INT_BITS {
                let min = -(1i128 << (width - 1));
                let max = (1i128 << (width - 1)) - 1;
                if n < min || n > max {
                    return Err(out_of_range(value, encoding, width));
                }
            }
            let mask = if width == MAX_INT_BITS {
                u128::MAX
            } else {
                (1u128 << width) - 1
            };
            Ok(store_uint(n as u128 & mask, width))
        }
        Encoding::LowerHex | Encoding::UpperHex => {
            let text = digit_text(value, encoding)?;
            let mut bits = Bits::with_capacity(text.len() * 4);
            for ch in text.chars() {
                let digit = ch.to_digit(16).ok_or_else(|| CodecError::InvalidDigits {
                    encoding,
                    text: text.to_string(),
                })?;
                bits.extend_from_bitslice(&store_uint(digit as u128, 4));
            }
            fit_digits(bits, value, encoding, width)
        }
        Encoding::Bin => {
            let text = digit_text(value, encoding)?;
            let mut bits = Bits::with_capacity(text.len());
            for ch in text.chars() {
                match ch {
                    '0' => bits.push(false),
                    '1' => bits.push(true),
                    _ => {
                        return Err(CodecError::InvalidDigits {
                            encoding,
                            text: text.to_string(),
                        });
                    }
                }
            }
            fit_digits(bits, value, encoding, width)
        }
        Encoding::Bytes | Encoding::Char => {
            let bytes = byte_content(value, encoding)?;
            let natural = bytes.len() * 8;
            let width = width.unwrap_or(natural);
            if width % 8 != 0 {
                return Err(CodecError::NotByteMultiple { encoding, width });
            }
            if width != natural {
                return Err(out_of_range(value, encoding, width));
            }
            Ok(Bits::from_vec(bytes))
        }
        Encoding::Float => {
            let x = match value {
                Value::Float(x) => *x,
                Value::UInt(u) => *u as f64,
                Value::SInt(s) => *s as f64,
                other => {
                    return Err(CodecError::Incompatible {
                        encoding,
                        kind: other.kind(),
                    });
                }
            };
            match width.unwrap_or(64) {
                32 => Ok(store_uint((x as f32).to_bits() as u128, 32)),
                64 => Ok(store_uint(x.to_bits() as u128, 64)),
                width => Err(CodecError::FloatWidth { width }),
            }
        }
    }
}

/// Width `value` takes when a field has no fixed width.
pub fn natural_width(value: &Value, encoding: Encoding) -> Result<usize, CodecError> {
    encode(value, encoding, None).map(|bits| bits.len())
}

/// Numeric value of `bits`, MSB first.
pub fn bits_to_u128(bits: &BitsRef) -> u128 {
    bits.iter()
        .by_vals()
        .fold(0u128, |acc, bit| (acc << 1) | bit as u128)
}

/// `width` low bits of `value`, MSB first. `width` must not exceed 128.
pub fn store_uint(value: u128, width: usize) -> Bits {
    let mut bits = Bits::with_capacity(width);
    for i in (0..width).rev() {
        bits.push((value >> i) & 1 == 1);
    }
    bits
}

fn load_uint(bits: &BitsRef, encoding: Encoding) -> Result<u128, CodecError> {
    check_int_width(encoding, bits.len())?;
    Ok(bits_to_u128(bits))
}

fn load_bytes(bits: &BitsRef, encoding: Encoding) -> Result<Vec<u8>, CodecError> {
    if bits.len() % 8 != 0 {
        return Err(CodecError::NotByteMultiple {
            encoding,
            width: bits.len(),
        });
    }
    Ok(bits
        .chunks(8)
        .map(|chunk| bits_to_u128(chunk) as u8)
        .collect())
}

fn check_int_width(encoding: Encoding, width: usize) -> Result<(), CodecError> {
    if width > MAX_INT_BITS {
        return Err(CodecError::TooWide { encoding, width });
    }
    Ok(())
}

fn sign_extend(raw: u128, width: usize) -> i128 {
    let shift = MAX_INT_BITS - width;
    ((raw << shift) as i128) >> shift
}

fn uint_width(n: u128) -> usize {
    (MAX_INT_BITS - n.leading_zeros() as usize).max(1)
}

fn sint_width(n: i128) -> usize {
    let magnitude = if n < 0 { !n } else { n };
    MAX_INT_BITS - magnitude.leading_zeros() as usize + 1
}

/// Hex digits for `bits`, zero-padded on the left to whole nibbles.
fn hex_digits(bits: &BitsRef, upper: bool) -> String {
    let pad = (4 - bits.len() % 4) % 4;
    let mut padded = Bits::repeat(false, pad);
    padded.extend_from_bitslice(bits);
    padded
        .chunks(4)
        .map(|nibble| {
            let digit = bits_to_u128(nibble) as u32;
            let ch = char::from_digit(digit, 16).unwrap_or('0');
            if upper { ch.to_ascii_uppercase() } else { ch }
        })
        .collect()
}

fn digit_text(value: &Value, encoding: Encoding) -> Result<&str, CodecError> {
    match (value, encoding) {
        (Value::Hex(s), Encoding::LowerHex | Encoding::UpperHex) => Ok(s),
        (Value::Bin(s), Encoding::Bin) => Ok(s),
        (Value::Text(s), _) => Ok(s),
        (other, _) => Err(CodecError::Incompatible {
            encoding,
            kind: other.kind(),
        }),
    }
}

/// Trim or pad a digit string's bits to `width`.
///
/// Dropped leading bits must be zero so the value survives the round trip.
fn fit_digits(
    bits: Bits,
    value: &Value,
    encoding: Encoding,
    width: Option<usize>,
) -> Result<Bits, CodecError> {
    let Some(width) = width else {
        return Ok(bits);
    };
    if bits.len() >= width {
        let excess = bits.len() - width;
        if bits[..excess].any() {
            return Err(out_of_range(value, encoding, width));
        }
        return Ok(bits[excess..].to_bitvec());
    }
    let mut padded = Bits::repeat(false, width - bits.len());
    padded.extend_from_bitslice(&bits);
    Ok(padded)
}

fn byte_content(value: &Value, encoding: Encoding) -> Result<Vec<u8>, CodecError> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        Value::Text(s) if encoding == Encoding::Char => s
            .chars()
            .map(|ch| u8::try_from(ch as u32).map_err(|_| CodecError::NotLatin1 { ch }))
            .collect(),
        Value::Text(s) | Value::Hex(s) => parse_hex_bytes(s).ok_or_else(|| {
            CodecError::InvalidDigits {
                encoding,
                text: s.clone(),
            }
        }),
        Value::List(items) => items
            .iter()
            .map(|item| {
                item.as_u128()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| out_of_range(item, encoding, 8))
            })
            .collect(),
        other => Err(CodecError::Incompatible {
            encoding,
            kind: other.kind(),
        }),
    }
}

/// Parse an even-length hex string into bytes.
pub fn parse_hex_bytes(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}

fn out_of_range(value: &Value, encoding: Encoding, width: usize) -> CodecError {
    let shown = match value {
        Value::Bytes(b) => hex_string(b),
        other => other.to_string(),
    };
    CodecError::OutOfRange {
        value: shown,
        encoding,
        width,
    }
}

fn out_of_range_or_incompatible(
    value: &Value,
    encoding: Encoding,
    width: Option<usize>,
) -> CodecError {
    match value {
        Value::UInt(_) | Value::SInt(_) => out_of_range(value, encoding, width.unwrap_or(0)),
        other => CodecError::Incompatible {
            encoding,
            kind: other.kind(),
        },
    }
}
