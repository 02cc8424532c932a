//! Semantic values produced by decoding and consumed by encoding.

use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::Colors;

/// A decoded field, or a field to encode.
///
/// `List` is a nested record. Every other variant is a scalar and occupies
/// one `.` in a structural template.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    UInt(u128),
    SInt(i128),
    Float(f64),
    /// Hex digits; letter case follows the encoding that produced them.
    Hex(String),
    /// Binary digits, one character per bit.
    Bin(String),
    Bytes(Vec<u8>),
    /// Latin-1 text, one character per byte.
    Text(String),
    List(Vec<Value>),
}

/// Error converting JSON input into values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert JSON {kind} to a value")]
pub struct FromJsonError {
    pub kind: &'static str,
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::UInt(_) => "uint",
            Value::SInt(_) => "sint",
            Value::Float(_) => "float",
            Value::Hex(_) => "hex",
            Value::Bin(_) => "bin",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::List(_) => "list",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Integer view of the value, if it has one.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::UInt(u) => i128::try_from(*u).ok(),
            Value::SInt(s) => Some(*s),
            _ => None,
        }
    }

    /// Unsigned view of the value, if it has one.
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Value::UInt(u) => Some(*u),
            Value::SInt(s) => u128::try_from(*s).ok(),
            _ => None,
        }
    }

    /// Equality used by label matching and assertions.
    ///
    /// Numbers compare numerically across signedness and with floats. Text
    /// compares with digit strings (hex case-insensitively) and with byte
    /// strings through their Latin-1 encoding. Hex digits compare
    /// case-insensitively. Everything else is structural equality.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::UInt(_) | Value::SInt(_), Value::UInt(_) | Value::SInt(_)) => {
                match (self.as_i128(), other.as_i128()) {
                    (Some(a), Some(b)) => a == b,
                    _ => self == other,
                }
            }
            (Value::UInt(_) | Value::SInt(_), Value::Float(x)) => {
                self.as_i128().is_some_and(|n| n as f64 == *x)
            }
            (Value::Float(x), Value::UInt(_) | Value::SInt(_)) => {
                other.as_i128().is_some_and(|n| n as f64 == *x)
            }
            (Value::Hex(a), Value::Hex(b))
            | (Value::Text(a), Value::Hex(b))
            | (Value::Hex(a), Value::Text(b)) => a.eq_ignore_ascii_case(b),
            (Value::Text(a), Value::Bin(b)) | (Value::Bin(a), Value::Text(b)) => a == b,
            (Value::Text(s), Value::Bytes(b)) | (Value::Bytes(b), Value::Text(s)) => {
                s.chars().count() == b.len()
                    && s.chars().zip(b).all(|(c, &b)| c as u32 == b as u32)
            }
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            _ => self == other,
        }
    }

    /// Convert parsed JSON into a value.
    ///
    /// Non-negative integers become `UInt`, negative ones `SInt`, other
    /// numbers `Float`, strings `Text`, arrays `List`. The codec reinterprets
    /// `Text` for hex, binary and byte encodings.
    pub fn from_json(json: &serde_json::Value) -> Result<Value, FromJsonError> {
        match json {
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(Value::UInt(u as u128))
                } else if let Some(i) = n.as_i64() {
                    Ok(Value::SInt(i as i128))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(FromJsonError { kind: "number" })
                }
            }
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            serde_json::Value::Null => Err(FromJsonError { kind: "null" }),
            serde_json::Value::Bool(_) => Err(FromJsonError { kind: "boolean" }),
            serde_json::Value::Object(_) => Err(FromJsonError { kind: "object" }),
        }
    }

    /// Format value as colored JSON.
    ///
    /// Color scheme (jq-inspired):
    /// - Strings (hex, bin, bytes, text): Green
    /// - Numbers: Normal
    /// - Structure `[],`: Dim
    pub fn format(&self, pretty: bool, colors: Colors) -> String {
        let mut out = String::new();
        format_value(&mut out, self, &colors, pretty, 0);
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false, Colors::OFF))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::UInt(u) => match u64::try_from(*u) {
                Ok(small) => serializer.serialize_u64(small),
                Err(_) => serializer.serialize_u128(*u),
            },
            Value::SInt(s) => match i64::try_from(*s) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.serialize_i128(*s),
            },
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Hex(s) | Value::Bin(s) | Value::Text(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_str(&hex_string(b)),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Lower-case hex rendering of a byte string.
pub fn hex_string(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

fn format_value(out: &mut String, value: &Value, c: &Colors, pretty: bool, indent: usize) {
    match value {
        Value::UInt(u) => out.push_str(&u.to_string()),
        Value::SInt(s) => out.push_str(&s.to_string()),
        Value::Float(x) => out.push_str(&format_float(*x)),
        Value::Hex(s) | Value::Bin(s) | Value::Text(s) => format_string(out, s, c),
        Value::Bytes(b) => format_string(out, &hex_string(b), c),
        Value::List(items) => format_list(out, items, c, pretty, indent),
    }
}

fn format_float(x: f64) -> String {
    if !x.is_finite() {
        return "null".to_string();
    }
    if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

fn format_string(out: &mut String, s: &str, c: &Colors) {
    out.push_str(c.green);
    out.push('"');
    out.push_str(&escape_json_string(s));
    out.push('"');
    out.push_str(c.reset);
}

fn format_list(out: &mut String, items: &[Value], c: &Colors, pretty: bool, indent: usize) {
    out.push_str(c.dim);
    out.push('[');
    out.push_str(c.reset);

    if items.is_empty() {
        out.push_str(c.dim);
        out.push(']');
        out.push_str(c.reset);
        return;
    }

    let elem_indent = if pretty { indent + 2 } else { 0 };

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(c.dim);
            out.push(',');
            out.push_str(c.reset);
        }

        if pretty {
            out.push('\n');
            out.push_str(&" ".repeat(elem_indent));
        }

        format_value(out, item, c, pretty, elem_indent);
    }

    if pretty {
        out.push('\n');
        out.push_str(&" ".repeat(indent));
    }

    out.push_str(c.dim);
    out.push(']');
    out.push_str(c.reset);
}

fn escape_json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
