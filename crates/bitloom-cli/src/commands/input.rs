//! Loading patterns, binary input and JSON values.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use bitloom::{FromJsonError, Template, Value, parse_hex_bytes};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("pattern is required: use a positional argument or -p/--pattern")]
    MissingPattern,

    #[error("input is required: use a positional argument or -x/--hex")]
    MissingData,

    #[error("values are required: use a positional argument or -j/--json")]
    MissingValues,

    #[error("pattern and input cannot both be read from stdin")]
    DoubleStdin,

    #[error("failed to read '{path}': {source}")]
    Read { path: String, source: io::Error },

    #[error("invalid hex input {0:?}")]
    Hex(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("values must be a JSON array")]
    NotAnArray,

    #[error(transparent)]
    Value(#[from] FromJsonError),
}

/// Pattern text from `-p`, a file, or stdin (`-`).
pub fn load_pattern(path: Option<&Path>, text: Option<&str>) -> Result<String, InputError> {
    if let Some(text) = text {
        return Ok(text.to_owned());
    }
    let path = path.ok_or(InputError::MissingPattern)?;
    let bytes = read_path(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Binary input from `-x`, a file, or stdin (`-`).
pub fn load_data(
    path: Option<&Path>,
    hex: Option<&str>,
    pattern_path: Option<&Path>,
) -> Result<Vec<u8>, InputError> {
    if let Some(hex) = hex {
        return parse_hex(hex);
    }
    let path = path.ok_or(InputError::MissingData)?;
    check_single_stdin(path, pattern_path)?;
    read_path(path)
}

/// Values from `-j`, a file, or stdin (`-`).
pub fn load_values(
    path: Option<&Path>,
    json: Option<&str>,
    pattern_path: Option<&Path>,
) -> Result<Vec<Value>, InputError> {
    if let Some(json) = json {
        return parse_values(json);
    }
    let path = path.ok_or(InputError::MissingValues)?;
    check_single_stdin(path, pattern_path)?;
    let bytes = read_path(path)?;
    parse_values(&String::from_utf8_lossy(&bytes))
}

/// Hex digits, whitespace ignored.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, InputError> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits.as_str());
    parse_hex_bytes(digits).ok_or_else(|| InputError::Hex(text.to_owned()))
}

/// A JSON array of values.
pub fn parse_values(json: &str) -> Result<Vec<Value>, InputError> {
    let serde_json::Value::Array(items) = serde_json::from_str(json)? else {
        return Err(InputError::NotAnArray);
    };
    Ok(items
        .iter()
        .map(Value::from_json)
        .collect::<Result<Vec<_>, _>>()?)
}

/// Compile `source`, or print the diagnostic and exit.
pub fn compile_or_exit(source: &str, color: bool) -> Template {
    Template::compile(source).unwrap_or_else(|e| {
        eprint!("{}", e.render(source, color));
        std::process::exit(1);
    })
}

/// Print `err` and exit.
pub fn exit_with(err: InputError) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

fn check_single_stdin(path: &Path, pattern_path: Option<&Path>) -> Result<(), InputError> {
    if path.as_os_str() == "-" && pattern_path.is_some_and(|p| p.as_os_str() == "-") {
        return Err(InputError::DoubleStdin);
    }
    Ok(())
}

fn read_path(path: &Path) -> Result<Vec<u8>, InputError> {
    let read_err = |source| InputError::Read {
        path: path.display().to_string(),
        source,
    };
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).map_err(read_err)?;
        return Ok(buf);
    }
    fs::read(path).map_err(read_err)
}
