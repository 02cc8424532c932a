//! Flat value sequences and their structural templates.
//!
//! A nested record is represented as the flat list of its scalars plus a
//! template over `.`, `[` and `]`. `.` stands for one scalar, brackets for a
//! nested list. The pair is lossless: [`deflatten`] rebuilds the nesting and
//! the index functions map between hierarchical paths and flat positions.

use crate::Value;

/// Errors from template walks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("invalid character {ch:?} at offset {offset} in structural template")]
    InvalidTemplate { ch: char, offset: usize },

    #[error("structural template has unbalanced brackets")]
    Unbalanced,

    #[error("structural template holds {expected} values, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("path {path:?} does not address a scalar in the template")]
    PathNotFound { path: Vec<usize> },

    #[error("flat index {index} is out of range ({count} values)")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Split nested values into scalars and a structural template.
pub fn flatten(values: Vec<Value>) -> (Vec<Value>, String) {
    let mut flat = Vec::new();
    let mut template = String::new();
    flatten_into(values, &mut flat, &mut template);
    (flat, template)
}

fn flatten_into(values: Vec<Value>, flat: &mut Vec<Value>, template: &mut String) {
    for value in values {
        match value {
            Value::List(items) => {
                template.push('[');
                flatten_into(items, flat, template);
                template.push(']');
            }
            scalar => {
                template.push('.');
                flat.push(scalar);
            }
        }
    }
}

/// Rebuild nested values from a template and its scalars.
pub fn deflatten(template: &str, flat: Vec<Value>) -> Result<Vec<Value>, StructureError> {
    let expected = scalar_count(template)?;
    if expected != flat.len() {
        return Err(StructureError::CountMismatch {
            expected,
            actual: flat.len(),
        });
    }

    let mut values = flat.into_iter();
    let mut stack: Vec<Vec<Value>> = vec![Vec::new()];
    for (offset, ch) in template.char_indices() {
        match ch {
            '.' => {
                let value = values.next().ok_or(StructureError::CountMismatch {
                    expected,
                    actual: expected,
                })?;
                push_top(&mut stack, value)?;
            }
            '[' => stack.push(Vec::new()),
            ']' => {
                if stack.len() == 1 {
                    return Err(StructureError::Unbalanced);
                }
                let list = stack.pop().ok_or(StructureError::Unbalanced)?;
                push_top(&mut stack, Value::List(list))?;
            }
            _ => return Err(StructureError::InvalidTemplate { ch, offset }),
        }
    }

    if stack.len() != 1 {
        return Err(StructureError::Unbalanced);
    }
    stack.pop().ok_or(StructureError::Unbalanced)
}

fn push_top(stack: &mut [Vec<Value>], value: Value) -> Result<(), StructureError> {
    stack
        .last_mut()
        .map(|top| top.push(value))
        .ok_or(StructureError::Unbalanced)
}

/// Number of scalars in `template`, validating its alphabet.
pub fn scalar_count(template: &str) -> Result<usize, StructureError> {
    let mut count = 0;
    for (offset, ch) in template.char_indices() {
        match ch {
            '.' => count += 1,
            '[' | ']' => {}
            _ => return Err(StructureError::InvalidTemplate { ch, offset }),
        }
    }
    Ok(count)
}

/// Flat position of the scalar addressed by `path`.
///
/// `path` lists the item index at each nesting level, outermost first.
pub fn get_stream_index(template: &str, path: &[usize]) -> Result<usize, StructureError> {
    let not_found = || StructureError::PathNotFound {
        path: path.to_vec(),
    };
    if path.is_empty() {
        return Err(not_found());
    }

    let mut walk = TemplateWalk::new();
    for (offset, ch) in template.char_indices() {
        match ch {
            '.' => {
                if walk.path == path {
                    return Ok(walk.flat);
                }
                walk.scalar();
            }
            '[' => {
                if walk.path == path {
                    return Err(not_found());
                }
                walk.open();
            }
            ']' => walk.close()?,
            _ => return Err(StructureError::InvalidTemplate { ch, offset }),
        }
    }
    Err(not_found())
}

/// Hierarchical path of the scalar at flat position `index`.
pub fn get_structure_index(template: &str, index: usize) -> Result<Vec<usize>, StructureError> {
    let mut walk = TemplateWalk::new();
    for (offset, ch) in template.char_indices() {
        match ch {
            '.' => {
                if walk.flat == index {
                    return Ok(walk.path);
                }
                walk.scalar();
            }
            '[' => walk.open(),
            ']' => walk.close()?,
            _ => return Err(StructureError::InvalidTemplate { ch, offset }),
        }
    }
    Err(StructureError::IndexOutOfRange {
        index,
        count: walk.flat,
    })
}

/// Cursor over a template: the path of the next item and the flat count so far.
struct TemplateWalk {
    path: Vec<usize>,
    flat: usize,
}

impl TemplateWalk {
    fn new() -> Self {
        Self {
            path: vec![0],
            flat: 0,
        }
    }

    fn scalar(&mut self) {
        self.flat += 1;
        self.advance();
    }

    fn open(&mut self) {
        self.path.push(0);
    }

    fn close(&mut self) -> Result<(), StructureError> {
        if self.path.len() == 1 {
            return Err(StructureError::Unbalanced);
        }
        self.path.pop();
        self.advance();
        Ok(())
    }

    fn advance(&mut self) {
        if let Some(last) = self.path.last_mut() {
            *last += 1;
        }
    }
}
