// File: src/interpreter/value.rs
//
// Runtime values of the Minipar interpreter.
//
// A Value is a plain owned datum. Variables never hold values directly: they
// hold a Cell, a shared and individually locked slot, so that parallel tasks
// and by-reference array arguments can mutate the same storage.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Uninitialized,
    Number(f64),
    Bool(bool),
    Str(String),
    Array(Vec<Value>),
}

impl Value {
    /// Kind name used in runtime error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Uninitialized => "uninitialized",
            Value::Number(_) => "num",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            _ => false,
        }
    }

    /// True when both values are of the same kind
    pub fn same_kind(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Stores `new` into this slot.
    ///
    /// Assigning an array onto an existing array copies element by element up
    /// to the shorter length, so the slot keeps its declared size. Any other
    /// combination replaces the slot's contents.
    pub fn assign(&mut self, new: Value) {
        match (self, new) {
            (Value::Array(existing), Value::Array(incoming)) => {
                for (slot, item) in existing.iter_mut().zip(incoming) {
                    *slot = item;
                }
            }
            (slot, new) => *slot = new,
        }
    }
}

/// Formats a number the way `print` shows it: integral values without a
/// decimal point, everything else in shortest round-trip form
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Uninitialized => Ok(()),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Shared, lockable storage slot for one variable
pub type Cell = Arc<Mutex<Value>>;

pub fn new_cell(value: Value) -> Cell {
    Arc::new(Mutex::new(value))
}

/// Locks a cell; a lock poisoned by a panicking task still yields its data
pub fn lock_cell(cell: &Cell) -> MutexGuard<'_, Value> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Snapshot of a cell's current value
pub fn read_cell(cell: &Cell) -> Value {
    lock_cell(cell).clone()
}

/// Nested zero-filled numeric array with the given dimensions
pub fn build_array(dimensions: &[usize]) -> Value {
    match dimensions.split_first() {
        None => Value::Number(0.0),
        Some((&size, rest)) => Value::Array((0..size).map(|_| build_array(rest)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textual_form() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Uninitialized.to_string(), "");
        let nested = Value::Array(vec![
            Value::Number(1.0),
            Value::Array(vec![Value::Str("a".into()), Value::Bool(false)]),
        ]);
        assert_eq!(nested.to_string(), "[1, [a, false]]");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Number(2.0).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Str("x".into()).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::Array(vec![Value::Number(1.0)]).is_truthy());
        assert!(!Value::Uninitialized.is_truthy());
    }

    #[test]
    fn test_array_assignment_copies_up_to_shorter_length() {
        let mut slot = build_array(&[3]);
        slot.assign(Value::Array(vec![Value::Number(7.0), Value::Number(8.0)]));
        assert_eq!(slot.to_string(), "[7, 8, 0]");

        slot.assign(Value::Array((1..=5).map(|n| Value::Number(n as f64)).collect()));
        assert_eq!(slot.to_string(), "[1, 2, 3]");

        slot.assign(Value::Str("replaced".into()));
        assert_eq!(slot, Value::Str("replaced".into()));
    }

    #[test]
    fn test_build_array_dimensions() {
        assert_eq!(build_array(&[2, 2]).to_string(), "[[0, 0], [0, 0]]");
        assert_eq!(build_array(&[0]), Value::Array(Vec::new()));
    }

    #[test]
    fn test_cells_are_shared() {
        let cell = new_cell(Value::Number(1.0));
        let alias = Arc::clone(&cell);
        *lock_cell(&alias) = Value::Number(2.0);
        assert_eq!(read_cell(&cell), Value::Number(2.0));
    }
}
