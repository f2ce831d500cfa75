// File: src/interpreter/native_functions/mod.rs
//
// Native implementations of the default functions, split by category.
// Arity has already been checked against the signature table when the
// dispatcher runs, so handlers may rely on the argument count.

pub mod io;
pub mod math;
pub mod network;
pub mod type_ops;

use super::{Interpreter, Value};
use crate::errors::RunTimeError;

/// Main dispatcher that routes native function calls to the category modules
pub fn call_native_function(interp: &Interpreter<'_>, name: &str, arg_values: &[Value]) -> Result<Value, RunTimeError> {
    if let Some(result) = io::handle(interp, name, arg_values) {
        return result;
    }
    if let Some(result) = math::handle(name, arg_values) {
        return result;
    }
    if let Some(result) = type_ops::handle(name, arg_values) {
        return result;
    }

    Err(RunTimeError::undefined_function(name))
}

/// Numeric argument at `position`, or an error naming the function
pub(crate) fn num_arg(name: &str, arg_values: &[Value], position: usize) -> Result<f64, RunTimeError> {
    match arg_values.get(position) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(RunTimeError::new(format!(
            "{} expects num as argument {}, found {}",
            name,
            position + 1,
            other.type_name()
        ))),
        None => Err(RunTimeError::new(format!("{} is missing argument {}", name, position + 1))),
    }
}

/// String argument at `position`, or an error naming the function
pub(crate) fn str_arg<'v>(name: &str, arg_values: &'v [Value], position: usize) -> Result<&'v str, RunTimeError> {
    match arg_values.get(position) {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(RunTimeError::new(format!(
            "{} expects string as argument {}, found {}",
            name,
            position + 1,
            other.type_name()
        ))),
        None => Err(RunTimeError::new(format!("{} is missing argument {}", name, position + 1))),
    }
}
