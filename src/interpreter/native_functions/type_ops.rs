// File: src/interpreter/native_functions/type_ops.rs
//
// Type conversion and inspection native functions

use super::str_arg;
use crate::builtins;
use crate::errors::RunTimeError;
use crate::interpreter::Value;

/// Handle type conversion and inspection function calls
/// Returns Some(result) if the function was handled, None if not recognized
pub fn handle(name: &str, arg_values: &[Value]) -> Option<Result<Value, RunTimeError>> {
    let result = match name {
        "len" => match arg_values.first() {
            Some(Value::Str(s)) => Ok(Value::Number(builtins::str_len(s))),
            Some(Value::Array(items)) => Ok(Value::Number(items.len() as f64)),
            Some(other) => {
                Err(RunTimeError::new(format!("len expects a string or an array, found {}", other.type_name())))
            }
            None => Err(RunTimeError::new("len is missing its argument")),
        },

        "to_num" => match arg_values.first() {
            Some(Value::Number(n)) => Ok(Value::Number(*n)),
            Some(Value::Str(s)) => builtins::parse_num(s)
                .map(Value::Number)
                .ok_or_else(|| RunTimeError::new(format!("cannot convert '{}' to num", s))),
            Some(other) => Err(RunTimeError::new(format!("to_num expects a string, found {}", other.type_name()))),
            None => Err(RunTimeError::new("to_num is missing its argument")),
        },

        "to_string" => Ok(Value::Str(arg_values.first().map(Value::to_string).unwrap_or_default())),

        "to_bool" => Ok(Value::Bool(arg_values.first().is_some_and(Value::is_truthy))),

        "isnum" => str_arg(name, arg_values, 0).map(|s| Value::Bool(builtins::is_num(s))),

        "isalpha" => str_arg(name, arg_values, 0).map(|s| Value::Bool(builtins::is_alpha(s))),

        _ => return None,
    };
    Some(result)
}
