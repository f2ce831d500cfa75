// File: src/interpreter/native_functions/math.rs
//
// Math-related native functions

use super::num_arg;
use crate::builtins;
use crate::errors::RunTimeError;
use crate::interpreter::Value;

/// Upper bound of randi when called without a maximum
const RANDI_DEFAULT_MAX: f64 = i32::MAX as f64;

/// Handle math-related function calls
/// Returns Some(result) if the function was handled, None if not recognized
pub fn handle(name: &str, arg_values: &[Value]) -> Option<Result<Value, RunTimeError>> {
    let result = match name {
        "exp" => num_arg(name, arg_values, 0).map(|x| Value::Number(builtins::exp(x))),

        // randf(), randf(max), randf(min, max)
        "randf" => range_args(name, arg_values, 1.0).and_then(|(min, max)| {
            builtins::random_float(min, max).map(Value::Number).ok_or_else(|| empty_range(name, min, max))
        }),

        // randi(), randi(max), randi(min, max); both bounds inclusive
        "randi" => range_args(name, arg_values, RANDI_DEFAULT_MAX).and_then(|(min, max)| {
            builtins::random_int(min, max).map(Value::Number).ok_or_else(|| empty_range(name, min, max))
        }),

        _ => return None,
    };
    Some(result)
}

fn range_args(name: &str, arg_values: &[Value], default_max: f64) -> Result<(f64, f64), RunTimeError> {
    match arg_values.len() {
        0 => Ok((0.0, default_max)),
        1 => Ok((0.0, num_arg(name, arg_values, 0)?)),
        _ => Ok((num_arg(name, arg_values, 0)?, num_arg(name, arg_values, 1)?)),
    }
}

fn empty_range(name: &str, min: f64, max: f64) -> RunTimeError {
    RunTimeError::new(format!("{} received an empty range [{}, {}]", name, min, max))
}
