// File: src/interpreter/native_functions/io.rs
//
// I/O-related native functions (print, input, sleep)

use super::{num_arg, str_arg};
use crate::errors::RunTimeError;
use crate::interpreter::{Interpreter, Value};
use std::io::BufRead;
use std::time::Duration;

/// Handle I/O-related function calls
/// Returns Some(result) if the function was handled, None if not recognized
pub fn handle(interp: &Interpreter<'_>, name: &str, arg_values: &[Value]) -> Option<Result<Value, RunTimeError>> {
    let result = match name {
        "print" => {
            for value in arg_values {
                interp.write_output(&value.to_string());
            }
            Ok(Value::Str(String::new()))
        }
        "input" => input(interp, arg_values),
        "sleep" => num_arg(name, arg_values, 0).and_then(|seconds| {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(RunTimeError::new(format!("sleep expects a non-negative duration, found {}", seconds)));
            }
            std::thread::sleep(Duration::from_secs_f64(seconds));
            Ok(Value::Str(String::new()))
        }),
        _ => return None,
    };
    Some(result)
}

fn input(interp: &Interpreter<'_>, arg_values: &[Value]) -> Result<Value, RunTimeError> {
    if !arg_values.is_empty() {
        interp.write_prompt(str_arg("input", arg_values, 0)?);
    }
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| RunTimeError::new(format!("failed to read input: {}", e)))?;
    let trimmed = line.trim_end_matches(&['\n', '\r'][..]).len();
    line.truncate(trimmed);
    Ok(Value::Str(line))
}
