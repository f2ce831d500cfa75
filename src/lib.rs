// File: src/lib.rs
//
// Library interface for the Minipar interpreter.
// Exposes the pipeline stages for the binary and for integration tests.

pub mod ast;
pub mod builtins;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod symtable;

use errors::MiniparError;
use interpreter::{Interpreter, InterpreterConfig};

/// Scans, parses, checks and executes a program
pub fn run_source(source: &str, config: InterpreterConfig) -> Result<(), MiniparError> {
    run_pipeline(source, config, true)
}

/// Like `run_source`, optionally skipping semantic analysis
pub fn run_pipeline(source: &str, config: InterpreterConfig, check: bool) -> Result<(), MiniparError> {
    let module = parser::parse_source(source)?;
    if check {
        semantic::check(&module)?;
    } else {
        tracing::debug!("semantic analysis skipped");
    }

    tracing::info!(statements = module.root.len(), "executing program");
    let mut interpreter = Interpreter::with_config(config);
    interpreter.execute(&module)?;
    Ok(())
}

/// Scans, parses and checks a program without running it
pub fn check_source(source: &str) -> Result<(), MiniparError> {
    let module = parser::parse_source(source)?;
    semantic::check(&module)?;
    Ok(())
}
