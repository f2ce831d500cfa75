// File: src/interpreter/environment.rs
//
// Scope stack for variable management in the Minipar interpreter.
// Implements a stack of scopes where inner scopes shadow outer scopes.

use super::value::{lock_cell, new_cell, read_cell, Cell, Value};
use std::collections::HashMap;

/// Variable storage as a stack of scopes
///
/// Lookups search from the innermost scope (end of Vec) outward. Every name
/// maps to a shared Cell, so cloning an Environment copies the cell handles
/// and both copies keep mutating the same variables.
///
/// # Examples
///
/// ```ignore
/// let mut env = Environment::new();
/// env.define("x", Value::Number(10.0));       // Global scope
///
/// env.push_scope();                           // Enter function scope
/// env.define("x", Value::Number(20.0));       // Shadows outer x
/// assert_eq!(env.get("x"), Some(Value::Number(20.0)));
///
/// env.pop_scope();                            // Exit function scope
/// assert_eq!(env.get("x"), Some(Value::Number(10.0)));
/// ```
#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<HashMap<String, Cell>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create a new environment with a single global scope
    pub fn new() -> Self {
        Environment { scopes: vec![HashMap::new()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope; the global scope is never removed
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Cell bound to `name`, searching from inner to outer scopes
    pub fn get_cell(&self, name: &str) -> Option<Cell> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).cloned())
    }

    /// Current value of `name`
    pub fn get(&self, name: &str) -> Option<Value> {
        self.get_cell(name).map(|cell| read_cell(&cell))
    }

    /// Define a new variable in the innermost scope
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bind(name, new_cell(value));
    }

    /// Bind an existing cell under `name` in the innermost scope
    pub fn bind(&mut self, name: impl Into<String>, cell: Cell) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), cell);
        }
    }

    /// Assign to an existing variable, searching from inner to outer scopes.
    /// If not found, creates it in the innermost scope.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.get_cell(name) {
            Some(cell) => lock_cell(&cell).assign(value),
            None => self.define(name, value),
        }
    }

    /// Copy of the whole stack plus one fresh innermost scope.
    ///
    /// Existing variables stay shared with `self`; names defined in the copy
    /// are private to it.
    pub fn snapshot(&self) -> Environment {
        let mut copy = self.clone();
        copy.push_scope();
        copy
    }
}
