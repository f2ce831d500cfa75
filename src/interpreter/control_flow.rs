// File: src/interpreter/control_flow.rs
//
// Control flow signals for loops and early returns.
//
// Every statement reports how execution should continue. Loops absorb Broke
// and Continued; function calls absorb Returned. Errors never travel through
// this type, they use Result.

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    /// Normal execution, continue to next statement
    Completed,
    /// Break statement encountered, exit the innermost loop
    Broke,
    /// Continue statement encountered, skip to next loop iteration
    Continued,
    /// Return statement encountered with its value
    Returned(super::Value),
}
