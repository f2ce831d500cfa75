// File: src/errors.rs
//
// Error types for the Minipar pipeline.
// Each stage owns exactly one error type: the parser raises SyntaxError,
// the semantic analyzer raises SemanticError and the interpreter raises
// RunTimeError. MiniparError wraps all three for the driver and renders the
// category-specific report printed by the binary.

use colored::Colorize;
use thiserror::Error;

/// Malformed token sequence, detected by the parser
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

/// Well-formed tree that violates a static rule
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SemanticError {
    pub message: String,
    pub suggestion: Option<String>,
}

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), suggestion: None }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Precondition violated while executing a program
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RunTimeError {
    pub message: String,
}

impl RunTimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(format!("variable '{}' is not defined", name))
    }

    pub fn undefined_function(name: &str) -> Self {
        Self::new(format!("function '{}' is not defined", name))
    }
}

/// Any failure that reaches the driver
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MiniparError {
    #[error("Syntax Error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Semantic Error: {0}")]
    Semantic(#[from] SemanticError),
    #[error("Runtime Error: {0}")]
    Runtime(#[from] RunTimeError),
}

impl MiniparError {
    /// Category prefix used in reports
    pub fn category(&self) -> &'static str {
        match self {
            MiniparError::Syntax(_) => "Syntax Error",
            MiniparError::Semantic(_) => "Semantic Error",
            MiniparError::Runtime(_) => "Runtime Error",
        }
    }

    /// Pretty-printed report for the terminal
    pub fn report(&self) -> String {
        let mut out = String::new();
        let header = self.category().red().bold();
        match self {
            MiniparError::Syntax(e) => {
                out.push_str(&format!("{}: {}\n", header, e.message.bold()));
                out.push_str(&format!("{}\n", format!("  --> line {}", e.line).bright_blue()));
            }
            MiniparError::Semantic(e) => {
                out.push_str(&format!("{}: {}\n", header, e.message.bold()));
                if let Some(ref suggestion) = e.suggestion {
                    out.push_str(&format!(
                        "   {} {}\n",
                        "=".bright_green(),
                        format!("Did you mean '{}'?", suggestion).bright_green()
                    ));
                }
            }
            MiniparError::Runtime(e) => {
                out.push_str(&format!("{}: {}\n", header, e.message.bold()));
            }
        }
        out
    }
}

/// Computes the Levenshtein distance between two strings
/// Used for "Did you mean?" suggestions
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row dynamic programming
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut diagonal = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let above = row[j];
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            row[j] = (row[j] + 1).min(row[j - 1] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[b.len()]
}

/// Find the closest match from a list of candidates using Levenshtein distance
/// Returns None if no good match is found (distance > 2)
pub fn find_closest_match<'a, I>(target: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, usize)> = None;
    for candidate in candidates {
        let distance = levenshtein_distance(target, candidate);
        if distance <= 2 && best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("print", "print"), 0);
        assert_eq!(levenshtein_distance("prnt", "print"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_closest_match_respects_threshold() {
        let names = ["print", "len", "to_string"];
        assert_eq!(find_closest_match("prnt", names.iter().copied()), Some("print"));
        assert_eq!(find_closest_match("completely_else", names.iter().copied()), None);
    }

    #[test]
    fn test_error_categories() {
        let err: MiniparError = SyntaxError::new(3, "unexpected '}'").into();
        assert_eq!(err.category(), "Syntax Error");
        assert_eq!(err.to_string(), "Syntax Error: line 3: unexpected '}'");

        let err: MiniparError = RunTimeError::new("division by zero").into();
        assert_eq!(err.to_string(), "Runtime Error: division by zero");
    }
}
