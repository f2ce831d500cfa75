// File: src/builtins.rs
//
// Default (built-in) functions of the Minipar standard library.
// The signature table is shared by every stage: the parser pre-registers the
// names, the semantic analyzer types calls with it, and the interpreter
// checks arity before dispatching to the native implementations.

use crate::ast::Type;
use once_cell::sync::Lazy;
use rand::Rng;
use std::collections::HashMap;

/// Static contract of one default function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSignature {
    pub name: &'static str,
    pub return_type: Type,
    pub min_args: usize,
    /// None means variadic
    pub max_args: Option<usize>,
}

impl BuiltinSignature {
    const fn new(name: &'static str, return_type: Type, min_args: usize, max_args: Option<usize>) -> Self {
        BuiltinSignature { name, return_type, min_args, max_args }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

const SIGNATURES: &[BuiltinSignature] = &[
    BuiltinSignature::new("print", Type::Void, 0, None),
    BuiltinSignature::new("len", Type::Num, 1, Some(1)),
    BuiltinSignature::new("to_num", Type::Num, 1, Some(1)),
    BuiltinSignature::new("to_string", Type::Str, 1, Some(1)),
    BuiltinSignature::new("to_bool", Type::Bool, 1, Some(1)),
    BuiltinSignature::new("isnum", Type::Bool, 1, Some(1)),
    BuiltinSignature::new("isalpha", Type::Bool, 1, Some(1)),
    BuiltinSignature::new("exp", Type::Num, 1, Some(1)),
    BuiltinSignature::new("randf", Type::Num, 0, Some(2)),
    BuiltinSignature::new("randi", Type::Num, 0, Some(2)),
    BuiltinSignature::new("input", Type::Str, 0, Some(1)),
    BuiltinSignature::new("sleep", Type::Void, 1, Some(1)),
];

static DEFAULT_FUNCTIONS: Lazy<HashMap<&'static str, BuiltinSignature>> =
    Lazy::new(|| SIGNATURES.iter().map(|sig| (sig.name, *sig)).collect());

/// Looks up the signature of a default function
pub fn signature(name: &str) -> Option<&'static BuiltinSignature> {
    DEFAULT_FUNCTIONS.get(name)
}

#[cfg(test)]
pub fn is_default_function(name: &str) -> bool {
    DEFAULT_FUNCTIONS.contains_key(name)
}

/// All default function names, in declaration order
pub fn default_function_names() -> impl Iterator<Item = &'static str> {
    SIGNATURES.iter().map(|sig| sig.name)
}

/// Math functions

pub fn exp(x: f64) -> f64 {
    x.exp()
}

/// Random number functions

/// Uniform float in [min, max)
pub fn random_float(min: f64, max: f64) -> Option<f64> {
    if !(min < max) || !min.is_finite() || !max.is_finite() {
        return None;
    }
    let mut rng = rand::thread_rng();
    Some(rng.gen_range(min..max))
}

/// Uniform integer in [min, max], both bounds inclusive
pub fn random_int(min: f64, max: f64) -> Option<f64> {
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let min_i = min.ceil() as i64;
    let max_i = max.floor() as i64;
    if min_i > max_i {
        return None;
    }
    let mut rng = rand::thread_rng();
    Some(rng.gen_range(min_i..=max_i) as f64)
}

/// String functions

pub fn str_len(s: &str) -> f64 {
    s.chars().count() as f64
}

pub fn is_num(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

pub fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

/// Parses numeric text, ignoring surrounding whitespace
pub fn parse_num(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_table() {
        assert!(is_default_function("print"));
        assert!(!is_default_function("printf"));
        let randi = signature("randi").expect("randi is a default function");
        assert!(randi.accepts(0) && randi.accepts(2));
        assert!(!randi.accepts(3));
        assert!(signature("print").map(|s| s.accepts(10)).unwrap_or(false));
        assert_eq!(default_function_names().count(), SIGNATURES.len());
    }

    #[test]
    fn test_random_ranges() {
        for _ in 0..200 {
            let f = random_float(2.0, 3.0).expect("valid range");
            assert!((2.0..3.0).contains(&f));
            let i = random_int(1.0, 3.0).expect("valid range");
            assert!([1.0, 2.0, 3.0].contains(&i));
        }
        assert_eq!(random_int(5.0, 5.0), Some(5.0));
        assert!(random_float(1.0, 1.0).is_none());
        assert!(random_int(3.0, 1.0).is_none());
    }

    #[test]
    fn test_string_predicates() {
        assert!(is_num("0123"));
        assert!(!is_num("12a"));
        assert!(!is_num(""));
        assert!(is_alpha("abc"));
        assert!(!is_alpha("ab1"));
        assert_eq!(parse_num(" 4.5 "), Some(4.5));
        assert_eq!(parse_num("four"), None);
    }
}
