// File: src/semantic.rs
//
// Semantic analyzer for the Minipar language.
// Validates types and statement contexts on the AST before interpretation.
//
// Features:
// - Type evaluation for every expression form
// - Context rules for return, break, continue and function definitions
// - Scoped variable types recorded from declarations, parameters and first
//   assignments
// - Gradual typing: expressions whose type cannot be known statically (array
//   elements, names bound by the caller at runtime) are compatible with
//   every type
//
// The analyzer is fail-fast: the first violation is returned as a
// SemanticError and the tree is never modified.

use crate::ast::{
    ArithmeticOp, ConstKind, Expr, FunctionDef, Module, RelationalOp, Stmt, Type, UnaryOp,
};
use crate::builtins;
use crate::errors::{find_closest_match, SemanticError};
use std::collections::HashMap;

/// Static type of an expression; None is the unknown type
type StaticType = Option<Type>;

type CheckResult<T> = Result<T, SemanticError>;

/// Ancestor statements relevant to context rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Function(Type),
    If,
    While,
    Par,
    Seq,
}

fn compatible(a: StaticType, b: StaticType) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

fn is(ty: StaticType, expected: Type) -> bool {
    compatible(ty, Some(expected))
}

fn describe(ty: StaticType) -> String {
    ty.map_or_else(|| "unknown".to_string(), |t| t.to_string())
}

/// Semantic analyzer holding the function table, the context stack and the
/// scoped variable types
pub struct SemanticAnalyzer<'a> {
    functions: HashMap<&'a str, &'a FunctionDef>,
    context_stack: Vec<Context>,
    scope_stack: Vec<HashMap<&'a str, StaticType>>,
}

impl<'a> Default for SemanticAnalyzer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new() -> Self {
        SemanticAnalyzer {
            functions: HashMap::new(),
            context_stack: Vec::new(),
            scope_stack: vec![HashMap::new()],
        }
    }

    /// Checks a whole module; the first violation wins
    pub fn check(&mut self, module: &'a Module) -> CheckResult<()> {
        tracing::debug!(statements = module.root.len(), "semantic analysis started");
        self.check_block(&module.root)
    }

    fn check_block(&mut self, stmts: &'a [Stmt]) -> CheckResult<()> {
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    /// Runs `body` inside a pushed context and variable scope
    fn nested(&mut self, context: Context, body: &'a [Stmt]) -> CheckResult<()> {
        self.context_stack.push(context);
        self.scope_stack.push(HashMap::new());
        let result = self.check_block(body);
        self.scope_stack.pop();
        self.context_stack.pop();
        result
    }

    fn check_stmt(&mut self, stmt: &'a Stmt) -> CheckResult<()> {
        match stmt {
            Stmt::Assign { target, value } => self.check_assign(target, value),

            Stmt::Return(expr) => {
                let Some(return_type) = self.enclosing_function() else {
                    return Err(SemanticError::new("'return' found outside of a function declaration"));
                };
                let ty = match expr {
                    Some(e) => self.evaluate(e)?,
                    None => Some(Type::Void),
                };
                if !is(ty, return_type) {
                    return Err(SemanticError::new(format!(
                        "return value of type {} does not match the declared return type {}",
                        describe(ty),
                        return_type
                    )));
                }
                Ok(())
            }

            Stmt::Break => self.require_loop("break"),
            Stmt::Continue => self.require_loop("continue"),

            Stmt::FunctionDef(def) => self.check_function(def),

            Stmt::If { cond, then_body, else_body } => {
                self.require_bool(cond, "if")?;
                self.nested(Context::If, then_body)?;
                if let Some(else_body) = else_body {
                    self.nested(Context::If, else_body)?;
                }
                Ok(())
            }

            Stmt::While { cond, body } => {
                self.require_bool(cond, "while")?;
                self.nested(Context::While, body)
            }

            Stmt::Par(body) => {
                if body.iter().any(|s| !matches!(s, Stmt::Expr(Expr::Call { .. }))) {
                    return Err(SemanticError::new("only function calls are allowed inside a 'par' block"));
                }
                self.nested(Context::Par, body)
            }

            Stmt::Seq { body, is_scope_block } => {
                if *is_scope_block {
                    self.nested(Context::Seq, body)
                } else {
                    self.check_block(body)
                }
            }

            Stmt::ClientChannelDecl { name, host, port } => self.check_endpoint(name, host, port),

            Stmt::ServerChannelDecl { name, host, port, handler, description } => {
                let Some(def) = self.functions.get(handler.as_str()).copied() else {
                    return Err(self.unknown_function(handler));
                };
                if def.return_type != Type::Str {
                    return Err(SemanticError::new(format!(
                        "handler '{}' of '{}' must return string",
                        handler, name
                    )));
                }
                if def.required_params() > 1 || def.params.is_empty() {
                    return Err(SemanticError::new(format!(
                        "handler '{}' of '{}' must accept exactly one message argument",
                        handler, name
                    )));
                }
                let ty = self.evaluate(description)?;
                if !is(ty, Type::Str) {
                    return Err(SemanticError::new(format!("description of '{}' must be a string", name)));
                }
                self.check_endpoint(name, host, port)
            }

            Stmt::ArrayDecl { name, dimensions } => {
                for dim in dimensions {
                    let ty = self.evaluate(dim)?;
                    if !is(ty, Type::Num) {
                        return Err(SemanticError::new(format!(
                            "size of array '{}' must be num, found {}",
                            name,
                            describe(ty)
                        )));
                    }
                }
                self.declare(name, Some(Type::Array));
                Ok(())
            }

            Stmt::Expr(expr) => self.evaluate(expr).map(|_| ()),
        }
    }

    fn check_function(&mut self, def: &'a FunctionDef) -> CheckResult<()> {
        if self
            .context_stack
            .iter()
            .any(|c| matches!(c, Context::If | Context::While | Context::Par))
        {
            return Err(SemanticError::new(format!(
                "function '{}' cannot be declared inside a local block",
                def.name
            )));
        }
        // First definition wins; registering before the body allows recursion
        self.functions.entry(def.name.as_str()).or_insert(def);

        let mut params = HashMap::new();
        for param in &def.params {
            if let Some(default) = &param.default {
                let ty = self.evaluate(default)?;
                if !is(ty, param.ty) {
                    return Err(SemanticError::new(format!(
                        "default value of parameter '{}' must be {}, found {}",
                        param.name,
                        param.ty,
                        describe(ty)
                    )));
                }
            }
            params.insert(param.name.as_str(), Some(param.ty));
        }

        self.context_stack.push(Context::Function(def.return_type));
        self.scope_stack.push(params);
        let result = self.check_block(&def.body);
        self.scope_stack.pop();
        self.context_stack.pop();
        result
    }

    fn check_assign(&mut self, target: &'a Expr, value: &'a Expr) -> CheckResult<()> {
        let right = self.evaluate(value)?;

        let (name, left) = match target {
            Expr::Identifier { declared_type: Some(ty), name, is_declaration: true } => {
                if !self.assignable(Some(*ty), right) {
                    return Err(self.type_mismatch(name, Some(*ty), right));
                }
                self.declare(name, Some(*ty));
                return Ok(());
            }
            Expr::Identifier { name, .. } => match self.lookup(name) {
                Some(ty) => (name.as_str(), ty),
                None => {
                    self.declare(name, right);
                    return Ok(());
                }
            },
            Expr::IndexAccess { .. } => ("array element", self.evaluate(target)?),
            _ => {
                return Err(SemanticError::new(
                    "assignment target must be a variable or an array element",
                ))
            }
        };

        if !self.assignable(left, right) {
            return Err(self.type_mismatch(name, left, right));
        }
        Ok(())
    }

    /// Right type equals left type; `num := string` is allowed
    fn assignable(&self, left: StaticType, right: StaticType) -> bool {
        compatible(left, right) || (left == Some(Type::Num) && right == Some(Type::Str))
    }

    fn type_mismatch(&self, name: &str, left: StaticType, right: StaticType) -> SemanticError {
        SemanticError::new(format!(
            "(Type Error) {} expects {}, but received {}",
            name,
            describe(left),
            describe(right)
        ))
    }

    fn check_endpoint(&mut self, name: &str, host: &'a Expr, port: &'a Expr) -> CheckResult<()> {
        let host_ty = self.evaluate(host)?;
        if !is(host_ty, Type::Str) {
            return Err(SemanticError::new(format!("host of '{}' must be a string", name)));
        }
        let port_ty = self.evaluate(port)?;
        if !is(port_ty, Type::Num) {
            return Err(SemanticError::new(format!("port of '{}' must be num", name)));
        }
        Ok(())
    }

    fn require_bool(&mut self, cond: &'a Expr, keyword: &str) -> CheckResult<()> {
        let ty = self.evaluate(cond)?;
        if !is(ty, Type::Bool) {
            return Err(SemanticError::new(format!(
                "condition of '{}' must be bool, found {}",
                keyword,
                describe(ty)
            )));
        }
        Ok(())
    }

    /// Searches for a While between here and the nearest function boundary
    fn require_loop(&self, keyword: &str) -> CheckResult<()> {
        for context in self.context_stack.iter().rev() {
            match context {
                Context::While => return Ok(()),
                Context::Function(_) => break,
                _ => {}
            }
        }
        Err(SemanticError::new(format!("'{}' found outside of a loop", keyword)))
    }

    fn enclosing_function(&self) -> Option<Type> {
        self.context_stack.iter().rev().find_map(|c| match c {
            Context::Function(ty) => Some(*ty),
            _ => None,
        })
    }

    fn declare(&mut self, name: &'a str, ty: StaticType) {
        if let Some(scope) = self.scope_stack.last_mut() {
            scope.insert(name, ty);
        }
    }

    /// Outer None: not declared; inner None: declared with unknown type
    fn lookup(&self, name: &str) -> Option<StaticType> {
        self.scope_stack.iter().rev().find_map(|scope| scope.get(name).copied())
    }

    fn unknown_function(&self, name: &str) -> SemanticError {
        // default functions first, then user functions by name; ties keep the earliest
        let mut user: Vec<&str> = self.functions.keys().copied().collect();
        user.sort_unstable();
        let mut candidates: Vec<&str> = Vec::new();
        for builtin in builtins::default_function_names() {
            candidates.push(builtin);
        }
        candidates.extend(user);
        let error = SemanticError::new(format!("function '{}' is not declared", name));
        match find_closest_match(name, candidates) {
            Some(suggestion) => error.with_suggestion(suggestion),
            None => error,
        }
    }

    /// Evaluates the static type of an expression
    fn evaluate(&mut self, expr: &'a Expr) -> CheckResult<StaticType> {
        match expr {
            Expr::Constant { kind, .. } => Ok(Some(match kind {
                ConstKind::Num => Type::Num,
                ConstKind::Str => Type::Str,
                ConstKind::Bool => Type::Bool,
            })),

            Expr::Identifier { declared_type: Some(ty), .. } => Ok(Some(*ty)),
            Expr::Identifier { name, .. } => Ok(self.lookup(name).flatten()),

            Expr::IndexAccess { base, index } => {
                let base_ty = self.evaluate(base)?;
                let index_ty = self.evaluate(index)?;
                if !is(index_ty, Type::Num) {
                    return Err(SemanticError::new(format!("index must be num, found {}", describe(index_ty))));
                }
                match base_ty {
                    Some(Type::Str) => Ok(Some(Type::Str)),
                    Some(Type::Array) | None => Ok(None),
                    Some(other) => Err(SemanticError::new(format!(
                        "index access is only valid on strings and arrays, found {}",
                        other
                    ))),
                }
            }

            Expr::Logical { op, left, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                if !is(l, Type::Bool) || !is(r, Type::Bool) {
                    return Err(SemanticError::new(format!(
                        "(Type Error) expected bool, but found {} and {} in operation {}",
                        describe(l),
                        describe(r),
                        op
                    )));
                }
                Ok(Some(Type::Bool))
            }

            Expr::Relational { op, left, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                let valid = match op {
                    RelationalOp::Eq | RelationalOp::Neq => compatible(l, r),
                    _ => is(l, Type::Num) && is(r, Type::Num),
                };
                if !valid {
                    let expected = match op {
                        RelationalOp::Eq | RelationalOp::Neq => "equal types",
                        _ => "num",
                    };
                    return Err(SemanticError::new(format!(
                        "(Type Error) expected {}, but found {} and {} in operation {}",
                        expected,
                        describe(l),
                        describe(r),
                        op
                    )));
                }
                Ok(Some(Type::Bool))
            }

            Expr::Arithmetic { op, left, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                let valid = match op {
                    ArithmeticOp::Add => compatible(l, r),
                    _ => is(l, Type::Num) && is(r, Type::Num),
                };
                if !valid {
                    let expected = if *op == ArithmeticOp::Add { "equal types" } else { "num" };
                    return Err(SemanticError::new(format!(
                        "(Type Error) expected {}, but found {} and {} in operation {}",
                        expected,
                        describe(l),
                        describe(r),
                        op
                    )));
                }
                Ok(l.or(r))
            }

            Expr::Unary { op, operand, .. } => {
                if matches!(op, UnaryOp::Inc | UnaryOp::Dec)
                    && !matches!(**operand, Expr::Identifier { .. } | Expr::IndexAccess { .. })
                {
                    return Err(SemanticError::new(format!(
                        "operand of {} must be a variable or an array element",
                        op
                    )));
                }
                let ty = self.evaluate(operand)?;
                let expected = match op {
                    UnaryOp::Not => Type::Bool,
                    UnaryOp::Neg | UnaryOp::Inc | UnaryOp::Dec => Type::Num,
                };
                if !is(ty, expected) {
                    return Err(SemanticError::new(format!(
                        "(Type Error) expected {}, but found {} in operation {}",
                        expected,
                        describe(ty),
                        op
                    )));
                }
                Ok(Some(expected))
            }

            Expr::Call { args, name, .. } => {
                for arg in args {
                    self.evaluate(arg)?;
                }
                if let Some(def) = self.functions.get(name.as_str()).copied() {
                    if args.len() < def.required_params() || args.len() > def.params.len() {
                        return Err(SemanticError::new(format!(
                            "function '{}' expects {} to {} arguments, but received {}",
                            name,
                            def.required_params(),
                            def.params.len(),
                            args.len()
                        )));
                    }
                    return Ok(Some(def.return_type));
                }
                match builtins::signature(name) {
                    Some(sig) if sig.accepts(args.len()) => Ok(Some(sig.return_type)),
                    Some(_) => Err(SemanticError::new(format!(
                        "wrong number of arguments for default function '{}': {}",
                        name,
                        args.len()
                    ))),
                    None => Err(self.unknown_function(name)),
                }
            }

            Expr::ArrayLiteral(elements) => {
                let mut element_ty: StaticType = None;
                for element in elements {
                    let ty = self.evaluate(element)?;
                    if !compatible(element_ty, ty) {
                        return Err(SemanticError::new(format!(
                            "array elements must share one type, found {} and {}",
                            describe(element_ty),
                            describe(ty)
                        )));
                    }
                    element_ty = element_ty.or(ty);
                }
                Ok(Some(Type::Array))
            }
        }
    }
}

/// Convenience wrapper around `SemanticAnalyzer::check`
pub fn check(module: &Module) -> CheckResult<()> {
    SemanticAnalyzer::new().check(module)
}
