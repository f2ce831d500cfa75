// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for the Minipar language.
// Executes Minipar programs by traversing the Abstract Syntax Tree (AST).
//
// The interpreter keeps a function table filled by a first pass over the
// module, evaluates expressions to produce values, and executes statements
// against an explicit scope stack (Environment) passed to every call. It
// supports:
// - Variable binding and mutation through shared cells
// - Function calls with dynamic scoping and default parameters
// - Arrays passed by reference when the argument is a bare identifier
// - Control flow (if/else, while, break, continue, return)
// - par blocks executed on scoped OS threads
// - c_channel registration and s_channel TCP request handlers
//
// Failures are RunTimeErrors propagated with `?`; loop and return signals
// travel separately as Flow values.

mod control_flow;
mod environment;
mod native_functions;
mod value;

pub use environment::Environment;
pub use value::{build_array, format_number, new_cell, read_cell, Cell, Value};

use control_flow::Flow;
use value::lock_cell;

use crate::ast::{
    ArithmeticOp, ConstKind, Expr, FunctionDef, LogicalOp, Module, RelationalOp, Stmt, Type,
    UnaryOp,
};
use crate::builtins;
use crate::errors::RunTimeError;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

type ExecResult<T> = Result<T, RunTimeError>;

/// Bytes read from each s_channel connection unless configured otherwise
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 1024;

/// Runtime settings for one interpreter
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Maximum bytes read from one s_channel request
    pub recv_buffer_size: usize,
    /// Stop s_channel servers after this many connections; None serves forever
    pub max_connections: Option<usize>,
    /// Capture sink for program output; None writes to stdout
    pub output: Option<Arc<Mutex<Vec<u8>>>>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            max_connections: None,
            output: None,
        }
    }
}

impl InterpreterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size.max(1);
        self
    }

    pub fn with_max_connections(mut self, limit: usize) -> Self {
        self.max_connections = Some(limit);
        self
    }

    pub fn with_output(mut self, output: Arc<Mutex<Vec<u8>>>) -> Self {
        self.output = Some(output);
        self
    }
}

/// Validated endpoint recorded for a declared channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub host: String,
    pub port: u16,
}

/// Call argument after evaluation in the caller's scope
pub(crate) enum Argument {
    /// Independent copy of the value
    Copied(Value),
    /// The caller's own cell (arrays passed by name)
    Shared(Cell),
}

/// Main interpreter that executes Minipar programs
pub struct Interpreter<'a> {
    functions: HashMap<&'a str, &'a FunctionDef>,
    channels: Mutex<HashMap<String, ChannelInfo>>,
    config: InterpreterConfig,
}

impl Default for Interpreter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter with the default configuration
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Interpreter { functions: HashMap::new(), channels: Mutex::new(HashMap::new()), config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Endpoint registered by a c_channel or s_channel declaration
    pub fn channel(&self, name: &str) -> Option<ChannelInfo> {
        self.lock_channels().get(name).cloned()
    }

    fn lock_channels(&self) -> MutexGuard<'_, HashMap<String, ChannelInfo>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs a whole module in a fresh global scope
    pub fn execute(&mut self, module: &'a Module) -> ExecResult<()> {
        self.register_functions(&module.root);
        tracing::debug!(functions = self.functions.len(), "function table ready");

        let mut env = Environment::new();
        match self.execute_block(&module.root, &mut env)? {
            Flow::Broke => Err(RunTimeError::new("'break' outside of a loop")),
            Flow::Continued => Err(RunTimeError::new("'continue' outside of a loop")),
            Flow::Completed | Flow::Returned(_) => Ok(()),
        }
    }

    /// First pass: records every function definition, first one wins
    fn register_functions(&mut self, stmts: &'a [Stmt]) {
        for stmt in stmts {
            match stmt {
                Stmt::FunctionDef(def) => {
                    self.functions.entry(def.name.as_str()).or_insert(def);
                    self.register_functions(&def.body);
                }
                Stmt::Seq { body, .. } => self.register_functions(body),
                _ => {}
            }
        }
    }

    /// Helper to write a line to either the output buffer or stdout
    pub(crate) fn write_output(&self, msg: &str) {
        match &self.config.output {
            Some(out) => {
                let mut buffer = out.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = writeln!(buffer, "{}", msg);
            }
            None => println!("{}", msg),
        }
    }

    /// Writes without a trailing newline and flushes (input prompts)
    pub(crate) fn write_prompt(&self, msg: &str) {
        match &self.config.output {
            Some(out) => {
                let mut buffer = out.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = write!(buffer, "{}", msg);
            }
            None => {
                let mut stdout = std::io::stdout();
                let _ = write!(stdout, "{}", msg);
                let _ = stdout.flush();
            }
        }
    }

    // --- statements ---

    fn execute_block(&self, stmts: &'a [Stmt], env: &mut Environment) -> ExecResult<Flow> {
        for stmt in stmts {
            let flow = self.execute_stmt(stmt, env)?;
            if flow != Flow::Completed {
                return Ok(flow);
            }
        }
        Ok(Flow::Completed)
    }

    /// Executes `stmts` inside a pushed scope
    fn execute_scoped(&self, stmts: &'a [Stmt], env: &mut Environment) -> ExecResult<Flow> {
        env.push_scope();
        let result = self.execute_block(stmts, env);
        env.pop_scope();
        result
    }

    fn execute_stmt(&self, stmt: &'a Stmt, env: &mut Environment) -> ExecResult<Flow> {
        match stmt {
            Stmt::Assign { target, value } => {
                self.assign(target, value, env)?;
                Ok(Flow::Completed)
            }

            Stmt::Return(expr) => {
                let value = match expr {
                    Some(e) => self.evaluate(e, env)?,
                    None => Value::Str(String::new()),
                };
                Ok(Flow::Returned(value))
            }

            Stmt::Break => Ok(Flow::Broke),
            Stmt::Continue => Ok(Flow::Continued),

            // Registered by the first pass
            Stmt::FunctionDef(_) => Ok(Flow::Completed),

            Stmt::If { cond, then_body, else_body } => {
                if self.evaluate(cond, env)?.is_truthy() {
                    self.execute_scoped(then_body, env)
                } else if let Some(else_body) = else_body {
                    self.execute_scoped(else_body, env)
                } else {
                    Ok(Flow::Completed)
                }
            }

            Stmt::While { cond, body } => {
                while self.evaluate(cond, env)?.is_truthy() {
                    match self.execute_scoped(body, env)? {
                        Flow::Broke => break,
                        Flow::Completed | Flow::Continued => {}
                        returned @ Flow::Returned(_) => return Ok(returned),
                    }
                }
                Ok(Flow::Completed)
            }

            Stmt::Par(body) => self.execute_par(body, env),

            Stmt::Seq { body, is_scope_block } => {
                if *is_scope_block {
                    self.execute_scoped(body, env)
                } else {
                    self.execute_block(body, env)
                }
            }

            Stmt::ClientChannelDecl { name, host, port } => {
                let info = self.endpoint(name, host, port, env)?;
                tracing::info!(channel = %name, host = %info.host, port = info.port, "client channel registered");
                self.lock_channels().insert(name.clone(), info);
                Ok(Flow::Completed)
            }

            Stmt::ServerChannelDecl { name, host, port, handler, description } => {
                let def = self
                    .functions
                    .get(handler.as_str())
                    .copied()
                    .ok_or_else(|| RunTimeError::undefined_function(handler))?;
                let description = self.evaluate(description, env)?.to_string();
                let info = self.endpoint(name, host, port, env)?;
                self.lock_channels().insert(name.clone(), info.clone());
                native_functions::network::serve(self, name, &description, &info, def, env)?;
                Ok(Flow::Completed)
            }

            Stmt::ArrayDecl { name, dimensions } => {
                let mut sizes = Vec::with_capacity(dimensions.len());
                for dim in dimensions {
                    match self.evaluate(dim, env)? {
                        Value::Number(n) if n >= 0.0 && n.fract() == 0.0 && n.is_finite() => {
                            sizes.push(n as usize)
                        }
                        other => {
                            return Err(RunTimeError::new(format!(
                                "array size of '{}' must be a non-negative integer, found {}",
                                name, other
                            )))
                        }
                    }
                }
                env.define(name.as_str(), build_array(&sizes));
                Ok(Flow::Completed)
            }

            Stmt::Expr(expr) => {
                self.evaluate(expr, env)?;
                Ok(Flow::Completed)
            }
        }
    }

    /// Runs every child on its own scoped thread and joins them all.
    ///
    /// Each child works on a snapshot of the enclosing scope stack: updates
    /// to existing variables are shared, new names stay private.
    fn execute_par(&self, body: &'a [Stmt], env: &Environment) -> ExecResult<Flow> {
        tracing::debug!(tasks = body.len(), "entering par block");
        let results: Vec<ExecResult<Flow>> = thread::scope(|scope| {
            let handles: Vec<_> = body
                .iter()
                .map(|stmt| {
                    let mut child_env = env.snapshot();
                    scope.spawn(move || self.execute_stmt(stmt, &mut child_env))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(RunTimeError::new("a parallel task panicked")))
                })
                .collect()
        });

        for result in results {
            result?;
        }
        Ok(Flow::Completed)
    }

    fn assign(&self, target: &'a Expr, value: &'a Expr, env: &mut Environment) -> ExecResult<()> {
        let value = self.evaluate(value, env)?;
        match target {
            Expr::Identifier { declared_type, name, is_declaration: true } => {
                let value = match (declared_type, value) {
                    (Some(Type::Num), Value::Str(text)) => text_to_num(name, &text)?,
                    (_, value) => value,
                };
                env.define(name.as_str(), value);
            }
            Expr::Identifier { name, .. } => {
                let holds_num = env.get_cell(name).is_some_and(|cell| {
                    let current = lock_cell(&cell);
                    matches!(*current, Value::Number(_))
                });
                let value = match value {
                    Value::Str(text) if holds_num => text_to_num(name, &text)?,
                    value => value,
                };
                env.set(name, value);
            }
            Expr::IndexAccess { .. } => {
                let (cell, indices) = self.resolve_target(target, env)?;
                with_element(&cell, &indices, |slot| {
                    *slot = value;
                    Ok(())
                })?;
            }
            _ => {
                return Err(RunTimeError::new(
                    "assignment target must be a variable or an array element",
                ))
            }
        }
        Ok(())
    }

    /// Resolves an identifier or index chain to its cell and evaluated indices
    fn resolve_target(&self, target: &'a Expr, env: &mut Environment) -> ExecResult<(Cell, Vec<Value>)> {
        let mut index_exprs = Vec::new();
        let mut current = target;
        while let Expr::IndexAccess { base, index } = current {
            index_exprs.push(index.as_ref());
            current = base;
        }
        let Expr::Identifier { name, .. } = current else {
            return Err(RunTimeError::new("expected a variable or an array element"));
        };

        let mut indices = Vec::with_capacity(index_exprs.len());
        for index in index_exprs.into_iter().rev() {
            indices.push(self.evaluate(index, env)?);
        }
        let cell = env.get_cell(name).ok_or_else(|| RunTimeError::undefined_variable(name))?;
        Ok((cell, indices))
    }

    fn endpoint(&self, name: &str, host: &'a Expr, port: &'a Expr, env: &mut Environment) -> ExecResult<ChannelInfo> {
        let host = match self.evaluate(host, env)? {
            Value::Str(host) => host,
            other => {
                return Err(RunTimeError::new(format!(
                    "host of channel '{}' must be a string, found {}",
                    name,
                    other.type_name()
                )))
            }
        };
        let port = match self.evaluate(port, env)? {
            Value::Number(n) if n.fract() == 0.0 && (0.0..=65535.0).contains(&n) => n as u16,
            other => {
                return Err(RunTimeError::new(format!(
                    "port of channel '{}' must be an integer between 0 and 65535, found {}",
                    name, other
                )))
            }
        };
        Ok(ChannelInfo { host, port })
    }

    // --- expressions ---

    fn evaluate(&self, expr: &'a Expr, env: &mut Environment) -> ExecResult<Value> {
        match expr {
            Expr::Constant { kind, literal } => match kind {
                ConstKind::Num => literal
                    .parse::<f64>()
                    .map(Value::Number)
                    .map_err(|_| RunTimeError::new(format!("invalid numeric literal '{}'", literal))),
                ConstKind::Str => Ok(Value::Str(unescape(literal))),
                ConstKind::Bool => Ok(Value::Bool(literal == "true")),
            },

            Expr::Identifier { name, .. } => {
                env.get(name).ok_or_else(|| RunTimeError::undefined_variable(name))
            }

            Expr::IndexAccess { base, index } => {
                if expr.root_name().is_some() {
                    let (cell, indices) = self.resolve_target(expr, env)?;
                    return read_element(&cell, &indices);
                }
                let base = self.evaluate(base, env)?;
                let index = self.evaluate(index, env)?;
                index_value(base, &index)
            }

            Expr::Logical { op, left, right } => {
                let left = self.evaluate(left, env)?.is_truthy();
                let result = match op {
                    LogicalOp::And => left && self.evaluate(right, env)?.is_truthy(),
                    LogicalOp::Or => left || self.evaluate(right, env)?.is_truthy(),
                };
                Ok(Value::Bool(result))
            }

            Expr::Relational { op, left, right } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                relational(*op, left, right)
            }

            Expr::Arithmetic { op, left, right } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                arithmetic(*op, left, right)
            }

            Expr::Unary { op, operand, is_postfix } => match op {
                UnaryOp::Neg => match self.evaluate(operand, env)? {
                    Value::Number(n) => Ok(Value::Number(-n)),
                    other => Err(RunTimeError::new(format!(
                        "operator - requires num, found {}",
                        other.type_name()
                    ))),
                },
                UnaryOp::Not => match self.evaluate(operand, env)? {
                    Value::Bool(b) => Ok(Value::Bool(!b)),
                    other => Err(RunTimeError::new(format!(
                        "operator ! requires bool, found {}",
                        other.type_name()
                    ))),
                },
                UnaryOp::Inc | UnaryOp::Dec => self.increment(*op, operand, *is_postfix, env),
            },

            Expr::Call { args, name, .. } => self.call_function(name, args, env),

            Expr::ArrayLiteral(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element, env)?);
                }
                Ok(Value::Array(values))
            }
        }
    }

    /// `++`/`--` on a numeric variable or array element; postfix yields the
    /// old value, prefix the new one
    fn increment(&self, op: UnaryOp, operand: &'a Expr, is_postfix: bool, env: &mut Environment) -> ExecResult<Value> {
        if !matches!(operand, Expr::Identifier { .. } | Expr::IndexAccess { .. }) {
            return Err(RunTimeError::new(format!(
                "operator {} requires a variable or an array element",
                op
            )));
        }
        let (cell, indices) = self.resolve_target(operand, env)?;
        with_element(&cell, &indices, |slot| match slot {
            Value::Number(n) => {
                let old = *n;
                *n = if op == UnaryOp::Inc { old + 1.0 } else { old - 1.0 };
                Ok(Value::Number(if is_postfix { old } else { *n }))
            }
            other => Err(RunTimeError::new(format!(
                "operator {} requires num, found {}",
                op,
                other.type_name()
            ))),
        })
    }

    // --- calls ---

    /// Resolves a call: default functions first, then user functions
    fn call_function(&self, name: &str, args: &'a [Expr], env: &mut Environment) -> ExecResult<Value> {
        if let Some(signature) = builtins::signature(name) {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(self.evaluate(arg, env)?);
            }
            if !signature.accepts(values.len()) {
                return Err(RunTimeError::new(format!(
                    "wrong number of arguments for '{}': {}",
                    name,
                    values.len()
                )));
            }
            return native_functions::call_native_function(self, name, &values);
        }

        let def = self
            .functions
            .get(name)
            .copied()
            .ok_or_else(|| RunTimeError::undefined_function(name))?;

        let mut arguments = Vec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.argument(arg, env)?);
        }
        self.invoke(def, arguments, env)
    }

    /// A bare identifier holding an array is passed as the caller's cell;
    /// everything else is evaluated and copied
    fn argument(&self, arg: &'a Expr, env: &mut Environment) -> ExecResult<Argument> {
        if let Expr::Identifier { name, .. } = arg {
            if let Some(cell) = env.get_cell(name) {
                if matches!(*lock_cell(&cell), Value::Array(_)) {
                    return Ok(Argument::Shared(cell));
                }
            }
        }
        self.evaluate(arg, env).map(Argument::Copied)
    }

    /// Invokes a user function in a new scope pushed on the caller's stack
    pub(crate) fn invoke(&self, def: &'a FunctionDef, args: Vec<Argument>, env: &mut Environment) -> ExecResult<Value> {
        if args.len() > def.params.len() {
            return Err(RunTimeError::new(format!(
                "function '{}' expects {} arguments, but received {}",
                def.name,
                def.params.len(),
                args.len()
            )));
        }
        env.push_scope();
        let result = self.run_function_body(def, args, env);
        env.pop_scope();
        result
    }

    fn run_function_body(&self, def: &'a FunctionDef, args: Vec<Argument>, env: &mut Environment) -> ExecResult<Value> {
        let supplied = args.len();
        for (param, arg) in def.params.iter().zip(args) {
            match arg {
                Argument::Copied(value) => env.define(param.name.as_str(), value),
                Argument::Shared(cell) => env.bind(param.name.as_str(), cell),
            }
        }
        // Defaults see the parameters bound before them
        for param in &def.params[supplied..] {
            let Some(default) = &param.default else {
                return Err(RunTimeError::new(format!(
                    "missing argument '{}' in call to '{}'",
                    param.name, def.name
                )));
            };
            let value = self.evaluate(default, env)?;
            env.define(param.name.as_str(), value);
        }

        match self.execute_block(&def.body, env)? {
            Flow::Returned(value) => Ok(value),
            Flow::Completed => Ok(Value::Str(String::new())),
            Flow::Broke | Flow::Continued => Err(RunTimeError::new(format!(
                "'break' or 'continue' outside of a loop in function '{}'",
                def.name
            ))),
        }
    }
}

/// Walks `indices` under the cell's lock and applies `f` to the element
fn with_element<T>(
    cell: &Cell,
    indices: &[Value],
    f: impl FnOnce(&mut Value) -> ExecResult<T>,
) -> ExecResult<T> {
    let mut guard = lock_cell(cell);
    let mut slot: &mut Value = &mut guard;
    for index in indices {
        slot = match slot {
            Value::Array(items) => {
                let i = to_index(index, items.len())?;
                &mut items[i]
            }
            Value::Str(_) => return Err(RunTimeError::new("string elements cannot be modified")),
            other => {
                return Err(RunTimeError::new(format!(
                    "index access is only valid on arrays and strings, found {}",
                    other.type_name()
                )))
            }
        };
    }
    f(slot)
}

/// Copies out the element selected by `indices` without cloning the enclosing arrays
fn read_element(cell: &Cell, indices: &[Value]) -> ExecResult<Value> {
    let guard = lock_cell(cell);
    let mut slot: &Value = &guard;
    let mut rest = indices;
    while let (Value::Array(items), Some((index, tail))) = (slot, rest.split_first()) {
        slot = &items[to_index(index, items.len())?];
        rest = tail;
    }
    let value = slot.clone();
    drop(guard);
    rest.iter().try_fold(value, |value, index| index_value(value, index))
}

fn index_value(base: Value, index: &Value) -> ExecResult<Value> {
    match base {
        Value::Array(mut items) => {
            let i = to_index(index, items.len())?;
            Ok(items.swap_remove(i))
        }
        Value::Str(s) => {
            let i = to_index(index, s.chars().count())?;
            Ok(s.chars().nth(i).map(|c| Value::Str(c.to_string())).unwrap_or_default())
        }
        other => Err(RunTimeError::new(format!(
            "index access is only valid on arrays and strings, found {}",
            other.type_name()
        ))),
    }
}

fn text_to_num(name: &str, text: &str) -> ExecResult<Value> {
    builtins::parse_num(text)
        .map(Value::Number)
        .ok_or_else(|| RunTimeError::new(format!("cannot convert '{}' to num for '{}'", text, name)))
}

/// Converts an index value to a position, checking bounds
fn to_index(index: &Value, len: usize) -> ExecResult<usize> {
    let n = match index {
        Value::Number(n) => *n,
        other => {
            return Err(RunTimeError::new(format!("index must be num, found {}", other.type_name())))
        }
    };
    if !n.is_finite() || n.fract() != 0.0 || n < 0.0 {
        return Err(RunTimeError::new(format!("invalid index {}", format_number(n))));
    }
    if n >= len as f64 {
        return Err(RunTimeError::new(format!(
            "index {} out of range for length {}",
            format_number(n),
            len
        )));
    }
    Ok(n as usize)
}

fn arithmetic(op: ArithmeticOp, left: Value, right: Value) -> ExecResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let result = match op {
                ArithmeticOp::Add => a + b,
                ArithmeticOp::Sub => a - b,
                ArithmeticOp::Mul => a * b,
                ArithmeticOp::Div => {
                    if b == 0.0 {
                        return Err(RunTimeError::new("division by zero"));
                    }
                    a / b
                }
            };
            Ok(Value::Number(result))
        }
        (Value::Str(a), Value::Str(b)) if op == ArithmeticOp::Add => Ok(Value::Str(a + &b)),
        (left, right) => Err(RunTimeError::new(format!(
            "unsupported operand types for {}: {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn relational(op: RelationalOp, left: Value, right: Value) -> ExecResult<Value> {
    match op {
        RelationalOp::Eq | RelationalOp::Neq => {
            if !left.same_kind(&right) {
                return Err(RunTimeError::new(format!(
                    "cannot compare {} with {}",
                    left.type_name(),
                    right.type_name()
                )));
            }
            let equal = left == right;
            Ok(Value::Bool(if op == RelationalOp::Eq { equal } else { !equal }))
        }
        _ => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(match op {
                RelationalOp::Lt => a < b,
                RelationalOp::Gt => a > b,
                RelationalOp::Lte => a <= b,
                _ => a >= b,
            })),
            (left, right) => Err(RunTimeError::new(format!(
                "operator {} requires num operands, found {} and {}",
                op,
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

/// Resolves the escape sequences kept raw by the scanner
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn run(source: &str) -> (ExecResult<()>, String) {
        let module = parse_source(source).expect("source should parse");
        let output = Arc::new(Mutex::new(Vec::new()));
        let mut interpreter = Interpreter::with_config(InterpreterConfig::new().with_output(output.clone()));
        let result = interpreter.execute(&module);
        let text = String::from_utf8(output.lock().expect("output lock").clone()).expect("utf8 output");
        (result, text)
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r#"a\nb\t\"c\"\\"#), "a\nb\t\"c\"\\");
        assert_eq!(unescape(r"keep\q"), r"keep\q");
    }

    #[test]
    fn test_arithmetic_and_relational() {
        assert_eq!(
            arithmetic(ArithmeticOp::Add, Value::Str("ab".into()), Value::Str("c".into())),
            Ok(Value::Str("abc".into()))
        );
        assert_eq!(arithmetic(ArithmeticOp::Div, Value::Number(1.0), Value::Number(4.0)), Ok(Value::Number(0.25)));
        assert!(arithmetic(ArithmeticOp::Div, Value::Number(1.0), Value::Number(0.0)).is_err());
        assert!(arithmetic(ArithmeticOp::Sub, Value::Str("a".into()), Value::Str("b".into())).is_err());

        assert_eq!(relational(RelationalOp::Neq, Value::Bool(true), Value::Bool(false)), Ok(Value::Bool(true)));
        assert!(relational(RelationalOp::Eq, Value::Number(1.0), Value::Str("1".into())).is_err());
        assert!(relational(RelationalOp::Lt, Value::Str("a".into()), Value::Str("b".into())).is_err());
    }

    #[test]
    fn test_to_index_bounds() {
        assert_eq!(to_index(&Value::Number(2.0), 3), Ok(2));
        assert!(to_index(&Value::Number(3.0), 3).is_err());
        assert!(to_index(&Value::Number(-1.0), 3).is_err());
        assert!(to_index(&Value::Number(0.5), 3).is_err());
        assert!(to_index(&Value::Str("0".into()), 3).is_err());
    }

    #[test]
    fn test_read_element_selects_without_copying_the_cell() {
        let matrix = new_cell(Value::Array(vec![
            Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]),
            Value::Array(vec![Value::Str("ab".into()), Value::Number(4.0)]),
        ]));
        assert_eq!(read_element(&matrix, &[Value::Number(0.0), Value::Number(1.0)]), Ok(Value::Number(2.0)));
        assert_eq!(
            read_element(&matrix, &[Value::Number(1.0), Value::Number(0.0), Value::Number(1.0)]),
            Ok(Value::Str("b".into()))
        );
        assert!(read_element(&matrix, &[Value::Number(2.0)]).is_err());
        assert!(read_element(&matrix, &[Value::Number(0.0), Value::Number(0.0), Value::Number(0.0)]).is_err());
        assert_eq!(read_cell(&matrix).to_string(), "[[1, 2], [ab, 4]]");
    }

    #[test]
    fn test_num_variable_converts_reassigned_text() {
        let (result, out) = run("n: num = 0\nn = \"5\"\nprint(n + 1)\ns = \"7\"\nprint(s)");
        assert!(result.is_ok(), "{:?}", result);
        assert_eq!(out, "6\n7\n");

        let (result, _) = run("n: num = 0\nn = \"five\"");
        assert!(result.expect_err("text is not a number").message.contains("cannot convert"));
    }

    #[test]
    fn test_increment_forms() {
        let (result, out) = run("x: num = 5\ny: num = x++\nprint(x, y)\nz: num = ++x\nprint(z)\nx--\nprint(x)");
        assert!(result.is_ok(), "{:?}", result);
        assert_eq!(out, "6\n5\n7\n6\n");
    }

    #[test]
    fn test_function_table_first_definition_wins() {
        let (result, out) = run(
            "func f() -> num { return 1 }\nfunc f() -> num { return 2 }\nprint(f())",
        );
        assert!(result.is_ok());
        assert_eq!(out, "1\n");
    }

    #[test]
    fn test_client_channel_registry() {
        let module = parse_source("c_channel client { \"localhost\", 8080 }").expect("parses");
        let mut interpreter = Interpreter::new();
        interpreter.execute(&module).expect("runs");
        assert_eq!(
            interpreter.channel("client"),
            Some(ChannelInfo { host: "localhost".to_string(), port: 8080 })
        );

        let (result, _) = run("c_channel bad { \"localhost\", 70000 }");
        assert!(result.is_err());
    }

    #[test]
    fn test_top_level_break_is_an_error() {
        let (result, _) = run("break");
        assert!(result.is_err());
        let (result, out) = run("print(1)\nreturn 0\nprint(2)");
        assert!(result.is_ok());
        assert_eq!(out, "1\n");
    }
}
