// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for the Minipar language.
//
// Expressions (Expr) produce values, statements (Stmt) perform actions and
// control flow. Every composite node owns its children exclusively; the tree
// is built once by the parser and only read afterwards.

use std::fmt;

/// Declared types of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Num,
    Bool,
    Str,
    Void,
    Array,
}

impl Type {
    /// Maps a TYPE token's text to a type
    pub fn from_keyword(keyword: &str) -> Option<Type> {
        match keyword {
            "num" => Some(Type::Num),
            "bool" => Some(Type::Bool),
            "string" => Some(Type::Str),
            "void" => Some(Type::Void),
            "array" => Some(Type::Array),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Type::Num => "num",
            Type::Bool => "bool",
            Type::Str => "string",
            Type::Void => "void",
            Type::Array => "array",
        };
        f.write_str(name)
    }
}

/// Literal categories carried by Constant nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstKind {
    Num,
    Str,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    Inc,
    Dec,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        })
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RelationalOp::Eq => "==",
            RelationalOp::Neq => "!=",
            RelationalOp::Lt => "<",
            RelationalOp::Gt => ">",
            RelationalOp::Lte => "<=",
            RelationalOp::Gte => ">=",
        })
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Inc => "++",
            UnaryOp::Dec => "--",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant {
        kind: ConstKind,
        literal: String,
    },
    Identifier {
        declared_type: Option<Type>,
        name: String,
        is_declaration: bool,
    },
    IndexAccess {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Relational {
        op: RelationalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        is_postfix: bool,
    },
    /// `callee` is the identifier node naming the function, `name` its text
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        name: String,
    },
    ArrayLiteral(Vec<Expr>),
}

impl Expr {
    /// Plain identifier use (not a declaration)
    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Identifier { declared_type: None, name: name.into(), is_declaration: false }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        let name = name.into();
        Expr::Call { callee: Box::new(Expr::ident(name.clone())), args, name }
    }

    /// Name of the identifier at the root of an index chain (`a` in `a[i][j]`)
    pub fn root_name(&self) -> Option<&str> {
        match self {
            Expr::Identifier { name, .. } => Some(name),
            Expr::IndexAccess { base, .. } => base.root_name(),
            _ => None,
        }
    }
}

/// One declared function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub default: Option<Expr>,
}

/// Ordered parameter list; position is call-binding order
pub type Parameters = Vec<Param>;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub return_type: Type,
    pub params: Parameters,
    pub body: Vec<Stmt>,
}

impl FunctionDef {
    /// Number of parameters without a default value
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        target: Expr,
        value: Expr,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    FunctionDef(FunctionDef),
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    Par(Vec<Stmt>),
    Seq {
        body: Vec<Stmt>,
        is_scope_block: bool,
    },
    ClientChannelDecl {
        name: String,
        host: Expr,
        port: Expr,
    },
    ServerChannelDecl {
        name: String,
        host: Expr,
        port: Expr,
        handler: String,
        description: Expr,
    },
    ArrayDecl {
        name: String,
        dimensions: Vec<Expr>,
    },
    /// Call or increment/decrement evaluated for its side effects
    Expr(Expr),
}

/// Root of a parsed program
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub root: Vec<Stmt>,
}

impl Module {
    pub fn new(root: Vec<Stmt>) -> Self {
        Module { root }
    }
}
