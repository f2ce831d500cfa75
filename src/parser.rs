// File: src/parser.rs
//
// Recursive descent parser for the Minipar language.
// Transforms the scanner's (token, line) sequence into an owned AST.
//
// The parser uses a single-token lookahead and is fail-fast: the first
// mandatory token that does not match aborts parsing with a SyntaxError
// carrying the current line and the offending token's text.
//
// Expression precedence, lowest to highest:
//   ||  →  &&  →  == !=  →  < > <= >=  →  + -  →  * /  →  unary  →  primary
// Every binary level is left-associative and built iteratively.
//
// Grammar-level desugaring performed here:
// - for (init; cond; incr) { body }  =>  seq { init; while (cond) { body; incr } }
// - x: array[n] = value              =>  seq { ArrayDecl(x, [n]); x = value }

use crate::ast::{
    ArithmeticOp, ConstKind, Expr, FunctionDef, LogicalOp, Module, Param, Parameters,
    RelationalOp, Stmt, Type, UnaryOp,
};
use crate::builtins;
use crate::errors::SyntaxError;
use crate::lexer::{Tag, Token};
use crate::symtable::{Symbol, SymbolKind, SymTable};

type ParseResult<T> = Result<T, SyntaxError>;

/// Parser maintains position in the token stream and builds the AST
pub struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    symtable: SymTable,
}

impl Parser {
    /// Creates a parser; default function names are pre-registered in the
    /// outermost symbol table and user functions go in a nested one
    pub fn new(tokens: Vec<(Token, usize)>) -> Self {
        let mut defaults = SymTable::new();
        for name in builtins::default_function_names() {
            defaults.insert(Symbol::new(name, SymbolKind::Builtin));
        }
        Parser { tokens, pos: 0, symtable: SymTable::with_parent(defaults) }
    }

    /// Names registered while parsing
    pub fn symtable(&self) -> &SymTable {
        &self.symtable
    }

    /// Parse the entire token stream into a module
    pub fn parse(&mut self) -> ParseResult<Module> {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            if self.at_end() {
                break;
            }
            stmts.push(self.stmt()?);
        }
        tracing::debug!(statements = stmts.len(), "parsed module");
        Ok(Module::new(stmts))
    }

    // --- token helpers ---

    fn peek_tag(&self) -> Option<Tag> {
        self.tokens.get(self.pos).map(|(t, _)| t.tag)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, tag: Tag) -> bool {
        self.peek_tag() == Some(tag)
    }

    /// Line of the current token, or of the last token at end of input
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, line)| *line)
            .unwrap_or(1)
    }

    /// Text of the current token for error messages
    fn found(&self) -> String {
        match self.tokens.get(self.pos) {
            Some((token, _)) => format!("'{}'", token.value),
            None => "end of input".to_string(),
        }
    }

    /// Consumes the current token if its tag equals `tag`
    fn match_tag(&mut self, tag: Tag) -> bool {
        if self.check(tag) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.line(), message)
    }

    fn expect(&mut self, tag: Tag, what: &str) -> ParseResult<Token> {
        if self.check(tag) {
            // check() guarantees a token is present
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(self.error(format!("expected {} but found {}", what, self.found())))
    }

    fn expect_id(&mut self, context: &str) -> ParseResult<String> {
        if self.check(Tag::Id) {
            if let Some(token) = self.advance() {
                return Ok(token.value);
            }
        }
        Err(self.error(format!("expected identifier after {} but found {}", context, self.found())))
    }

    fn expect_type(&mut self) -> ParseResult<Type> {
        if self.check(Tag::Type) {
            if let Some(token) = self.advance() {
                if let Some(ty) = Type::from_keyword(&token.value) {
                    return Ok(ty);
                }
                return Err(self.error(format!("unknown type '{}'", token.value)));
            }
        }
        Err(self.error(format!("expected a type but found {}", self.found())))
    }

    fn skip_separators(&mut self) {
        while self.match_tag(Tag::Other(';')) {}
    }

    // --- statements ---

    fn stmt(&mut self) -> ParseResult<Stmt> {
        match self.peek_tag() {
            Some(Tag::Id) => self.id_stmt(),
            Some(Tag::Func) => self.func_def(),
            Some(Tag::If) => self.if_stmt(),
            Some(Tag::Else) => Err(self.error("'else' without a matching 'if'")),
            Some(Tag::While) => self.while_stmt(),
            Some(Tag::For) => self.for_stmt(),
            Some(Tag::Return) => {
                self.pos += 1;
                let ends_here = matches!(self.peek_tag(), None | Some(Tag::RBrace) | Some(Tag::Other(';')));
                let expr = if ends_here { None } else { Some(self.disjunction()?) };
                Ok(Stmt::Return(expr))
            }
            Some(Tag::Break) => {
                self.pos += 1;
                Ok(Stmt::Break)
            }
            Some(Tag::Continue) => {
                self.pos += 1;
                Ok(Stmt::Continue)
            }
            Some(Tag::Seq) => {
                self.pos += 1;
                let body = self.block("'seq'")?;
                Ok(Stmt::Seq { body, is_scope_block: true })
            }
            Some(Tag::Par) => {
                self.pos += 1;
                let body = self.block("'par'")?;
                Ok(Stmt::Par(body))
            }
            Some(Tag::CChannel) => self.c_channel(),
            Some(Tag::SChannel) => self.s_channel(),
            Some(Tag::Inc) | Some(Tag::Dec) => {
                let op = if self.match_tag(Tag::Inc) {
                    UnaryOp::Inc
                } else {
                    self.pos += 1;
                    UnaryOp::Dec
                };
                let operand = self.lvalue()?;
                Ok(Stmt::Expr(Expr::Unary { op, operand: Box::new(operand), is_postfix: false }))
            }
            _ => Err(self.error(format!("{} does not start a valid statement", self.found()))),
        }
    }

    /// Statements that begin with an identifier
    fn id_stmt(&mut self) -> ParseResult<Stmt> {
        let name = self.expect_id("statement start")?;

        match self.peek_tag() {
            Some(Tag::LBrack) => {
                let target = self.index_chain(Expr::ident(name))?;
                if self.match_tag(Tag::Assign) {
                    let value = self.disjunction()?;
                    Ok(Stmt::Assign { target, value })
                } else if let Some(op) = self.postfix_op() {
                    Ok(Stmt::Expr(Expr::Unary { op, operand: Box::new(target), is_postfix: true }))
                } else {
                    Err(self.error(format!("expected '=' after index access but found {}", self.found())))
                }
            }
            Some(Tag::Colon) => {
                self.pos += 1;
                let ty = self.expect_type()?;
                if ty == Type::Array {
                    self.array_decl(name)
                } else {
                    self.expect(Tag::Assign, "'=' after type")?;
                    let value = self.disjunction()?;
                    let target = Expr::Identifier { declared_type: Some(ty), name, is_declaration: true };
                    Ok(Stmt::Assign { target, value })
                }
            }
            Some(Tag::Assign) => {
                self.pos += 1;
                let value = self.disjunction()?;
                Ok(Stmt::Assign { target: Expr::ident(name), value })
            }
            Some(Tag::LParen) => {
                let args = self.arguments()?;
                Ok(Stmt::Expr(Expr::call(name, args)))
            }
            Some(Tag::Inc) | Some(Tag::Dec) => {
                let op = self.postfix_op().unwrap_or(UnaryOp::Inc);
                Ok(Stmt::Expr(Expr::Unary { op, operand: Box::new(Expr::ident(name)), is_postfix: true }))
            }
            _ => Err(self.error(format!(
                "expected ':', '=', '[', '(' or '++'/'--' after identifier but found {}",
                self.found()
            ))),
        }
    }

    /// `name: array[d1]...[dn]` with an optional `= value` initializer
    fn array_decl(&mut self, name: String) -> ParseResult<Stmt> {
        if !self.check(Tag::LBrack) {
            return Err(self.error(format!("expected '[' after 'array' but found {}", self.found())));
        }
        let mut dimensions = Vec::new();
        while self.match_tag(Tag::LBrack) {
            dimensions.push(self.disjunction()?);
            self.expect(Tag::RBrack, "']' after array size")?;
        }
        let decl = Stmt::ArrayDecl { name: name.clone(), dimensions };

        if self.match_tag(Tag::Assign) {
            let value = self.disjunction()?;
            let assign = Stmt::Assign { target: Expr::ident(name), value };
            Ok(Stmt::Seq { body: vec![decl, assign], is_scope_block: false })
        } else {
            Ok(decl)
        }
    }

    fn func_def(&mut self) -> ParseResult<Stmt> {
        self.pos += 1; // func
        let name = self.expect_id("'func'")?;
        if let Some(Symbol { kind: SymbolKind::Builtin, .. }) = self.symtable.find(&name) {
            return Err(self.error(format!("function '{}' redefines a default function", name)));
        }
        let params = self.params()?;
        self.expect(Tag::RArrow, "'->'")?;
        let return_type = self.expect_type()?;
        let body = self.block("function signature")?;
        self.symtable.insert(Symbol::new(name.clone(), SymbolKind::Function));
        Ok(Stmt::FunctionDef(FunctionDef { name, return_type, params, body }))
    }

    fn params(&mut self) -> ParseResult<Parameters> {
        self.expect(Tag::LParen, "'('")?;
        let mut params: Parameters = Vec::new();
        if !self.check(Tag::RParen) {
            loop {
                let param = self.param()?;
                if params.iter().any(|p| p.name == param.name) {
                    return Err(self.error(format!("duplicate parameter '{}'", param.name)));
                }
                params.push(param);
                if !self.match_tag(Tag::Other(',')) {
                    break;
                }
            }
        }
        self.expect(Tag::RParen, "')'")?;
        Ok(params)
    }

    fn param(&mut self) -> ParseResult<Param> {
        if !self.check(Tag::Id) {
            return Err(self.error(format!("invalid parameter name {}", self.found())));
        }
        let name = self.expect_id("'('")?;
        self.expect(Tag::Colon, "':'")?;
        let ty = self.expect_type()?;
        let default = if self.match_tag(Tag::Assign) { Some(self.disjunction()?) } else { None };
        Ok(Param { name, ty, default })
    }

    fn if_stmt(&mut self) -> ParseResult<Stmt> {
        self.pos += 1; // if
        let cond = self.condition()?;
        let then_body = self.block("'if' condition")?;

        let else_body = if self.match_tag(Tag::Else) {
            if self.check(Tag::If) {
                Some(vec![self.if_stmt()?])
            } else {
                Some(self.block("'else'")?)
            }
        } else {
            None
        };

        Ok(Stmt::If { cond, then_body, else_body })
    }

    fn while_stmt(&mut self) -> ParseResult<Stmt> {
        self.pos += 1; // while
        let cond = self.condition()?;
        let body = self.block("'while' condition")?;
        Ok(Stmt::While { cond, body })
    }

    fn for_stmt(&mut self) -> ParseResult<Stmt> {
        self.pos += 1; // for
        self.expect(Tag::LParen, "'(' after 'for'")?;
        let init = self.stmt()?;
        self.expect(Tag::Other(';'), "';' after loop initializer")?;
        let cond = self.disjunction()?;
        self.expect(Tag::Other(';'), "';' after loop condition")?;
        let incr = self.stmt()?;
        self.expect(Tag::RParen, "')' after loop increment")?;
        let mut body = self.block("'for' header")?;

        body.push(incr);
        let while_loop = Stmt::While { cond, body };
        Ok(Stmt::Seq { body: vec![init, while_loop], is_scope_block: true })
    }

    fn c_channel(&mut self) -> ParseResult<Stmt> {
        self.pos += 1; // c_channel
        let name = self.expect_id("'c_channel'")?;
        self.expect(Tag::LBrace, "'{'")?;
        let host = self.disjunction()?;
        self.expect(Tag::Other(','), "',' after host")?;
        let port = self.disjunction()?;
        self.expect(Tag::RBrace, "'}'")?;
        Ok(Stmt::ClientChannelDecl { name, host, port })
    }

    fn s_channel(&mut self) -> ParseResult<Stmt> {
        self.pos += 1; // s_channel
        let name = self.expect_id("'s_channel'")?;
        self.expect(Tag::LBrace, "'{'")?;
        let handler = self.expect_id("'{'")?;
        self.expect(Tag::Other(','), "',' after handler name")?;
        let description = self.disjunction()?;
        self.expect(Tag::Other(','), "',' after description")?;
        let host = self.disjunction()?;
        self.expect(Tag::Other(','), "',' after host")?;
        let port = self.disjunction()?;
        self.expect(Tag::RBrace, "'}'")?;
        Ok(Stmt::ServerChannelDecl { name, host, port, handler, description })
    }

    /// `( expr )` around if/while conditions
    fn condition(&mut self) -> ParseResult<Expr> {
        self.expect(Tag::LParen, "'('")?;
        let cond = self.disjunction()?;
        self.expect(Tag::RParen, "')'")?;
        Ok(cond)
    }

    /// `{ stmt* }`
    fn block(&mut self, after: &str) -> ParseResult<Vec<Stmt>> {
        if !self.match_tag(Tag::LBrace) {
            return Err(self.error(format!("expected '{{' after {} but found {}", after, self.found())));
        }
        let mut body = Vec::new();
        loop {
            self.skip_separators();
            if self.check(Tag::RBrace) || self.at_end() {
                break;
            }
            body.push(self.stmt()?);
        }
        self.expect(Tag::RBrace, "'}'")?;
        Ok(body)
    }

    // --- expressions ---

    fn disjunction(&mut self) -> ParseResult<Expr> {
        let mut left = self.conjunction()?;
        while self.match_tag(Tag::Or) {
            let right = self.conjunction()?;
            left = Expr::Logical { op: LogicalOp::Or, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn conjunction(&mut self) -> ParseResult<Expr> {
        let mut left = self.equality()?;
        while self.match_tag(Tag::And) {
            let right = self.equality()?;
            left = Expr::Logical { op: LogicalOp::And, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.comparison()?;
        loop {
            let op = match self.peek_tag() {
                Some(Tag::Eq) => RelationalOp::Eq,
                Some(Tag::Neq) => RelationalOp::Neq,
                _ => break,
            };
            self.pos += 1;
            let right = self.comparison()?;
            left = Expr::Relational { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek_tag() {
                Some(Tag::Other('<')) => RelationalOp::Lt,
                Some(Tag::Other('>')) => RelationalOp::Gt,
                Some(Tag::Lte) => RelationalOp::Lte,
                Some(Tag::Gte) => RelationalOp::Gte,
                _ => break,
            };
            self.pos += 1;
            let right = self.additive()?;
            left = Expr::Relational { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek_tag() {
                Some(Tag::Other('+')) => ArithmeticOp::Add,
                Some(Tag::Other('-')) => ArithmeticOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Arithmetic { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek_tag() {
                Some(Tag::Other('*')) => ArithmeticOp::Mul,
                Some(Tag::Other('/')) => ArithmeticOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Arithmetic { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek_tag() {
            Some(Tag::Other('-')) => UnaryOp::Neg,
            Some(Tag::Other('!')) => UnaryOp::Not,
            Some(Tag::Inc) => UnaryOp::Inc,
            Some(Tag::Dec) => UnaryOp::Dec,
            _ => return self.primary(),
        };
        self.pos += 1;
        let operand = match op {
            UnaryOp::Inc | UnaryOp::Dec => self.lvalue()?,
            UnaryOp::Neg | UnaryOp::Not => self.unary()?,
        };
        Ok(Expr::Unary { op, operand: Box::new(operand), is_postfix: false })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let Some(tag) = self.peek_tag() else {
            return Err(self.error("expected an expression but found end of input"));
        };
        match tag {
            Tag::Num | Tag::Str | Tag::True | Tag::False => {
                let token = self.advance().map(|t| t.value).unwrap_or_default();
                let kind = match tag {
                    Tag::Num => ConstKind::Num,
                    Tag::Str => ConstKind::Str,
                    _ => ConstKind::Bool,
                };
                Ok(Expr::Constant { kind, literal: token })
            }
            Tag::Id => {
                let name = self.expect_id("expression")?;
                if self.check(Tag::LParen) {
                    let args = self.arguments()?;
                    return Ok(Expr::call(name, args));
                }
                let expr = self.index_chain(Expr::ident(name))?;
                match self.postfix_op() {
                    Some(op) => Ok(Expr::Unary { op, operand: Box::new(expr), is_postfix: true }),
                    None => Ok(expr),
                }
            }
            Tag::LParen => {
                self.pos += 1;
                let expr = self.disjunction()?;
                self.expect(Tag::RParen, "')'")?;
                Ok(expr)
            }
            Tag::LBrack => {
                self.pos += 1;
                let mut elements = Vec::new();
                if !self.check(Tag::RBrack) {
                    loop {
                        elements.push(self.disjunction()?);
                        if !self.match_tag(Tag::Other(',')) {
                            break;
                        }
                    }
                }
                self.expect(Tag::RBrack, "']'")?;
                Ok(Expr::ArrayLiteral(elements))
            }
            _ => Err(self.error(format!(
                "expected a literal, identifier or parenthesized expression but found {}",
                self.found()
            ))),
        }
    }

    /// Identifier with an optional index chain, target of `++`/`--`
    fn lvalue(&mut self) -> ParseResult<Expr> {
        let name = self.expect_id("increment operator")?;
        self.index_chain(Expr::ident(name))
    }

    /// Zero or more `[expr]` suffixes applied to `base`
    fn index_chain(&mut self, base: Expr) -> ParseResult<Expr> {
        let mut expr = base;
        while self.match_tag(Tag::LBrack) {
            let index = self.disjunction()?;
            self.expect(Tag::RBrack, "']'")?;
            expr = Expr::IndexAccess { base: Box::new(expr), index: Box::new(index) };
        }
        Ok(expr)
    }

    fn postfix_op(&mut self) -> Option<UnaryOp> {
        if self.match_tag(Tag::Inc) {
            Some(UnaryOp::Inc)
        } else if self.match_tag(Tag::Dec) {
            Some(UnaryOp::Dec)
        } else {
            None
        }
    }

    /// `( [expr (, expr)*] )`
    fn arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(Tag::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(Tag::RParen) {
            loop {
                args.push(self.disjunction()?);
                if !self.match_tag(Tag::Other(',')) {
                    break;
                }
            }
        }
        self.expect(Tag::RParen, "')'")?;
        Ok(args)
    }
}

/// Convenience wrapper: tokenize and parse in one call
pub fn parse_source(source: &str) -> ParseResult<Module> {
    Parser::new(crate::lexer::tokenize(source)).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Module {
        parse_source(source).expect("source should parse")
    }

    fn parse_err(source: &str) -> SyntaxError {
        parse_source(source).expect_err("source should fail to parse")
    }

    #[test]
    fn test_binary_operators_are_left_associative() {
        let module = parse("x = a - b - c");
        let Stmt::Assign { value, .. } = &module.root[0] else { panic!("expected assignment") };
        match value {
            Expr::Arithmetic { op: ArithmeticOp::Sub, left, right } => {
                assert!(matches!(**left, Expr::Arithmetic { op: ArithmeticOp::Sub, .. }));
                assert_eq!(**right, Expr::ident("c"));
            }
            other => panic!("expected subtraction, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence_levels() {
        let module = parse("x = a || b && c == d < e + f * -g");
        let Stmt::Assign { value, .. } = &module.root[0] else { panic!("expected assignment") };
        let Expr::Logical { op: LogicalOp::Or, right, .. } = value else { panic!("|| at top") };
        let Expr::Logical { op: LogicalOp::And, right, .. } = &**right else { panic!("&& next") };
        let Expr::Relational { op: RelationalOp::Eq, right, .. } = &**right else { panic!("== next") };
        let Expr::Relational { op: RelationalOp::Lt, right, .. } = &**right else { panic!("< next") };
        let Expr::Arithmetic { op: ArithmeticOp::Add, right, .. } = &**right else { panic!("+ next") };
        let Expr::Arithmetic { op: ArithmeticOp::Mul, right, .. } = &**right else { panic!("* next") };
        assert!(matches!(**right, Expr::Unary { op: UnaryOp::Neg, .. }));
    }

    #[test]
    fn test_for_desugars_to_seq_and_while() {
        let module = parse("for (i: num = 0; i < 3; i++) { print(i) }");
        assert_eq!(module.root.len(), 1);
        let Stmt::Seq { body, is_scope_block } = &module.root[0] else { panic!("expected seq") };
        assert!(*is_scope_block);
        assert!(matches!(&body[0], Stmt::Assign { target: Expr::Identifier { is_declaration: true, .. }, .. }));
        let Stmt::While { body: loop_body, .. } = &body[1] else { panic!("expected while") };
        assert_eq!(loop_body.len(), 2);
        assert!(matches!(&loop_body[0], Stmt::Expr(Expr::Call { name, .. }) if name == "print"));
        assert!(matches!(&loop_body[1], Stmt::Expr(Expr::Unary { op: UnaryOp::Inc, is_postfix: true, .. })));
    }

    #[test]
    fn test_initialized_array_declaration_desugars() {
        let module = parse("xs: array[3] = [1, 2, 3]");
        let Stmt::Seq { body, is_scope_block } = &module.root[0] else { panic!("expected seq") };
        assert!(!*is_scope_block);
        assert!(matches!(&body[0], Stmt::ArrayDecl { name, dimensions } if name == "xs" && dimensions.len() == 1));
        assert!(matches!(&body[1], Stmt::Assign { value: Expr::ArrayLiteral(items), .. } if items.len() == 3));

        let module = parse("grid: array[2][3]");
        assert!(matches!(&module.root[0], Stmt::ArrayDecl { dimensions, .. } if dimensions.len() == 2));
    }

    #[test]
    fn test_function_definition_with_defaults() {
        let module = parse("func greet(name: string, times: num = 1) -> string { return name }");
        let Stmt::FunctionDef(def) = &module.root[0] else { panic!("expected function") };
        assert_eq!(def.name, "greet");
        assert_eq!(def.return_type, Type::Str);
        assert_eq!(def.params.len(), 2);
        assert_eq!(def.params[0].ty, Type::Str);
        assert!(def.params[1].default.is_some());
        assert_eq!(def.required_params(), 1);
    }

    #[test]
    fn test_function_names_are_registered() {
        let mut parser = Parser::new(crate::lexer::tokenize("func f() -> void { }"));
        parser.parse().expect("parses");
        assert_eq!(parser.symtable().find("f").map(|s| s.kind), Some(SymbolKind::Function));
        assert_eq!(parser.symtable().find("print").map(|s| s.kind), Some(SymbolKind::Builtin));
    }

    #[test]
    fn test_index_assignment_chain() {
        let module = parse("m[1][2] = 5");
        let Stmt::Assign { target, .. } = &module.root[0] else { panic!("expected assignment") };
        assert_eq!(target.root_name(), Some("m"));
        let Expr::IndexAccess { base, .. } = target else { panic!("expected index access") };
        assert!(matches!(**base, Expr::IndexAccess { .. }));
    }

    #[test]
    fn test_channels() {
        let module = parse(
            "c_channel client { \"localhost\", 8000 }\n\
             s_channel server { echo, \"echo service\", \"127.0.0.1\", 8001 }",
        );
        assert!(matches!(&module.root[0], Stmt::ClientChannelDecl { name, .. } if name == "client"));
        assert!(matches!(&module.root[1], Stmt::ServerChannelDecl { handler, .. } if handler == "echo"));
    }

    #[test]
    fn test_else_if_chain() {
        let module = parse("if (a) { x = 1 } else if (b) { x = 2 } else { x = 3 }");
        let Stmt::If { else_body: Some(else_body), .. } = &module.root[0] else { panic!("expected if") };
        assert!(matches!(&else_body[0], Stmt::If { else_body: Some(_), .. }));
    }

    #[test]
    fn test_syntax_errors_carry_line_and_token() {
        let err = parse_err("x = 1\ny = (2 + 3\nz = 4");
        assert_eq!(err.line, 3);
        assert!(err.message.contains("'z'"), "message was {}", err.message);

        let err = parse_err("else { x = 1 }");
        assert!(err.message.contains("else"));

        let err = parse_err("func f(a: num, a: num) -> num { return a }");
        assert!(err.message.contains("duplicate parameter"));

        let err = parse_err("func print(a: string) -> void { }");
        assert!(err.message.contains("default function"));
    }
}
