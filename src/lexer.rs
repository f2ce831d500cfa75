// File: src/lexer.rs
//
// Lexical scanner for the Minipar language.
// Converts source text into an ordered sequence of (Token, line) pairs.
//
// Supports:
// - Keywords: func, while, if, else, return, break, continue, par, seq,
//   c_channel, s_channel, for
// - Type names: num, bool, string, void, array
// - Identifiers, numbers and string literals (escapes are kept raw)
// - Operators: || && == != <= >= -> ++ -- : =
// - Punctuation: ( ) [ ] { }
// - Comments: # to end of line, /* ... */ blocks
//
// Any other character becomes an OTHER token whose value doubles as its tag.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Token categories produced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Id,
    Num,
    Str,
    True,
    False,
    Type,
    Func,
    While,
    If,
    Else,
    Return,
    Break,
    Continue,
    Par,
    Seq,
    CChannel,
    SChannel,
    For,
    RArrow,
    Or,
    And,
    Eq,
    Neq,
    Lte,
    Gte,
    Colon,
    Assign,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Inc,
    Dec,
    /// Catch-all single character; the character is its own tag
    Other(char),
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Tag::Id => "ID",
            Tag::Num => "NUM",
            Tag::Str => "STRING",
            Tag::True => "TRUE",
            Tag::False => "FALSE",
            Tag::Type => "TYPE",
            Tag::Func => "FUNC",
            Tag::While => "WHILE",
            Tag::If => "IF",
            Tag::Else => "ELSE",
            Tag::Return => "RETURN",
            Tag::Break => "BREAK",
            Tag::Continue => "CONTINUE",
            Tag::Par => "PAR",
            Tag::Seq => "SEQ",
            Tag::CChannel => "C_CHANNEL",
            Tag::SChannel => "S_CHANNEL",
            Tag::For => "FOR",
            Tag::RArrow => "RARROW",
            Tag::Or => "OR",
            Tag::And => "AND",
            Tag::Eq => "EQ",
            Tag::Neq => "NEQ",
            Tag::Lte => "LTE",
            Tag::Gte => "GTE",
            Tag::Colon => "COLON",
            Tag::Assign => "ASSIGN",
            Tag::LParen => "LPAREN",
            Tag::RParen => "RPAREN",
            Tag::LBrack => "LBRACK",
            Tag::RBrack => "RBRACK",
            Tag::LBrace => "LBRACE",
            Tag::RBrace => "RBRACE",
            Tag::Inc => "INC",
            Tag::Dec => "DEC",
            Tag::Other(c) => return write!(f, "{}", c),
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tag: Tag,
    pub value: String,
}

impl Token {
    pub fn new(tag: Tag, value: impl Into<String>) -> Self {
        Token { tag, value: value.into() }
    }
}

static KEYWORDS: Lazy<HashMap<&'static str, Tag>> = Lazy::new(|| {
    HashMap::from([
        ("num", Tag::Type),
        ("bool", Tag::Type),
        ("string", Tag::Type),
        ("void", Tag::Type),
        ("array", Tag::Type),
        ("true", Tag::True),
        ("false", Tag::False),
        ("func", Tag::Func),
        ("while", Tag::While),
        ("if", Tag::If),
        ("else", Tag::Else),
        ("return", Tag::Return),
        ("break", Tag::Break),
        ("continue", Tag::Continue),
        ("par", Tag::Par),
        ("seq", Tag::Seq),
        ("c_channel", Tag::CChannel),
        ("s_channel", Tag::SChannel),
        ("for", Tag::For),
    ])
});

/// Tokenizes Minipar source code into (token, line) pairs.
///
/// Whitespace and comments are dropped; every newline, including those inside
/// block comments and string literals, advances the line counter. String
/// literal values exclude the surrounding quotes. An unterminated string
/// yields a lone `"` OTHER token so that the parser reports it.
pub fn tokenize(source: &str) -> Vec<(Token, usize)> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' => {
                chars.next();
            }
            '\n' => {
                chars.next();
                line += 1;
            }
            '#' => {
                while let Some(&ch) = chars.peek() {
                    if ch == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '"' => {
                chars.next();
                let start_line = line;
                let mut s = String::new();
                let mut closed = false;
                while let Some(ch) = chars.next() {
                    match ch {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            s.push('\\');
                            if let Some(esc) = chars.next() {
                                if esc == '\n' {
                                    line += 1;
                                }
                                s.push(esc);
                            }
                        }
                        '\n' => {
                            line += 1;
                            s.push(ch);
                        }
                        _ => s.push(ch),
                    }
                }
                if closed {
                    tokens.push((Token::new(Tag::Str, s), start_line));
                } else {
                    tracing::warn!(line = start_line, "unterminated string literal");
                    tokens.push((Token::new(Tag::Other('"'), "\""), start_line));
                }
            }
            '0'..='9' | '.' => {
                let mut num = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_digit() {
                        num.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                // Fraction only when a digit follows the dot
                if chars.peek() == Some(&'.') {
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    if matches!(lookahead.peek(), Some(d) if d.is_ascii_digit()) {
                        num.push('.');
                        chars.next();
                        while let Some(&ch) = chars.peek() {
                            if ch.is_ascii_digit() {
                                num.push(ch);
                                chars.next();
                            } else {
                                break;
                            }
                        }
                    }
                }
                if num.is_empty() {
                    chars.next();
                    tokens.push((Token::new(Tag::Other('.'), "."), line));
                } else {
                    tokens.push((Token::new(Tag::Num, num), line));
                }
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let tag = KEYWORDS.get(ident.as_str()).copied().unwrap_or(Tag::Id);
                tokens.push((Token::new(tag, ident), line));
            }
            _ => {
                chars.next();
                let next = chars.peek().copied();
                let (tag, text) = match (c, next) {
                    ('/', Some('*')) => {
                        chars.next();
                        let mut prev = '\0';
                        for ch in chars.by_ref() {
                            if ch == '\n' {
                                line += 1;
                            }
                            if prev == '*' && ch == '/' {
                                break;
                            }
                            prev = ch;
                        }
                        continue;
                    }
                    ('-', Some('>')) => (Tag::RArrow, "->"),
                    ('|', Some('|')) => (Tag::Or, "||"),
                    ('&', Some('&')) => (Tag::And, "&&"),
                    ('=', Some('=')) => (Tag::Eq, "=="),
                    ('!', Some('=')) => (Tag::Neq, "!="),
                    ('<', Some('=')) => (Tag::Lte, "<="),
                    ('>', Some('=')) => (Tag::Gte, ">="),
                    ('+', Some('+')) => (Tag::Inc, "++"),
                    ('-', Some('-')) => (Tag::Dec, "--"),
                    _ => {
                        let tag = match c {
                            ':' => Tag::Colon,
                            '=' => Tag::Assign,
                            '(' => Tag::LParen,
                            ')' => Tag::RParen,
                            '[' => Tag::LBrack,
                            ']' => Tag::RBrack,
                            '{' => Tag::LBrace,
                            '}' => Tag::RBrace,
                            other => Tag::Other(other),
                        };
                        tokens.push((Token::new(tag, c.to_string()), line));
                        continue;
                    }
                };
                chars.next();
                tokens.push((Token::new(tag, text), line));
            }
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(source: &str) -> Vec<Tag> {
        tokenize(source).into_iter().map(|(t, _)| t.tag).collect()
    }

    #[test]
    fn test_keywords_and_types() {
        assert_eq!(
            tags("func f(x: num) -> string"),
            vec![
                Tag::Func,
                Tag::Id,
                Tag::LParen,
                Tag::Id,
                Tag::Colon,
                Tag::Type,
                Tag::RParen,
                Tag::RArrow,
                Tag::Type
            ]
        );
        assert_eq!(tags("c_channel s_channel par seq"), vec![
            Tag::CChannel,
            Tag::SChannel,
            Tag::Par,
            Tag::Seq
        ]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tags("a <= b || c != d && !e ++ --"),
            vec![
                Tag::Id,
                Tag::Lte,
                Tag::Id,
                Tag::Or,
                Tag::Id,
                Tag::Neq,
                Tag::Id,
                Tag::And,
                Tag::Other('!'),
                Tag::Id,
                Tag::Inc,
                Tag::Dec
            ]
        );
        let plus = &tokenize("+")[0].0;
        assert_eq!(plus.tag, Tag::Other('+'));
        assert_eq!(plus.tag.to_string(), "+");
    }

    #[test]
    fn test_numbers() {
        let toks = tokenize("3 4.25 .5 7.");
        let values: Vec<&str> = toks.iter().map(|(t, _)| t.value.as_str()).collect();
        assert_eq!(values, vec!["3", "4.25", ".5", "7", "."]);
        assert_eq!(toks[3].0.tag, Tag::Num);
        assert_eq!(toks[4].0.tag, Tag::Other('.'));
    }

    #[test]
    fn test_strings_keep_escapes_raw() {
        let toks = tokenize(r#""a\"b\n""#);
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].0.tag, Tag::Str);
        assert_eq!(toks[0].0.value, r#"a\"b\n"#);
    }

    #[test]
    fn test_comments_and_line_numbers() {
        let source = "x = 1 # trailing\n/* block\ncomment */\ny = 2";
        let toks = tokenize(source);
        let lines: Vec<usize> = toks.iter().map(|(_, l)| *l).collect();
        assert_eq!(lines, vec![1, 1, 1, 4, 4, 4]);
    }

    #[test]
    fn test_unterminated_string() {
        let toks = tokenize("x = \"abc");
        assert_eq!(toks.last().map(|(t, _)| t.tag), Some(Tag::Other('"')));
    }
}
