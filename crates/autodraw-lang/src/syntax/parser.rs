//! Line parser: `command [name] operand*` per line.
//!
//! Only token shape is checked here. Operand counts, variable names and figure
//! names are left to the engine.

use crate::error::{Error, ErrorCode};
use crate::syntax::token::{Token, TokenKind};
use crate::types::operation::Operation;
use crate::Value;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Vec<Operation>, Vec<Error>> {
        let mut errors = Vec::new();
        let mut ops = Vec::new();

        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Newline => { self.advance(); }
                TokenKind::Eof => break,
                _ => match self.parse_line() {
                    Ok(op) => ops.push(op),
                    Err(e) => { errors.push(e); self.recover(); }
                },
            }
        }

        if errors.is_empty() { Ok(ops) } else { Err(errors) }
    }

    fn parse_line(&mut self) -> Result<Operation, Error> {
        let head = self.advance().clone();
        let code = match head.kind {
            TokenKind::Command(code) => code,
            TokenKind::Ident(word) => {
                return Err(Error::new(ErrorCode::P001, head.line, head.column,
                    format!("unknown command `{word}`")));
            }
            other => {
                return Err(Error::new(ErrorCode::P003, head.line, head.column,
                    format!("expected a command, found {}", other.describe())));
            }
        };

        let mut op = Operation::new(code).at_line(head.line);

        if code.info().takes_name {
            let tok = self.peek().clone();
            match tok.kind {
                TokenKind::Ident(name) => { self.advance(); op.name = Some(name); }
                TokenKind::Command(kw) => {
                    return Err(Error::new(ErrorCode::P004, tok.line, tok.column,
                        format!("`{kw}` is reserved and cannot name a {}", name_role(code.keyword()))));
                }
                other => {
                    return Err(Error::new(ErrorCode::P002, tok.line, tok.column,
                        format!("`{code}` needs a name, found {}", other.describe())));
                }
            }
        }

        while !self.peek_kind().is_line_end() {
            let tok = self.advance().clone();
            let arg = match tok.kind {
                TokenKind::Int(n)       => Value::Number(n),
                TokenKind::Ident(name)  => Value::VariableRef(name),
                TokenKind::StringLit(s) => Value::Text(s),
                TokenKind::Command(kw)  => {
                    return Err(Error::new(ErrorCode::P004, tok.line, tok.column,
                        format!("`{kw}` is reserved and cannot be used as an operand")));
                }
                TokenKind::Newline | TokenKind::Eof => break,
            };
            op.args.push(arg);
        }

        Ok(op)
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Skip to the start of the next line.
    fn recover(&mut self) {
        while !self.peek_kind().is_line_end() {
            self.advance();
        }
    }
}

fn name_role(keyword: &str) -> &'static str {
    match keyword {
        "begin" | "draw" => "figure",
        "import"         => "file",
        _                => "variable",
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
