use crate::types::operation::OpCode;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i16),
    Ident(String),
    StringLit(String),

    // Command keywords
    Command(OpCode),

    Newline,
    Eof,
}

impl TokenKind {
    pub fn is_line_end(&self) -> bool {
        matches!(self, Self::Newline | Self::Eof)
    }

    /// Short description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Int(n)       => format!("integer `{n}`"),
            Self::Ident(s)     => format!("name `{s}`"),
            Self::StringLit(s) => format!("string {s:?}"),
            Self::Command(c)   => format!("keyword `{c}`"),
            Self::Newline      => "end of line".into(),
            Self::Eof          => "end of input".into(),
        }
    }
}

/// Maps an identifier string to its command keyword, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    match OpCode::from_keyword(&s) {
        Some(code) => TokenKind::Command(code),
        None       => TokenKind::Ident(s),
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}
