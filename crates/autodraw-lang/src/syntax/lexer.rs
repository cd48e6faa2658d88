use crate::error::{Error, ErrorCode};
use crate::syntax::token::{Token, TokenKind, keyword_or_ident};

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    /// Newlines are significant: one operation per line. Blank and comment
    /// lines still produce their `Newline`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<Error>> {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            self.skip_blanks();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
                break;
            }

            match self.next_token() {
                Ok(Some(tok)) => tokens.push(tok),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() { Ok(tokens) } else { Err(errors) }
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        let line = self.line;
        let col = self.column;
        let ch = self.advance();

        let kind = match ch {
            b'\n' => TokenKind::Newline,
            b'#' => { self.skip_line(); return Ok(None); }
            b'/' if self.peek() == b'/' => { self.skip_line(); return Ok(None); }
            b'"' => TokenKind::StringLit(self.read_string(line, col)?),
            b'-' if self.peek().is_ascii_digit() => TokenKind::Int(self.read_int(ch, line, col)?),
            b'0'..=b'9' => TokenKind::Int(self.read_int(ch, line, col)?),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => keyword_or_ident(self.read_ident(ch)),

            other => {
                let shown = self.char_at(self.pos - 1, other);
                self.skip_continuation();
                return Err(Error::new(ErrorCode::L001, line, col,
                    format!("unexpected character `{shown}`")));
            }
        };

        Ok(Some(Token::new(kind, line, col)))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        if ch == b'\n' { self.line += 1; self.column = 1; }
        else { self.column += 1; }
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.pos] }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn skip_blanks(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' => { self.advance(); }
                _ => break,
            }
        }
    }

    /// Stops before the newline so it is still emitted.
    fn skip_line(&mut self) {
        while !self.is_at_end() && self.peek() != b'\n' { self.advance(); }
    }

    /// Skips the tail bytes of a multi-byte UTF-8 character.
    fn skip_continuation(&mut self) {
        while !self.is_at_end() && self.peek() & 0xC0 == 0x80 { self.advance(); }
    }

    fn char_at(&self, start: usize, first: u8) -> char {
        std::str::from_utf8(&self.source[start..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(first as char)
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_string(&mut self, start_line: usize, start_col: usize) -> Result<String, Error> {
        let mut bytes = Vec::new();
        let mut error: Option<Error> = None;
        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(Error::new(ErrorCode::L002, start_line, start_col,
                    "unterminated string literal"));
            }
            let ch = self.advance();
            if ch == b'"' { break; }
            if ch == b'\\' {
                if self.is_at_end() || self.peek() == b'\n' {
                    return Err(Error::new(ErrorCode::L002, start_line, start_col,
                        "unterminated string literal"));
                }
                let esc_line = self.line;
                let esc_col  = self.column;
                match self.advance() {
                    b'n'  => bytes.push(b'\n'),
                    b'"'  => bytes.push(b'"'),
                    b'\\' => bytes.push(b'\\'),
                    other => {
                        // Keep the first bad escape, consume the rest of the string.
                        if error.is_none() {
                            error = Some(Error::new(ErrorCode::L003, esc_line, esc_col,
                                format!("unknown escape sequence `\\{}`", other as char)));
                        }
                    }
                }
            } else {
                bytes.push(ch);
            }
        }
        if let Some(e) = error { return Err(e); }
        // Quotes and escapes are ASCII, so the bytes are still valid UTF-8.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_int(&mut self, first: u8, line: usize, col: usize) -> Result<i16, Error> {
        let mut s = String::new();
        s.push(first as char);
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            s.push(self.advance() as char);
        }
        s.parse().map_err(|_| Error::new(ErrorCode::L004, line, col,
            format!("integer `{s}` outside {}..={}", i16::MIN, i16::MAX)))
    }

    fn read_ident(&mut self, first: u8) -> String {
        let mut s = String::new();
        s.push(first as char);
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            s.push(self.advance() as char);
        }
        s
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
