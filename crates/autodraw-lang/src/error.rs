use thiserror::Error;

use crate::instruction::Command;

/// Syntax error codes prefixed by phase: L = lexer, P = parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated string literal
    L003, // invalid escape sequence
    L004, // integer literal out of range

    // Parser
    P001, // unknown command
    P002, // missing name
    P003, // unexpected token
    P004, // reserved word used as name
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::L003 => "L003",
            Self::L004 => "L004",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::P003 => "P003",
            Self::P004 => "P004",
        }
    }
}

/// Line-level syntax diagnostic.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{}] {line}:{column}: {message}", .code.as_str())]
pub struct Error {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Error {
    pub fn new(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self { code, line, column, message: message.into() }
    }
}

// ─── Variables ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("`{0}` is not an integer")]
    NotInteger(String),
    #[error("`{0}` is not a transform")]
    NotTransform(String),
    #[error("`{0}` is not text")]
    NotText(String),
    #[error("invalid value `{0}`")]
    InvalidValue(String),
}

// ─── Instructions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstructionError {
    #[error("invalid number of arguments for {command}: got {got}")]
    InvalidArgCount { command: Command, got: usize },
    #[error("coordinate {0} leaves the fixed-point range")]
    Overflow(f64),
    #[error("text of {0} code units does not fit in one instruction")]
    TextTooLong(usize),
}

/// Wire-format failure. Decoding never yields a partial instruction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("malformed stream at byte {offset}: unknown command code {code}")]
    UnknownCommand { offset: usize, code: u16 },
    #[error("malformed stream at byte {offset}: {needed} more bytes needed, {available} available")]
    Truncated { offset: usize, needed: usize, available: usize },
    #[error("malformed stream at byte {offset}: {source}")]
    BadArguments { offset: usize, source: InstructionError },
}

// ─── Evaluation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Reason {
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Instruction(#[from] InstructionError),
    #[error("expected {expected} arguments, got {got}")]
    ArgCount { expected: String, got: usize },
    #[error("missing name operand")]
    MissingName,
    #[error("figure `{0}` already exists")]
    DuplicateFigure(String),
    #[error("figure `{0}` does not exist")]
    UnknownFigure(String),
    #[error("`end` without an open figure")]
    UnmatchedEnd,
    #[error("figure `{0}` is missing its `end`")]
    UnclosedFigure(String),
    #[error("transform stack already empty")]
    StackUnderflow,
    #[error("figure `{0}` draws itself")]
    RecursiveFigure(String),
    #[error("draw nesting deeper than {0}")]
    DrawDepthExceeded(usize),
    #[error("error in figure `{figure}`: {source}")]
    InFigure { figure: String, source: Box<RuntimeError> },
}

/// Evaluation failure, tagged with the operation that caused it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[runtime] {line} `{operation}`: {reason}")]
pub struct RuntimeError {
    pub line: usize,
    pub operation: String,
    pub reason: Reason,
}

impl RuntimeError {
    pub fn new(line: usize, operation: impl Into<String>, reason: impl Into<Reason>) -> Self {
        Self { line, operation: operation.into(), reason: reason.into() }
    }

    /// Innermost reason, looking through sub-figure wrapping.
    pub fn root_reason(&self) -> &Reason {
        match &self.reason {
            Reason::InFigure { source, .. } => source.root_reason(),
            other => other,
        }
    }

    /// Figure names from the outermost `draw` inwards.
    pub fn figure_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut cur = self;
        while let Reason::InFigure { figure, source } = &cur.reason {
            chain.push(figure.as_str());
            cur = source;
        }
        chain
    }
}

// ─── Top level ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("{}", syntax_summary(.0))]
    Syntax(Vec<Error>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn syntax_summary(errors: &[Error]) -> String {
    match errors {
        [] => "syntax error".into(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
