//! Parsed source operations and the static command table.

use std::fmt;

use crate::Value;

// ─── Command table ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // Drawing
    Line,
    Rect,
    Oval,
    Polygon,
    Text,
    Node,
    // Assignment
    Set,
    Transform,
    Rotate,
    Scale,
    Translate,
    // Stack control
    Use,
    Push,
    Pop,
    // Figure control
    Begin,
    End,
    Draw,
    // Acknowledged, not evaluated
    Import,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind { Drawing, Assignment, Stack, Figure, NoOp }

/// Operand count an operation must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` operands.
    Fixed(usize),
    /// An even number of operands, at least `min`.
    Pairs { min: usize },
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Fixed(k)       => n == k,
            Arity::Pairs { min }  => n >= min && n % 2 == 0,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(k)      => write!(f, "{k}"),
            Arity::Pairs { min } => write!(f, "an even number (at least {min}) of"),
        }
    }
}

pub struct OpInfo {
    pub code: OpCode,
    pub keyword: &'static str,
    pub kind: OpKind,
    pub takes_name: bool,
    pub arity: Arity,
}

const fn op(code: OpCode, keyword: &'static str, kind: OpKind, takes_name: bool, arity: Arity) -> OpInfo {
    OpInfo { code, keyword, kind, takes_name, arity }
}

use Arity::{Fixed, Pairs};

static OPS: [OpInfo; 18] = [
    op(OpCode::Line,      "line",      OpKind::Drawing,    false, Fixed(4)),
    op(OpCode::Rect,      "rect",      OpKind::Drawing,    false, Fixed(4)),
    op(OpCode::Oval,      "oval",      OpKind::Drawing,    false, Fixed(4)),
    op(OpCode::Polygon,   "polygon",   OpKind::Drawing,    false, Pairs { min: 4 }),
    op(OpCode::Text,      "text",      OpKind::Drawing,    false, Fixed(4)),
    op(OpCode::Node,      "node",      OpKind::Drawing,    false, Fixed(5)),
    op(OpCode::Set,       "set",       OpKind::Assignment, true,  Fixed(1)),
    op(OpCode::Transform, "transform", OpKind::Assignment, true,  Fixed(6)),
    op(OpCode::Rotate,    "rotate",    OpKind::Assignment, true,  Fixed(1)),
    op(OpCode::Scale,     "scale",     OpKind::Assignment, true,  Fixed(2)),
    op(OpCode::Translate, "translate", OpKind::Assignment, true,  Fixed(2)),
    op(OpCode::Use,       "use",       OpKind::Stack,      true,  Fixed(0)),
    op(OpCode::Push,      "push",      OpKind::Stack,      true,  Fixed(0)),
    op(OpCode::Pop,       "pop",       OpKind::Stack,      false, Fixed(0)),
    op(OpCode::Begin,     "begin",     OpKind::Figure,     true,  Fixed(0)),
    op(OpCode::End,       "end",       OpKind::Figure,     false, Fixed(0)),
    op(OpCode::Draw,      "draw",      OpKind::Figure,     true,  Fixed(0)),
    op(OpCode::Import,    "import",    OpKind::NoOp,       true,  Fixed(0)),
];

impl OpCode {
    pub fn info(self) -> &'static OpInfo {
        // OPS is declared in enum order.
        &OPS[self as usize]
    }

    pub fn keyword(self) -> &'static str { self.info().keyword }

    pub fn kind(self) -> OpKind { self.info().kind }

    pub fn from_keyword(word: &str) -> Option<OpCode> {
        OPS.iter().find(|i| i.keyword == word).map(|i| i.code)
    }

    pub fn all() -> impl Iterator<Item = OpCode> {
        OPS.iter().map(|i| i.code)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ─── Operation ────────────────────────────────────────────────────────────────

/// One source line: `command [name] args...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub command: OpCode,
    pub name: Option<String>,
    pub args: Vec<Value>,
    /// Source line, 0 when built in code.
    pub line: usize,
}

impl Operation {
    pub fn new(command: OpCode) -> Self {
        Self { command, name: None, args: Vec::new(), line: 0 }
    }

    pub fn named(command: OpCode, name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::new(command) }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    // ─── Shorthand constructors ──────────────────────────────────────────────

    pub fn line(coords: [i16; 4]) -> Self {
        Self::new(OpCode::Line).with_args(Value::numbers(&coords))
    }

    pub fn rect(coords: [i16; 4]) -> Self {
        Self::new(OpCode::Rect).with_args(Value::numbers(&coords))
    }

    pub fn oval(x: i16, y: i16, a: i16, b: i16) -> Self {
        Self::new(OpCode::Oval).with_args(Value::numbers(&[x, y, a, b]))
    }

    pub fn polygon(coords: &[i16]) -> Self {
        Self::new(OpCode::Polygon).with_args(Value::numbers(coords))
    }

    pub fn set(name: &str, value: Value) -> Self {
        Self::named(OpCode::Set, name).with_args(vec![value])
    }

    pub fn pop() -> Self { Self::new(OpCode::Pop) }

    pub fn end() -> Self { Self::new(OpCode::End) }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command.keyword())?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_in_enum_order() {
        for code in OpCode::all() {
            assert_eq!(code.info().code, code);
            assert_eq!(OpCode::from_keyword(code.keyword()), Some(code));
        }
        assert_eq!(OpCode::from_keyword("circle"), None);
    }

    #[test]
    fn kinds_follow_table() {
        assert_eq!(OpCode::Polygon.kind(), OpKind::Drawing);
        assert_eq!(OpCode::Rotate.kind(), OpKind::Assignment);
        assert_eq!(OpCode::Use.kind(), OpKind::Stack);
        assert_eq!(OpCode::Draw.kind(), OpKind::Figure);
        assert_eq!(OpCode::Import.kind(), OpKind::NoOp);
    }

    #[test]
    fn arity_rules() {
        assert!(Arity::Fixed(4).accepts(4));
        assert!(!Arity::Fixed(4).accepts(5));
        let pairs = Arity::Pairs { min: 4 };
        assert!(pairs.accepts(4) && pairs.accepts(6));
        assert!(!pairs.accepts(2) && !pairs.accepts(5));
    }

    #[test]
    fn display_is_source_like() {
        assert_eq!(Operation::line([120, 300, 110, 310]).to_string(), "line 120 300 110 310");
        assert_eq!(Operation::set("B", Value::var("A")).to_string(), "set B A");
        assert_eq!(Operation::pop().to_string(), "pop");
        let t = Operation::new(OpCode::Text)
            .with_args(vec![Value::Number(0), Value::Number(0), Value::Number(20), Value::text("AB")]);
        assert_eq!(t.to_string(), "text 0 0 20 \"AB\"");
    }
}
