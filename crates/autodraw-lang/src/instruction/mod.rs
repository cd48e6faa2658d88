//! Resolved drawing primitives and their wire format.

pub mod codec;
pub mod geometry;

use std::fmt;
use std::ops::Range;

use crate::error::InstructionError;

// ─── Command table ────────────────────────────────────────────────────────────

/// Instruction kind. The discriminant is the wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    LineStrip = 1,
    Curve     = 2,
    Text      = 3,
    Node      = 4,
}

/// Shape of an instruction's argument list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// Open strip `x0 y0 x1 y1 ...` (even, at least two points), or the
    /// closed polygon form `n x0 y0 ... x0 y0` with `n` the point values.
    Strip,
    /// Exactly `n` values, all coordinates.
    Fixed(usize),
    /// `n` leading values followed by zero or more UTF-16 code units.
    Header(usize),
}

pub struct CommandInfo {
    pub command: Command,
    pub name: &'static str,
    pub shape: ArgShape,
}

static COMMANDS: [CommandInfo; 4] = [
    CommandInfo { command: Command::LineStrip, name: "line_strip", shape: ArgShape::Strip },
    CommandInfo { command: Command::Curve,     name: "curve",      shape: ArgShape::Fixed(CURVE_ARGS) },
    CommandInfo { command: Command::Text,      name: "text",       shape: ArgShape::Header(3) },
    CommandInfo { command: Command::Node,      name: "node",       shape: ArgShape::Header(4) },
];

/// Four cubic arcs: one start anchor then three points per arc.
pub const CURVE_ARGS: usize = 26;

/// Largest argument list the wire format can frame.
pub const MAX_ARGS: usize = u16::MAX as usize;

impl Command {
    pub fn info(self) -> &'static CommandInfo {
        &COMMANDS[self as usize - 1]
    }

    pub fn code(self) -> u16 { self as u16 }

    pub fn from_code(code: u16) -> Option<Command> {
        COMMANDS.iter().find(|i| i.command.code() == code).map(|i| i.command)
    }

    pub fn name(self) -> &'static str { self.info().name }

    pub fn shape(self) -> ArgShape { self.info().shape }

    /// Whether `args` is a well-formed argument list for this command.
    pub fn accepts(self, args: &[i16]) -> bool {
        if args.len() > MAX_ARGS {
            return false;
        }
        match self.shape() {
            ArgShape::Fixed(n)  => args.len() == n,
            ArgShape::Header(n) => args.len() >= n,
            ArgShape::Strip     => is_open_strip(args) || is_polygon_form(args),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_open_strip(args: &[i16]) -> bool {
    args.len() >= 4 && args.len() % 2 == 0
}

fn is_polygon_form(args: &[i16]) -> bool {
    match args.first() {
        Some(&n) => n >= 4 && n % 2 == 0 && n as usize + 3 == args.len(),
        None => false,
    }
}

// ─── Instruction ──────────────────────────────────────────────────────────────

/// A fully resolved drawing primitive. Always satisfies its command's
/// argument shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    command: Command,
    args: Vec<i16>,
}

impl Instruction {
    pub fn new(command: Command, args: Vec<i16>) -> Result<Self, InstructionError> {
        if !command.accepts(&args) {
            return Err(InstructionError::InvalidArgCount { command, got: args.len() });
        }
        Ok(Self { command, args })
    }

    pub fn command(&self) -> Command { self.command }

    pub fn args(&self) -> &[i16] { &self.args }

    /// A `LineStrip` in polygon form, which the renderer closes itself.
    pub fn is_closed(&self) -> bool {
        self.command == Command::LineStrip && is_polygon_form(&self.args)
    }

    /// Indices of the values the current transform applies to.
    pub fn coordinate_slots(&self) -> Range<usize> {
        match self.command {
            Command::LineStrip if self.is_closed() => 1..self.args.len(),
            Command::LineStrip | Command::Curve    => 0..self.args.len(),
            Command::Text | Command::Node          => 0..2,
        }
    }

    /// Coordinate pairs in order.
    pub fn points(&self) -> Vec<(i16, i16)> {
        self.args[self.coordinate_slots()]
            .chunks_exact(2)
            .map(|p| (p[0], p[1]))
            .collect()
    }

    /// Maps every coordinate pair through `f`. Results are rounded half away
    /// from zero; a result outside the fixed-point range fails and leaves the
    /// instruction untouched.
    pub fn map_points(
        &mut self,
        mut f: impl FnMut(f64, f64) -> (f64, f64),
    ) -> Result<(), InstructionError> {
        let slots = self.coordinate_slots();
        let mut mapped = self.args.clone();
        for pair in mapped[slots].chunks_exact_mut(2) {
            let (x, y) = f(f64::from(pair[0]), f64::from(pair[1]));
            pair[0] = to_fixed(x)?;
            pair[1] = to_fixed(y)?;
        }
        self.args = mapped;
        Ok(())
    }

    /// Leading non-text values of a `Text` or `Node`.
    pub fn header(&self) -> &[i16] {
        match self.command.shape() {
            ArgShape::Header(n) => &self.args[..n],
            _ => &self.args,
        }
    }

    /// Decoded string of a `Text` or `Node`; unpaired surrogates become U+FFFD.
    pub fn text_content(&self) -> Option<String> {
        match self.command.shape() {
            ArgShape::Header(n) => {
                let units: Vec<u16> = self.args[n..].iter().map(|&c| c as u16).collect();
                Some(String::from_utf16_lossy(&units))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.command)?;
        for (i, a) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{a}")?;
        }
        f.write_str("]")
    }
}

/// Rounds half away from zero into the fixed-point range.
pub fn to_fixed(v: f64) -> Result<i16, InstructionError> {
    let r = v.round();
    if r.is_nan() || r < f64::from(i16::MIN) || r > f64::from(i16::MAX) {
        return Err(InstructionError::Overflow(v));
    }
    Ok(r as i16)
}
