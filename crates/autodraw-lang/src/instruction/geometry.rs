//! Expansion of source shapes into instructions, on untransformed integers.

use crate::error::InstructionError;
use crate::instruction::{Command, Instruction, MAX_ARGS};

/// Weight of the bounding-box corner in an oval control point.
pub const CORNER_WEIGHT: f64 = 0.55;
/// Weight of the adjacent anchor in an oval control point.
pub const ANCHOR_WEIGHT: f64 = 0.45;

pub fn line([x1, y1, x2, y2]: [i16; 4]) -> Result<Instruction, InstructionError> {
    Instruction::new(Command::LineStrip, vec![x1, y1, x2, y2])
}

/// Closed 5-point strip `(x1,y1) (x1,y2) (x2,y2) (x2,y1) (x1,y1)`.
pub fn rect([x1, y1, x2, y2]: [i16; 4]) -> Result<Instruction, InstructionError> {
    Instruction::new(Command::LineStrip, vec![x1, y1, x1, y2, x2, y2, x2, y1, x1, y1])
}

/// Point list prefixed with its length and closed by repeating the first
/// point.
pub fn polygon(points: &[i16]) -> Result<Instruction, InstructionError> {
    if points.len() < 4 || points.len() % 2 != 0 {
        return Err(InstructionError::InvalidArgCount {
            command: Command::LineStrip,
            got: points.len(),
        });
    }
    let n = i16::try_from(points.len())
        .map_err(|_| InstructionError::Overflow(points.len() as f64))?;
    let mut args = Vec::with_capacity(points.len() + 3);
    args.push(n);
    args.extend_from_slice(points);
    args.extend_from_slice(&points[..2]);
    Instruction::new(Command::LineStrip, args)
}

/// Four cubic arcs counter-clockwise from `(x+a, y)`. Control points blend the
/// box corner with the neighbouring anchor and truncate toward zero.
pub fn oval(x: i16, y: i16, a: i16, b: i16) -> Result<Instruction, InstructionError> {
    let (x, y, a, b) = (i32::from(x), i32::from(y), i32::from(a), i32::from(b));
    let anchors = [
        (fixed(x + a)?, fixed(y)?),
        (fixed(x)?,     fixed(y + b)?),
        (fixed(x - a)?, fixed(y)?),
        (fixed(x)?,     fixed(y - b)?),
    ];
    let corners = [
        (fixed(x + a)?, fixed(y + b)?),
        (fixed(x - a)?, fixed(y + b)?),
        (fixed(x - a)?, fixed(y - b)?),
        (fixed(x + a)?, fixed(y - b)?),
    ];

    let mut args = Vec::with_capacity(26);
    args.extend([anchors[0].0, anchors[0].1]);
    for (i, &corner) in corners.iter().enumerate() {
        let from = anchors[i];
        let to = anchors[(i + 1) % 4];
        let c1 = control(corner, from);
        let c2 = control(corner, to);
        args.extend([c1.0, c1.1, c2.0, c2.1, to.0, to.1]);
    }
    Instruction::new(Command::Curve, args)
}

/// `x y scale` followed by the UTF-16 code units of `s`.
pub fn text(x: i16, y: i16, scale: i16, s: &str) -> Result<Instruction, InstructionError> {
    with_text(Command::Text, vec![x, y, scale], s)
}

/// `x y color label` followed by the UTF-16 code units of `s`.
pub fn node(x: i16, y: i16, color: i16, label: i16, s: &str) -> Result<Instruction, InstructionError> {
    with_text(Command::Node, vec![x, y, color, label], s)
}

fn with_text(command: Command, mut args: Vec<i16>, s: &str) -> Result<Instruction, InstructionError> {
    let units = s.encode_utf16().count();
    if units > MAX_ARGS - args.len() {
        return Err(InstructionError::TextTooLong(units));
    }
    args.extend(s.encode_utf16().map(|u| u as i16));
    Instruction::new(command, args)
}

fn control((cx, cy): (i16, i16), (ax, ay): (i16, i16)) -> (i16, i16) {
    // Both inputs are in range, so the blend is too; `as` truncates.
    let blend = |c: i16, a: i16| (f64::from(c) * CORNER_WEIGHT + f64::from(a) * ANCHOR_WEIGHT) as i16;
    (blend(cx, ax), blend(cy, ay))
}

fn fixed(v: i32) -> Result<i16, InstructionError> {
    i16::try_from(v).map_err(|_| InstructionError::Overflow(f64::from(v)))
}
