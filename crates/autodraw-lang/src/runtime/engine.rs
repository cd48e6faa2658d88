//! Evaluation engine. Dispatches operations to the variable table, transform
//! stack and figure library, and appends the resulting instructions.
//!
//! Two states: idle, where operations take effect, and recording, where every
//! operation between `begin NAME` and its matching `end` is stored verbatim as
//! the body of `NAME`. `draw NAME` replays a body on a fresh frame whose stack
//! is seeded with the caller's transform.

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::error::{Reason, RuntimeError};
use crate::instruction::{codec, geometry, Instruction};
use crate::runtime::env::VarTable;
use crate::runtime::stack::TransformStack;
use crate::types::mat::Matrix;
use crate::types::operation::{OpCode, Operation};
use crate::Value;

/// Figure name to its unevaluated body.
pub type Library = HashMap<String, Vec<Operation>>;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deepest chain of nested `draw`s before evaluation gives up.
    pub max_draw_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_draw_depth: 64 }
    }
}

#[derive(Debug, Clone)]
struct Recording {
    name: String,
    depth: usize,
    /// `begin` line, for the unclosed-figure diagnostic.
    line: usize,
}

/// Per-evaluation state. A `draw` gets its own.
#[derive(Debug, Default)]
struct Frame {
    env: VarTable,
    stack: TransformStack,
    pending: Option<Matrix>,
    recording: Option<Recording>,
    output: Vec<Instruction>,
}

impl Frame {
    fn seeded(ctm: Matrix) -> Self {
        Self { stack: TransformStack::seeded(ctm), ..Self::default() }
    }
}

/// Shared across one `draw` chain.
struct Ctx<'a> {
    library: &'a mut Library,
    config: &'a EngineConfig,
    /// Figures currently being replayed, outermost first.
    chain: Vec<String>,
}

pub struct Engine {
    library: Library,
    frame: Frame,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self { Self::new() }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { library: Library::new(), frame: Frame::default(), config }
    }

    /// Evaluate one operation. A failure leaves the engine usable but the
    /// caller is expected to abandon the run.
    pub fn update(&mut self, op: &Operation) -> Result<(), RuntimeError> {
        let mut ctx = Ctx { library: &mut self.library, config: &self.config, chain: Vec::new() };
        step(&mut self.frame, &mut ctx, op)
    }

    /// Evaluate operations in order, stopping at the first failure.
    pub fn run<'a>(&mut self, ops: impl IntoIterator<Item = &'a Operation>) -> Result<(), RuntimeError> {
        for op in ops {
            self.update(op)?;
        }
        Ok(())
    }

    /// End of input. Fails if a figure is still being recorded.
    pub fn finish(self) -> Result<Vec<Instruction>, RuntimeError> {
        if let Some(rec) = self.frame.recording {
            let text = format!("begin {}", rec.name);
            return Err(RuntimeError::new(rec.line, text, Reason::UnclosedFigure(rec.name)));
        }
        Ok(self.frame.output)
    }

    pub fn encode(&self) -> Vec<u8> {
        codec::encode(&self.frame.output)
    }

    pub fn instructions(&self) -> &[Instruction] { &self.frame.output }

    pub fn lookup(&self, name: &str) -> Option<&Value> { self.frame.env.lookup(name) }

    pub fn vars(&self) -> &VarTable { &self.frame.env }

    pub fn has_figure(&self, name: &str) -> bool { self.library.contains_key(name) }

    pub fn figure(&self, name: &str) -> Option<&[Operation]> {
        self.library.get(name).map(Vec::as_slice)
    }

    /// Sorted figure names.
    pub fn figure_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.library.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Figure being recorded, if any.
    pub fn recording(&self) -> Option<&str> {
        self.frame.recording.as_ref().map(|r| r.name.as_str())
    }

    pub fn current_transform(&self) -> Matrix { self.frame.stack.current() }

    pub fn stack_depth(&self) -> usize { self.frame.stack.depth() }

    pub fn pending_transform(&self) -> Option<&Matrix> { self.frame.pending.as_ref() }
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

fn step(frame: &mut Frame, ctx: &mut Ctx<'_>, op: &Operation) -> Result<(), RuntimeError> {
    let result = match frame.recording {
        Some(_) => {
            record(frame, ctx.library, op);
            Ok(())
        }
        None => dispatch(frame, ctx, op),
    };
    result.map_err(|reason| RuntimeError::new(op.line, op.to_string(), reason))
}

fn record(frame: &mut Frame, library: &mut Library, op: &Operation) {
    let Some(rec) = frame.recording.as_mut() else { return };
    match op.command {
        OpCode::Begin => rec.depth += 1,
        OpCode::End => {
            rec.depth -= 1;
            if rec.depth == 0 {
                debug!("figure `{}` closed", rec.name);
                frame.recording = None;
                return;
            }
        }
        _ => {}
    }
    library.entry(rec.name.clone()).or_default().push(op.clone());
}

fn dispatch(frame: &mut Frame, ctx: &mut Ctx<'_>, op: &Operation) -> Result<(), Reason> {
    debug!("{:>4}: {op}", op.line);

    let info = op.command.info();
    if !info.arity.accepts(op.args.len()) {
        return Err(Reason::ArgCount { expected: info.arity.to_string(), got: op.args.len() });
    }
    let name = match (&op.name, info.takes_name) {
        (Some(n), true) => n.as_str(),
        (None, true)    => return Err(Reason::MissingName),
        (_, false)      => "",
    };

    match op.command {
        OpCode::Line => {
            let n = frame.env.resolve_numbers(&op.args)?;
            emit(frame, geometry::line(four(&n))?)
        }
        OpCode::Rect => {
            let n = frame.env.resolve_numbers(&op.args)?;
            emit(frame, geometry::rect(four(&n))?)
        }
        OpCode::Oval => {
            let [x, y, a, b] = four(&frame.env.resolve_numbers(&op.args)?);
            emit(frame, geometry::oval(x, y, a, b)?)
        }
        OpCode::Polygon => {
            let n = frame.env.resolve_numbers(&op.args)?;
            emit(frame, geometry::polygon(&n)?)
        }
        OpCode::Text => {
            let n = frame.env.resolve_numbers(&op.args[..3])?;
            let s = frame.env.resolve_text(&op.args[3])?;
            emit(frame, geometry::text(n[0], n[1], n[2], &s)?)
        }
        OpCode::Node => {
            let n = frame.env.resolve_numbers(&op.args[..4])?;
            let s = frame.env.resolve_text(&op.args[4])?;
            emit(frame, geometry::node(n[0], n[1], n[2], n[3], &s)?)
        }

        OpCode::Set => {
            frame.env.assign(name, op.args[0].clone())?;
            Ok(())
        }
        OpCode::Transform | OpCode::Rotate | OpCode::Scale | OpCode::Translate => {
            let n = frame.env.resolve_numbers(&op.args)?;
            let m = match op.command {
                OpCode::Rotate    => Matrix::from_degrees(n[0]),
                OpCode::Scale     => Matrix::from_centi_scale(n[0], n[1]),
                OpCode::Translate => Matrix::from_offsets(n[0], n[1]),
                _                 => Matrix::from_rows([n[0], n[1], n[2], n[3], n[4], n[5]]),
            };
            frame.env.assign(name, Value::Transform(m))?;
            Ok(())
        }

        OpCode::Use => {
            frame.pending = Some(frame.env.transform(name)?);
            Ok(())
        }
        OpCode::Push => {
            let m = frame.env.transform(name)?;
            frame.stack.push(m);
            Ok(())
        }
        OpCode::Pop => {
            if frame.stack.pop() { Ok(()) } else { Err(Reason::StackUnderflow) }
        }

        OpCode::Begin => {
            if ctx.library.contains_key(name) {
                return Err(Reason::DuplicateFigure(name.to_string()));
            }
            ctx.library.insert(name.to_string(), Vec::new());
            frame.recording = Some(Recording { name: name.to_string(), depth: 1, line: op.line });
            Ok(())
        }
        OpCode::End => Err(Reason::UnmatchedEnd),
        OpCode::Draw => draw_figure(frame, ctx, name),

        OpCode::Import => {
            warn!("`import {name}` reached the engine; imports are resolved by the loader");
            Ok(())
        }
    }
}

/// CTM for the next drawing or `draw`, consuming any one-shot transform.
fn take_frame_transform(frame: &mut Frame) -> Matrix {
    let one_shot = frame.pending.take();
    frame.stack.current_with(one_shot.as_ref())
}

/// Places `inst` in the current frame and appends it.
fn emit(frame: &mut Frame, mut inst: Instruction) -> Result<(), Reason> {
    let ctm = take_frame_transform(frame);
    if !ctm.is_identity() {
        inst.map_points(|x, y| ctm.apply(x, y))?;
    }
    debug!("      -> {inst}");
    frame.output.push(inst);
    Ok(())
}

fn draw_figure(frame: &mut Frame, ctx: &mut Ctx<'_>, name: &str) -> Result<(), Reason> {
    let body = ctx.library.get(name)
        .cloned()
        .ok_or_else(|| Reason::UnknownFigure(name.to_string()))?;
    if ctx.chain.iter().any(|n| n == name) {
        return Err(Reason::RecursiveFigure(name.to_string()));
    }
    if ctx.chain.len() >= ctx.config.max_draw_depth {
        return Err(Reason::DrawDepthExceeded(ctx.config.max_draw_depth));
    }

    let ctm = take_frame_transform(frame);
    let mut sub = Frame::seeded(ctm);
    ctx.chain.push(name.to_string());
    trace!("replay `{name}`: {} ops, depth {}", body.len(), ctx.chain.len());

    let replayed = replay(&mut sub, ctx, &body);
    ctx.chain.pop();
    replayed.map_err(|e| Reason::InFigure { figure: name.to_string(), source: Box::new(e) })?;

    trace!("replay `{name}` done: {} instructions", sub.output.len());
    frame.output.append(&mut sub.output);
    Ok(())
}

fn replay(frame: &mut Frame, ctx: &mut Ctx<'_>, body: &[Operation]) -> Result<(), RuntimeError> {
    for op in body {
        step(frame, ctx, op)?;
    }
    Ok(())
}

fn four(n: &[i16]) -> [i16; 4] {
    // Arity was checked before resolution.
    [n[0], n[1], n[2], n[3]]
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;
    use crate::instruction::Command;
    use pretty_assertions::assert_eq;

    fn named(code: OpCode, name: &str) -> Operation {
        Operation::named(code, name)
    }

    fn num(e: &Engine, name: &str) -> i16 {
        match e.lookup(name) {
            Some(Value::Number(n)) => *n,
            other => panic!("expected number for '{name}', got: {other:?}"),
        }
    }

    #[test]
    fn draws_in_order() {
        let mut e = Engine::new();
        e.update(&Operation::line([120, 300, 110, 310])).unwrap();
        e.update(&Operation::rect([110, 0, 0, 110])).unwrap();
        let out = e.finish().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].command(), Command::LineStrip);
        assert_eq!(out[1].args(), &[110, 0, 110, 110, 0, 110, 0, 0, 110, 0]);
    }

    #[test]
    fn copy_on_assign() {
        let mut e = Engine::new();
        e.run(&[
            Operation::set("Alice", Value::Number(15)),
            Operation::set("Bob", Value::var("Alice")),
            Operation::set("Alice", Value::Number(25)),
        ]).unwrap();
        assert_eq!(num(&e, "Bob"), 15);
        assert_eq!(num(&e, "Alice"), 25);
    }

    #[test]
    fn pop_underflow_keeps_state() {
        let mut e = Engine::new();
        let err = e.update(&Operation::pop()).unwrap_err();
        assert_eq!(err.reason, Reason::StackUnderflow);
        assert_eq!(err.operation, "pop");
        assert_eq!(e.stack_depth(), 0);
    }

    #[test]
    fn recording_captures_nested_bodies() {
        let mut e = Engine::new();
        e.run(&[
            named(OpCode::Begin, "A"),
            named(OpCode::Begin, "B"),
            Operation::line([0, 0, 1, 1]),
            Operation::end(),
            Operation::end(),
        ]).unwrap();
        assert_eq!(e.recording(), None);
        assert!(e.has_figure("A"));
        assert!(!e.has_figure("B"));
        assert_eq!(e.figure("A").map(<[_]>::len), Some(4));
        assert!(e.instructions().is_empty());
    }

    #[test]
    fn arity_checked_before_resolution() {
        let mut e = Engine::new();
        let op = Operation::new(OpCode::Line).with_args(vec![Value::var("nope")]);
        let err = e.update(&op).unwrap_err();
        assert!(matches!(err.reason, Reason::ArgCount { got: 1, .. }));
    }

    #[test]
    fn missing_name() {
        let mut e = Engine::new();
        let err = e.update(&Operation::new(OpCode::Push)).unwrap_err();
        assert_eq!(err.reason, Reason::MissingName);
    }

    #[test]
    fn use_requires_transform() {
        let mut e = Engine::new();
        e.update(&Operation::set("n", Value::Number(3))).unwrap();
        let err = e.update(&named(OpCode::Use, "n")).unwrap_err();
        assert_eq!(err.reason, Reason::Value(ValueError::NotTransform("n".into())));
        assert!(e.pending_transform().is_none());
    }

    #[test]
    fn draw_depth_limit() {
        let mut e = Engine::with_config(EngineConfig { max_draw_depth: 1 });
        e.run(&[
            named(OpCode::Begin, "Inner"),
            Operation::line([0, 0, 1, 1]),
            Operation::end(),
            named(OpCode::Begin, "Outer"),
            named(OpCode::Draw, "Inner"),
            Operation::end(),
        ]).unwrap();
        e.update(&named(OpCode::Draw, "Inner")).unwrap();
        let err = e.update(&named(OpCode::Draw, "Outer")).unwrap_err();
        assert_eq!(err.root_reason(), &Reason::DrawDepthExceeded(1));
        assert_eq!(err.figure_chain(), vec!["Outer"]);
    }
}
