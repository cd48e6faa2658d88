//! Evaluation tests.
//!
//! Source text goes through the full stack: parse → Engine::run → finish.
//! Instructions are compared as `(command, args)` pairs.

use autodraw_lang::{
    compile, parse, Command, CompileError, Engine, InstructionError, Reason, RuntimeError,
    Value, ValueError,
};
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn engine(src: &str) -> Engine {
    let ops = parse(src).unwrap_or_else(|errs| panic!("parse failed: {errs:#?}"));
    let mut e = Engine::new();
    e.run(&ops).unwrap_or_else(|err| panic!("run failed: {err}"));
    e
}

fn run(src: &str) -> Vec<(Command, Vec<i16>)> {
    compile(src)
        .unwrap_or_else(|e| panic!("compile failed: {e}"))
        .into_iter()
        .map(|i| (i.command(), i.args().to_vec()))
        .collect()
}

fn run_err(src: &str) -> RuntimeError {
    match compile(src) {
        Ok(out) => panic!("expected a runtime error, got {} instructions", out.len()),
        Err(CompileError::Syntax(errs)) => panic!("expected runtime error, not syntax error: {errs:#?}"),
        Err(CompileError::Runtime(e)) => e,
    }
}

fn strip(args: &[i16]) -> (Command, Vec<i16>) {
    (Command::LineStrip, args.to_vec())
}

fn num(e: &Engine, name: &str) -> i16 {
    match e.lookup(name) {
        Some(Value::Number(n)) => *n,
        other => panic!("expected number for '{name}', got: {other:?}"),
    }
}

// ─── Drawing ──────────────────────────────────────────────────────────────────

#[test]
fn line_passes_through() {
    assert_eq!(run("line 120 300 110 310"), vec![strip(&[120, 300, 110, 310])]);
}

#[test]
fn rect_expands_to_closed_strip() {
    assert_eq!(run("rect 110 0 0 110"), vec![strip(&[110, 0, 110, 110, 0, 110, 0, 0, 110, 0])]);
}

#[test]
fn polygon_is_prefixed_and_closed() {
    assert_eq!(
        run("polygon 110 100 0 10 210 220"),
        vec![strip(&[6, 110, 100, 0, 10, 210, 220, 110, 100])]
    );
}

#[test]
fn oval_expands_to_curve() {
    assert_eq!(
        run("oval 110 110 100 50"),
        vec![(Command::Curve, vec![
            210, 110, 210, 137, 165, 160, 110, 160, 55, 160, 10, 137, 10, 110,
            10, 82, 55, 60, 110, 60, 165, 60, 210, 82, 210, 110,
        ])]
    );
}

#[test]
fn text_and_node() {
    assert_eq!(
        run("set s \"AB\"\ntext 10 20 100 s\nnode 0 0 3855 7 \"n\""),
        vec![
            (Command::Text, vec![10, 20, 100, 65, 66]),
            (Command::Node, vec![0, 0, 3855, 7, 110]),
        ]
    );
}

#[test]
fn operands_may_name_numbers() {
    assert_eq!(
        run("set X 120\nset Y 300\nline X Y 110 310"),
        vec![strip(&[120, 300, 110, 310])]
    );
}

#[test]
fn draws_keep_source_order() {
    let out = run("line 0 0 1 1\nrect 0 0 1 1\nline 2 2 3 3");
    assert_eq!(out.len(), 3);
    assert_eq!(out[2], strip(&[2, 2, 3, 3]));
}

#[test]
fn import_is_ignored() {
    assert_eq!(run("import shapes\nline 0 0 1 1"), vec![strip(&[0, 0, 1, 1])]);
}

// ─── Variables ────────────────────────────────────────────────────────────────

#[test]
fn copy_on_assign() {
    let e = engine("set Alice 15\nset Bob Alice\nset Alice 25");
    assert_eq!(num(&e, "Bob"), 15);
    assert_eq!(num(&e, "Alice"), 25);
}

#[test]
fn copy_on_assign_small() {
    let e = engine("set A 10\nset B A\nset A 20");
    assert_eq!(num(&e, "B"), 10);
}

#[test]
fn undefined_variable() {
    let err = run_err("line X 0 0 0");
    assert_eq!(err.reason, Reason::Value(ValueError::UndefinedVariable("X".into())));
    assert_eq!(err.operation, "line X 0 0 0");
    assert_eq!(err.line, 1);
}

#[test]
fn transform_where_number_expected() {
    let err = run_err("translate T 1 1\nline T 0 0 0");
    assert_eq!(err.reason, Reason::Value(ValueError::NotInteger("T".into())));
    assert_eq!(err.line, 2);
}

#[test]
fn number_where_transform_expected() {
    let err = run_err("set n 5\nuse n");
    assert_eq!(err.reason, Reason::Value(ValueError::NotTransform("n".into())));
}

#[test]
fn number_where_text_expected() {
    let err = run_err("set n 5\ntext 0 0 100 n");
    assert_eq!(err.reason, Reason::Value(ValueError::NotText("n".into())));
}

#[test]
fn wrong_operand_count() {
    let err = run_err("line 1 2 3");
    assert_eq!(err.reason, Reason::ArgCount { expected: "4".into(), got: 3 });
    let err = run_err("polygon 1 2 3 4 5");
    assert!(matches!(err.reason, Reason::ArgCount { got: 5, .. }));
}

// ─── Transforms ───────────────────────────────────────────────────────────────

#[test]
fn one_shot_applies_once() {
    assert_eq!(
        run("scale S 200 200\nuse S\nline 1 1 2 2\nline 1 1 2 2"),
        vec![strip(&[2, 2, 4, 4]), strip(&[1, 1, 2, 2])]
    );
}

#[test]
fn pushed_frames_nest() {
    assert_eq!(
        run("scale S 200 200\ntranslate T 1 0\npush S\npush T\nline 0 0 0 0"),
        vec![strip(&[2, 0, 2, 0])]
    );
}

#[test]
fn pop_restores_previous_frame() {
    assert_eq!(
        run("scale S 200 200\npush S\nline 1 1 1 1\npop\nline 1 1 1 1"),
        vec![strip(&[2, 2, 2, 2]), strip(&[1, 1, 1, 1])]
    );
}

#[test]
fn one_shot_composes_with_stack() {
    assert_eq!(
        run("scale S 200 200\ntranslate T 10 0\npush S\nuse T\nline 0 0 0 0\nline 0 0 0 0"),
        vec![strip(&[20, 0, 20, 0]), strip(&[0, 0, 0, 0])]
    );
}

#[test]
fn rotate_takes_degrees() {
    assert_eq!(run("rotate R 90\nuse R\nline 100 0 0 0"), vec![strip(&[0, 100, 0, 0])]);
}

#[test]
fn general_transform_is_row_major() {
    assert_eq!(
        run("transform M 100 0 5 0 100 7\nuse M\nline 0 0 1 1"),
        vec![strip(&[5, 7, 6, 8])]
    );
}

#[test]
fn rounding_half_away_from_zero() {
    assert_eq!(run("scale H 50 50\nuse H\nline 1 3 -1 -3"), vec![strip(&[1, 2, -1, -2])]);
}

#[test]
fn polygon_prefix_is_not_transformed() {
    assert_eq!(
        run("translate T 10 0\nuse T\npolygon 0 0 10 0 10 10"),
        vec![strip(&[6, 10, 0, 20, 0, 20, 10, 10, 0])]
    );
}

#[test]
fn text_transforms_position_only() {
    assert_eq!(
        run("scale S 200 200\nuse S\ntext 10 20 100 \"A\""),
        vec![(Command::Text, vec![20, 40, 100, 65])]
    );
}

#[test]
fn oval_is_expanded_before_transform() {
    let out = run("translate T 1000 0\nuse T\noval 0 0 100 100");
    let (_, args) = &out[0];
    assert_eq!(&args[..4], &[1100, 0, 1100, 55]);
    assert_eq!(&args[24..], &[1100, 0]);
}

#[test]
fn transformed_overflow_is_an_error() {
    let err = run_err("scale S 200 200\nuse S\nline 20000 0 0 0");
    assert_eq!(err.reason, Reason::Instruction(InstructionError::Overflow(40000.0)));
}

#[test]
fn pop_on_empty_stack() {
    let err = run_err("pop");
    assert_eq!(err.reason, Reason::StackUnderflow);
}

#[test]
fn failed_pop_changes_nothing() {
    let ops = parse("scale S 200 200\npush S\npop\npop").unwrap();
    let mut e = Engine::new();
    e.run(&ops[..3]).unwrap();
    assert!(e.update(&ops[3]).is_err());
    assert_eq!(e.stack_depth(), 0);
}

// ─── Figures ──────────────────────────────────────────────────────────────────

#[test]
fn figure_body_is_recorded_not_drawn() {
    let e = engine("begin F\nline 0 0 1 1\nend");
    assert!(e.instructions().is_empty());
    assert_eq!(e.figure("F").map(<[_]>::len), Some(1));
}

#[test]
fn draw_replays_body() {
    assert_eq!(
        run("begin F\nline 0 0 10 0\nend\ndraw F\ndraw F"),
        vec![strip(&[0, 0, 10, 0]), strip(&[0, 0, 10, 0])]
    );
}

#[test]
fn draw_uses_caller_frame_and_one_shot() {
    assert_eq!(
        run("translate T 100 0\nbegin F\nline 0 0 10 0\nend\nuse T\ndraw F\ndraw F"),
        vec![strip(&[100, 0, 110, 0]), strip(&[0, 0, 10, 0])]
    );
}

#[test]
fn figure_transforms_do_not_leak() {
    assert_eq!(
        run("begin F\nscale S 200 200\npush S\nline 1 1 1 1\nend\ndraw F\nline 1 1 1 1"),
        vec![strip(&[2, 2, 2, 2]), strip(&[1, 1, 1, 1])]
    );
}

#[test]
fn figure_pushes_compose_with_caller() {
    assert_eq!(
        run("scale S 200 200\npush S\nbegin F\ntranslate T 1 0\npush T\nline 0 0 0 0\nend\ndraw F"),
        vec![strip(&[2, 0, 2, 0])]
    );
}

#[test]
fn figure_variables_are_isolated() {
    let err = run_err("set X 5\nbegin F\nline X 0 0 0\nend\ndraw F");
    assert_eq!(err.line, 5);
    assert_eq!(err.operation, "draw F");
    assert_eq!(err.figure_chain(), vec!["F"]);
    assert_eq!(err.root_reason(), &Reason::Value(ValueError::UndefinedVariable("X".into())));
    match &err.reason {
        Reason::InFigure { source, .. } => {
            assert_eq!(source.line, 3);
            assert_eq!(source.operation, "line X 0 0 0");
        }
        other => panic!("expected InFigure, got {other:?}"),
    }
}

#[test]
fn figure_variables_stay_inside() {
    let e = engine("begin F\nset Y 3\nend\ndraw F");
    assert!(e.lookup("Y").is_none());
}

#[test]
fn nested_begin_is_literal() {
    let e = engine("begin A\nbegin B\nend\nend");
    assert!(e.has_figure("A"));
    assert!(!e.has_figure("B"));
    assert_eq!(e.figure("A").map(<[_]>::len), Some(2));
    assert_eq!(e.recording(), None);
}

#[test]
fn nested_figure_known_after_draw() {
    let e = engine("begin A\nbegin B\nline 0 0 1 1\nend\nend\ndraw A\ndraw B");
    assert!(e.has_figure("B"));
    assert_eq!(e.instructions().len(), 1);
}

#[test]
fn redrawing_figure_that_defines_figures() {
    let err = run_err("begin A\nbegin B\nend\nend\ndraw A\ndraw A");
    assert_eq!(err.line, 6);
    assert_eq!(err.root_reason(), &Reason::DuplicateFigure("B".into()));
}

#[test]
fn nested_draw_chain() {
    assert_eq!(
        run("begin In\nline 0 0 1 0\nend\nbegin Out\nscale S 200 200\nuse S\ndraw In\nline 0 0 1 0\nend\ndraw Out"),
        vec![strip(&[0, 0, 2, 0]), strip(&[0, 0, 1, 0])]
    );
}

#[test]
fn duplicate_figure() {
    let err = run_err("begin F\nend\nbegin F\nend");
    assert_eq!(err.reason, Reason::DuplicateFigure("F".into()));
    assert_eq!(err.line, 3);
}

#[test]
fn unknown_figure() {
    assert_eq!(run_err("draw Nope").reason, Reason::UnknownFigure("Nope".into()));
}

#[test]
fn end_without_begin() {
    assert_eq!(run_err("end").reason, Reason::UnmatchedEnd);
}

#[test]
fn unclosed_figure() {
    let err = run_err("line 0 0 1 1\nbegin F\nline 0 0 1 1");
    assert_eq!(err.reason, Reason::UnclosedFigure("F".into()));
    assert_eq!(err.line, 2);
}

#[test]
fn self_drawing_figure() {
    let err = run_err("begin F\ndraw F\nend\ndraw F");
    assert_eq!(err.root_reason(), &Reason::RecursiveFigure("F".into()));
    assert_eq!(err.figure_chain(), vec!["F"]);
}

#[test]
fn mutually_recursive_figures() {
    let err = run_err("begin A\ndraw B\nend\nbegin B\ndraw A\nend\ndraw A");
    assert_eq!(err.root_reason(), &Reason::RecursiveFigure("A".into()));
    assert_eq!(err.figure_chain(), vec!["A", "B"]);
}

// ─── Output ───────────────────────────────────────────────────────────────────

#[test]
fn engine_encode_matches_codec() {
    let e = engine("line 120 300 110 310\nrect 0 0 1 1");
    assert_eq!(e.encode(), autodraw_lang::encode(e.instructions()));
    assert_eq!(&e.encode()[..4], &[0, 1, 0, 4]);
}

#[test]
fn syntax_errors_stop_before_evaluation() {
    match compile("line 1 2 3 4\ncircle 1 2\nset") {
        Err(CompileError::Syntax(errs)) => assert_eq!(errs.len(), 2),
        other => panic!("expected syntax errors, got {other:?}"),
    }
}
