use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Stroke};
use eframe::egui::epaint::CubicBezierShape;
use autodraw_lang::{encode, parse, Command, Engine, Instruction};
use autodraw_lang::runtime::value::value_type_name;
use autodraw_lang::types::operation::OpKind;
use autodraw_tikz::{rgba, TikzConfig, TEXT_SCALE_UNIT};
use log::debug;

fn mono_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).monospace().color(Color32::from_rgb(140, 140, 140)));
        ui.label(RichText::new(value).monospace().color(Color32::from_rgb(210, 210, 170)));
    });
}

fn main() -> eframe::Result {
    env_logger::init();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Autodraw", options, Box::new(|_cc| Ok(Box::new(App::default()))))
}

// ─── App state ────────────────────────────────────────────────────────────────

#[derive(PartialEq)]
enum Tab { Errors, Operations, Instructions, Bytes, Tikz, Canvas }

struct App {
    source: String,
    result: RunResult,
    tab: Tab,
}

impl Default for App {
    fn default() -> Self {
        let source = String::from(
"# write autodraw code here
scale Half 50 50
translate Right 250 0

begin Window
rect 20 20 80 80
oval 50 50 20 20
end

rect 0 0 200 150
polygon 0 150 100 250 200 150
draw Window
use Right
draw Window
text 20 -30 256 \"house\"
node 100 300 3855 1 \"roof\"
");
        let result = run(&source);
        Self { source, result, tab: Tab::Canvas }
    }
}

// ─── Run result ───────────────────────────────────────────────────────────────

struct VarRow {
    name: String,
    ty: &'static str,
    value: String,
}

#[derive(Default)]
struct RunResult {
    errors: Vec<String>,
    operations: Vec<(OpKind, String)>,
    figures: Vec<(String, usize)>,
    variables: Vec<VarRow>,
    /// Everything emitted before the first failure.
    instructions: Vec<Instruction>,
    bytes: Vec<u8>,
    tikz: String,
}

impl RunResult {
    fn has_errors(&self) -> bool { !self.errors.is_empty() }
}

fn run(source: &str) -> RunResult {
    let mut result = RunResult::default();

    // ── Parse ─────────────────────────────────────────────────────────────────
    let ops = match parse(source) {
        Ok(ops) => ops,
        Err(errs) => {
            result.errors = errs.iter().map(|e| format!("[syntax] {e}")).collect();
            return result;
        }
    };
    result.operations = ops.iter()
        .map(|op| (op.command.kind(), format!("{:>4}  {op}", op.line)))
        .collect();

    // ── Evaluate ──────────────────────────────────────────────────────────────
    let mut engine = Engine::new();
    if let Err(e) = engine.run(&ops) {
        result.errors.push(format!("[runtime] {e}"));
    } else if let Some(open) = engine.recording() {
        result.errors.push(format!("[runtime] figure `{open}` is missing its `end`"));
    }

    result.figures = engine.figure_names().into_iter()
        .map(|name| (name.to_string(), engine.figure(name).map_or(0, <[_]>::len)))
        .collect();
    result.variables = engine.vars().iter_sorted().into_iter()
        .map(|(name, v)| VarRow { name: name.to_string(), ty: value_type_name(v), value: v.to_string() })
        .collect();

    result.instructions = engine.instructions().to_vec();
    debug!("{} operations, {} instructions", ops.len(), result.instructions.len());
    result.bytes = encode(&result.instructions);
    match autodraw_tikz::render(&result.instructions, &TikzConfig::default()) {
        Ok(t) => result.tikz = t,
        Err(e) => result.errors.push(format!("[tikz] {e}")),
    }
    result
}

/// Offset, 16 bytes in hex, then the big-endian words.
fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        let words: Vec<String> = chunk.chunks(2)
            .map(|w| match w {
                [hi, lo] => i16::from_be_bytes([*hi, *lo]).to_string(),
                _ => "..".into(),
            })
            .collect();
        out.push_str(&format!("{:06x}  {:<47}  {}\n", row * 16, hex.join(" "), words.join(" ")));
    }
    out
}

// ─── UI ───────────────────────────────────────────────────────────────────────

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                // ── Left: editor ──────────────────────────────────────────────
                cols[0].vertical(|ui| {
                    ui.label("Source");
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.source)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(44),
                    );
                    if response.changed() {
                        self.result = run(&self.source);
                    }
                });

                // ── Right: output ─────────────────────────────────────────────
                cols[1].vertical(|ui| {
                    // ── Status bar ────────────────────────────────────────────
                    ui.horizontal(|ui| {
                        let error_count = self.result.errors.len();
                        if error_count == 0 {
                            ui.label(RichText::new("✓  no errors").color(Color32::from_rgb(80, 200, 80)));
                        } else {
                            ui.label(RichText::new(format!("✗  {error_count} error(s)")).color(Color32::from_rgb(220, 80, 80)));
                        }
                        ui.label(RichText::new(format!(
                            "{} instructions, {} bytes",
                            self.result.instructions.len(), self.result.bytes.len()
                        )).color(Color32::GRAY));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("run").clicked() {
                                self.result = run(&self.source);
                            }
                        });
                    });

                    ui.separator();

                    // ── Tab bar ───────────────────────────────────────────────
                    ui.horizontal(|ui| {
                        let err_label = if self.result.errors.is_empty() {
                            "Errors".into()
                        } else {
                            format!("Errors ({})", self.result.errors.len())
                        };
                        ui.selectable_value(&mut self.tab, Tab::Errors, err_label);
                        ui.selectable_value(&mut self.tab, Tab::Operations, "Operations");
                        ui.selectable_value(&mut self.tab, Tab::Instructions, "Instructions");
                        ui.selectable_value(&mut self.tab, Tab::Bytes, "Bytes");
                        ui.selectable_value(&mut self.tab, Tab::Tikz, "TikZ");
                        ui.selectable_value(&mut self.tab, Tab::Canvas, "Canvas");
                    });

                    ui.separator();

                    // ── Tab content ───────────────────────────────────────────
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        match self.tab {
                            Tab::Errors       => self.show_errors(ui),
                            Tab::Operations   => self.show_operations(ui),
                            Tab::Instructions => self.show_instructions(ui),
                            Tab::Bytes        => show_text(ui, &hex_dump(&self.result.bytes), "No bytes."),
                            Tab::Tikz         => show_text(ui, &self.result.tikz, "No TikZ (fix errors)."),
                            Tab::Canvas       => self.show_canvas(ui),
                        }
                    });
                });
            });
        });
    }
}

fn show_text(ui: &mut egui::Ui, text: &str, empty: &str) {
    if text.is_empty() {
        ui.label(RichText::new(empty).color(Color32::GRAY));
        return;
    }
    ui.add(
        egui::TextEdit::multiline(&mut text.to_string())
            .font(egui::TextStyle::Monospace)
            .desired_width(f32::INFINITY)
            .interactive(false),
    );
}

impl App {
    fn show_errors(&self, ui: &mut egui::Ui) {
        if self.result.errors.is_empty() {
            ui.label(RichText::new("No errors.").color(Color32::GRAY));
            return;
        }
        for msg in &self.result.errors {
            ui.label(RichText::new(msg).monospace().color(Color32::from_rgb(220, 80, 80)));
        }
    }

    fn show_operations(&self, ui: &mut egui::Ui) {
        if self.result.operations.is_empty() {
            ui.label(RichText::new("No operations.").color(Color32::GRAY));
            return;
        }
        for (kind, line) in &self.result.operations {
            let color = match kind {
                OpKind::Drawing    => Color32::from_rgb(200, 180, 255),
                OpKind::Assignment => Color32::from_rgb(180, 255, 180),
                OpKind::Stack      => Color32::from_rgb(100, 180, 255),
                OpKind::Figure     => Color32::from_rgb(255, 200, 80),
                OpKind::NoOp       => Color32::GRAY,
            };
            ui.label(RichText::new(line).monospace().color(color));
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Figures").strong());
        for (name, len) in &self.result.figures {
            mono_row(ui, &format!("  {name}:"), &format!("{len} operations"));
        }

        ui.add_space(8.0);
        ui.label(RichText::new("Variables").strong());
        egui::Grid::new("vars_grid")
            .striped(true)
            .min_col_width(80.0)
            .show(ui, |ui| {
                ui.label(RichText::new("name").strong());
                ui.label(RichText::new("type").strong());
                ui.label(RichText::new("value").strong());
                ui.end_row();

                for row in &self.result.variables {
                    ui.label(RichText::new(&row.name).monospace());
                    let color = match row.ty {
                        "number"    => Color32::from_rgb(180, 255, 180),
                        "transform" => Color32::from_rgb(100, 180, 255),
                        _           => Color32::from_rgb(255, 200, 80),
                    };
                    ui.label(RichText::new(row.ty).monospace().color(color));
                    ui.label(RichText::new(&row.value).monospace().color(Color32::from_rgb(200, 200, 200)));
                    ui.end_row();
                }
            });
    }

    fn show_instructions(&self, ui: &mut egui::Ui) {
        if self.result.instructions.is_empty() {
            let msg = if self.result.has_errors() { "Fix errors to run." } else { "No instructions." };
            ui.label(RichText::new(msg).color(Color32::GRAY));
            return;
        }
        for (i, inst) in self.result.instructions.iter().enumerate() {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("[{}]", i + 1)).monospace().color(Color32::GRAY));
                ui.label(RichText::new(inst.command().name()).monospace().color(Color32::from_rgb(180, 140, 255)));
                ui.label(RichText::new(format!("code {}", inst.command().code())).monospace().color(Color32::GRAY));
            });
            let pts: Vec<String> = inst.points().iter().map(|(x, y)| format!("({x}, {y})")).collect();
            mono_row(ui, "  pts: ", &pts.join(" "));
            if let Some(text) = inst.text_content() {
                mono_row(ui, "  head:", &format!("{:?}", inst.header()));
                mono_row(ui, "  text:", &format!("{text:?}"));
            }
            ui.add_space(6.0);
        }
    }

    fn show_canvas(&self, ui: &mut egui::Ui) {
        if self.result.instructions.is_empty() {
            let msg = if self.result.has_errors() { "Fix errors to run." } else { "Nothing drawn." };
            ui.label(RichText::new(msg).color(Color32::GRAY));
            return;
        }

        let desired = egui::vec2(ui.available_width(), 520.0);
        let (canvas_rect, _response) = ui.allocate_exact_size(desired, egui::Sense::hover());
        let painter = ui.painter_at(canvas_rect);
        painter.rect_filled(canvas_rect, 0.0, Color32::from_rgb(28, 28, 32));

        let view = Fit::new(&self.result.instructions, canvas_rect);
        let stroke = Stroke::new(1.5, Color32::from_rgb(200, 180, 255));
        let ink = Color32::from_rgb(230, 230, 230);

        for inst in &self.result.instructions {
            let pts: Vec<Pos2> = inst.points().iter().map(|&(x, y)| view.map(x, y)).collect();
            match inst.command() {
                Command::LineStrip => {
                    painter.add(egui::Shape::line(pts, stroke));
                }
                Command::Curve => {
                    for arc in pts.windows(4).step_by(3) {
                        painter.add(CubicBezierShape::from_points_stroke(
                            [arc[0], arc[1], arc[2], arc[3]],
                            false,
                            Color32::TRANSPARENT,
                            stroke,
                        ));
                    }
                }
                Command::Text => {
                    let size = 14.0 * f32::from(inst.header()[2]) / TEXT_SCALE_UNIT as f32;
                    let text = inst.text_content().unwrap_or_default();
                    painter.text(pts[0], Align2::LEFT_BOTTOM, text, FontId::proportional(size.max(4.0)), ink);
                }
                Command::Node => {
                    let [r, g, b, a] = rgba(inst.header()[2]);
                    let fill = Color32::from_rgba_unmultiplied(r, g, b, a);
                    let text = inst.text_content().unwrap_or_default();
                    let galley = painter.layout_no_wrap(text, FontId::monospace(13.0), Color32::BLACK);
                    let rect = Align2::CENTER_CENTER.anchor_size(pts[0], galley.size()).expand(4.0);
                    painter.rect_filled(rect, 2.0, fill);
                    painter.rect_stroke(rect, 2.0, stroke, egui::StrokeKind::Outside);
                    painter.galley(rect.min + egui::vec2(4.0, 4.0), galley, Color32::BLACK);
                }
            }
        }
    }
}

// ─── Canvas mapping ───────────────────────────────────────────────────────────

/// Maps centiunits (y up) onto a screen rect, fitting every point.
struct Fit {
    min: (f32, f32),
    k: f32,
    origin: Pos2,
}

impl Fit {
    const PAD: f32 = 24.0;

    fn new(instructions: &[Instruction], rect: egui::Rect) -> Self {
        let mut lo = (f32::INFINITY, f32::INFINITY);
        let mut hi = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for (x, y) in instructions.iter().flat_map(|i| i.points()) {
            let (x, y) = (f32::from(x), f32::from(y));
            lo = (lo.0.min(x), lo.1.min(y));
            hi = (hi.0.max(x), hi.1.max(y));
        }
        if !lo.0.is_finite() {
            lo = (0.0, 0.0);
            hi = (1.0, 1.0);
        }
        let span_x = (hi.0 - lo.0).max(1.0);
        let span_y = (hi.1 - lo.1).max(1.0);
        let k = ((rect.width() - 2.0 * Self::PAD) / span_x)
            .min((rect.height() - 2.0 * Self::PAD) / span_y)
            .max(0.01);
        let origin = egui::pos2(rect.left() + Self::PAD, rect.bottom() - Self::PAD);
        Self { min: lo, k, origin }
    }

    fn map(&self, x: i16, y: i16) -> Pos2 {
        egui::pos2(
            self.origin.x + (f32::from(x) - self.min.0) * self.k,
            self.origin.y - (f32::from(y) - self.min.1) * self.k,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_source_compiles() {
        let app = App::default();
        assert!(!app.result.has_errors(), "{:?}", app.result.errors);
        assert_eq!(app.result.instructions.len(), 8);
        assert_eq!(app.result.figures, vec![("Window".to_string(), 2)]);
        assert!(app.result.tikz.starts_with("\\begin{tikzpicture}"));
    }

    #[test]
    fn partial_output_kept_on_error() {
        let result = run("line 0 0 1 1\npop\nline 2 2 3 3");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("[runtime]"));
        assert_eq!(result.instructions.len(), 1);
    }

    #[test]
    fn syntax_errors_listed() {
        let result = run("circle 1\nset");
        assert_eq!(result.errors.len(), 2);
        assert!(result.operations.is_empty());
    }

    #[test]
    fn hex_rows() {
        let dump = hex_dump(&[0, 1, 0, 4, 0, 120, 1, 44, 0, 110, 1, 54]);
        assert_eq!(
            dump,
            format!("000000  {:<47}  1 4 120 300 110 310\n", "00 01 00 04 00 78 01 2c 00 6e 01 36")
        );
    }

    #[test]
    fn fit_is_y_up() {
        let line = Instruction::new(Command::LineStrip, vec![0, 0, 100, 100]).unwrap();
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(148.0, 148.0));
        let fit = Fit::new(&[line], rect);
        assert_eq!(fit.map(0, 0), egui::pos2(24.0, 124.0));
        assert_eq!(fit.map(100, 100), egui::pos2(124.0, 24.0));
    }

    #[test]
    fn operations_carry_kind() {
        let result = run("set A 1\nline 0 0 1 1\npop");
        let kinds: Vec<OpKind> = result.operations.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![OpKind::Assignment, OpKind::Drawing, OpKind::Stack]);
        assert_eq!(result.operations[1].1, "   2  line 0 0 1 1");
    }
}
