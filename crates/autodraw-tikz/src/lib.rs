//! TikZ backend: instructions to a `tikzpicture`.

use autodraw_lang::{decode, CodecError, Command, Instruction};
use log::debug;
use thiserror::Error;

/// Text scale is stored in 1/256 steps, so `256` is natural size.
pub const TEXT_SCALE_UNIT: f64 = 256.0;

#[derive(Debug, Clone)]
pub struct TikzConfig {
    /// Multiplier applied to every coordinate after centiunit conversion.
    pub scale: f64,
}

impl Default for TikzConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TikzError {
    #[error(transparent)]
    Decode(#[from] CodecError),
    #[error("scale must be finite and positive, got {0}")]
    InvalidScale(f64),
}

/// Accumulates instructions and emits the picture on `finish`.
pub struct Tikz {
    scale: f64,
    body: String,
}

impl Tikz {
    pub fn new(config: &TikzConfig) -> Result<Self, TikzError> {
        if !config.scale.is_finite() || config.scale <= 0.0 {
            return Err(TikzError::InvalidScale(config.scale));
        }
        Ok(Self { scale: config.scale, body: String::new() })
    }

    pub fn update(&mut self, inst: &Instruction) {
        let line = instruction_to_tikz(inst, self.scale);
        debug!("tikz: {inst} -> {line}");
        self.body.push_str("  ");
        self.body.push_str(&line);
        self.body.push('\n');
    }

    pub fn finish(self) -> String {
        format!("\\begin{{tikzpicture}}\n{}\\end{{tikzpicture}}\n", self.body)
    }
}

pub fn render(instructions: &[Instruction], config: &TikzConfig) -> Result<String, TikzError> {
    let mut tikz = Tikz::new(config)?;
    for inst in instructions {
        tikz.update(inst);
    }
    Ok(tikz.finish())
}

/// Decode a byte stream and render it. Nothing is rendered from a malformed
/// stream.
pub fn render_bytes(bytes: &[u8], config: &TikzConfig) -> Result<String, TikzError> {
    render(&decode(bytes)?, config)
}

/// One TikZ statement for `inst`.
pub fn instruction_to_tikz(inst: &Instruction, scale: f64) -> String {
    let pts: Vec<String> = inst.points().iter().map(|&(x, y)| point(x, y, scale)).collect();
    match inst.command() {
        Command::LineStrip if inst.is_closed() => {
            // Polygon form repeats its first point; `cycle` closes it instead.
            format!("\\draw {} -- cycle;", pts[..pts.len() - 1].join(" -- "))
        }
        Command::LineStrip => format!("\\draw {};", pts.join(" -- ")),
        Command::Curve => {
            let mut s = format!("\\draw {}", pts[0]);
            for arc in pts[1..].chunks_exact(3) {
                s.push_str(&format!(" .. controls {} and {} .. {}", arc[0], arc[1], arc[2]));
            }
            s.push(';');
            s
        }
        Command::Text => {
            let text = escape(&inst.text_content().unwrap_or_default());
            let size = num(f64::from(inst.header()[2]) / TEXT_SCALE_UNIT);
            format!("\\node[scale={size}] at {} {{{text}}};", pts[0])
        }
        Command::Node => {
            let h = inst.header();
            let text = escape(&inst.text_content().unwrap_or_default());
            let [r, g, b, a] = rgba(h[2]);
            let mut opts = format!("draw, fill={{rgb,255:red,{r};green,{g};blue,{b}}}");
            if a < 255 {
                opts.push_str(&format!(", fill opacity={}", num(f64::from(a) / 255.0)));
            }
            format!("\\node[{opts}] (n{}) at {} {{{text}}};", h[3], pts[0])
        }
    }
}

/// `0xRGBA` nibbles widened to 8-bit channels.
pub fn rgba(color: i16) -> [u8; 4] {
    let c = color as u16;
    let nib = |shift: u16| ((c >> shift) & 0xF) as u8 * 17;
    [nib(12), nib(8), nib(4), nib(0)]
}

fn point(x: i16, y: i16, scale: f64) -> String {
    format!("({},{})", coord(x, scale), coord(y, scale))
}

fn coord(v: i16, scale: f64) -> String {
    num(f64::from(v) * scale / 100.0)
}

/// Shortest decimal form, at most four places, never `-0`.
fn num(v: f64) -> String {
    let r = (v * 10_000.0).round() / 10_000.0;
    if r == 0.0 { "0".into() } else { format!("{r}") }
}

/// Escapes TeX special characters for use inside a node.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '~'  => out.push_str("\\textasciitilde{}"),
            '^'  => out.push_str("\\textasciicircum{}"),
            '{' | '}' | '$' | '&' | '#' | '%' | '_' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out
}
