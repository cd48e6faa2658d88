//! # autodraw
//!
//! Compiles drawing sources to the instruction byte stream and renders
//! streams as TikZ.
//!
//! ## Usage
//!
//! ```bash
//! # Source to bytes
//! autodraw compile house.ad -o house.bin
//!
//! # Source straight to TikZ, with operation tracing
//! autodraw -v compile house.ad --emit tikz
//!
//! # Bytes back to a readable listing
//! autodraw decode house.bin --emit listing
//! ```

mod error;
mod loader;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use autodraw_lang::{decode, encode, evaluate, EngineConfig, Instruction};
use autodraw_tikz::{render, TikzConfig};

use crate::error::CliError;
use crate::loader::Loader;

/// autodraw - drawing language compiler
#[derive(Parser, Debug)]
#[command(name = "autodraw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every evaluated operation and emitted instruction
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a source file
    Compile {
        /// Source file (`-` for stdin; imports then resolve from the working directory)
        input: PathBuf,

        /// Output file (`-` or omitted for stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// What to write
        #[arg(long, value_enum, default_value_t = CompileEmit::Bytes)]
        emit: CompileEmit,

        /// Deepest allowed chain of nested `draw`s
        #[arg(long, default_value_t = EngineConfig::default().max_draw_depth)]
        max_draw_depth: usize,

        /// Coordinate multiplier for TikZ output
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
    },

    /// Decode an instruction byte stream
    Decode {
        /// Byte stream (`-` for stdin)
        input: PathBuf,

        /// Output file (`-` or omitted for stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// What to write
        #[arg(long, value_enum, default_value_t = DecodeEmit::Tikz)]
        emit: DecodeEmit,

        /// Coordinate multiplier for TikZ output
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CompileEmit {
    /// Binary instruction stream
    Bytes,
    /// TikZ picture
    Tikz,
    /// One instruction per line
    Listing,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DecodeEmit {
    Tikz,
    Listing,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile { input, output, emit, max_draw_depth, scale } => {
            let ops = if is_std(&input) {
                let source = String::from_utf8_lossy(&read_input(&input)?).into_owned();
                Loader::new().load_source(&source, Path::new("."))?
            } else {
                Loader::new().load(&input)?
            };
            info!("{}: {} operations", input.display(), ops.len());

            let instructions = evaluate(&ops, EngineConfig { max_draw_depth })?;
            info!("{} instructions", instructions.len());

            let bytes = match emit {
                CompileEmit::Bytes   => encode(&instructions),
                CompileEmit::Tikz    => render(&instructions, &TikzConfig { scale })?.into_bytes(),
                CompileEmit::Listing => listing(&instructions).into_bytes(),
            };
            write_output(output.as_deref(), &bytes)
        }

        Commands::Decode { input, output, emit, scale } => {
            let instructions = decode(&read_input(&input)?)?;
            info!("{}: {} instructions", input.display(), instructions.len());

            let text = match emit {
                DecodeEmit::Tikz    => render(&instructions, &TikzConfig { scale })?,
                DecodeEmit::Listing => listing(&instructions),
            };
            write_output(output.as_deref(), text.as_bytes())
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn listing(instructions: &[Instruction]) -> String {
    instructions.iter().map(|i| format!("{i}\n")).collect()
}

// ─── I/O ──────────────────────────────────────────────────────────────────────

fn is_std(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<Vec<u8>, CliError> {
    let read_err = |source| CliError::Read { path: path.to_path_buf(), source };
    if is_std(path) {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).map_err(read_err)?;
        Ok(buf)
    } else {
        fs::read(path).map_err(read_err)
    }
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<(), CliError> {
    match path {
        Some(p) if !is_std(p) => {
            fs::write(p, bytes).map_err(|source| CliError::Write { path: p.to_path_buf(), source })
        }
        _ => {
            let mut out = io::stdout().lock();
            out.write_all(bytes)
                .and_then(|()| out.flush())
                .map_err(|source| CliError::Write { path: PathBuf::from("-"), source })
        }
    }
}
