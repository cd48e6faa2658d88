use std::io;
use std::path::{Path, PathBuf};

use autodraw_lang::{CodecError, Error as SyntaxError, RuntimeError};
use autodraw_tikz::TikzError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read `{}`: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write `{}`: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("{}", syntax_report(.path, .errors))]
    Syntax { path: PathBuf, errors: Vec<SyntaxError> },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Tikz(#[from] TikzError),
}

/// One diagnostic per line, each prefixed with the file.
fn syntax_report(path: &Path, errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {e}", path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}
