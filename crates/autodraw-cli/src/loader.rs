//! Source loading with `import` resolution.
//!
//! `import NAME` splices the operations of `NAME.ad`, found next to the
//! importing file, in front of the import line. A file is loaded once; an
//! import that would re-enter a file already on the import chain is skipped.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use autodraw_lang::{OpCode, Operation};
use log::{debug, warn};

use crate::error::CliError;

pub const SOURCE_EXT: &str = "ad";

#[derive(Default)]
pub struct Loader {
    loaded: HashSet<PathBuf>,
    chain: Vec<PathBuf>,
}

impl Loader {
    pub fn new() -> Self { Self::default() }

    /// Operations of `path` with every import expanded.
    pub fn load(&mut self, path: &Path) -> Result<Vec<Operation>, CliError> {
        let mut out = Vec::new();
        self.load_into(path, &mut out)?;
        Ok(out)
    }

    /// Operations of an unnamed source, such as stdin. Imports resolve
    /// against `base_dir`.
    pub fn load_source(&mut self, source: &str, base_dir: &Path) -> Result<Vec<Operation>, CliError> {
        let ops = autodraw_lang::parse(source)
            .map_err(|errors| CliError::Syntax { path: PathBuf::from("-"), errors })?;
        let mut out = Vec::new();
        self.splice(ops, base_dir, &mut out)?;
        Ok(out)
    }

    fn load_into(&mut self, path: &Path, out: &mut Vec<Operation>) -> Result<(), CliError> {
        let key = fs::canonicalize(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
        if self.chain.contains(&key) {
            warn!("import cycle through `{}` skipped", path.display());
            return Ok(());
        }
        if !self.loaded.insert(key.clone()) {
            debug!("`{}` already loaded", path.display());
            return Ok(());
        }

        let source = fs::read_to_string(path)
            .map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
        let ops = autodraw_lang::parse(&source)
            .map_err(|errors| CliError::Syntax { path: path.to_path_buf(), errors })?;
        debug!("loaded `{}`: {} operations", path.display(), ops.len());

        self.chain.push(key);
        let spliced = self.splice(ops, path.parent().unwrap_or(Path::new(".")), out);
        self.chain.pop();
        spliced
    }

    /// Appends `ops`, placing each import's operations before the import.
    fn splice(&mut self, ops: Vec<Operation>, dir: &Path, out: &mut Vec<Operation>) -> Result<(), CliError> {
        for op in ops {
            if op.command == OpCode::Import {
                if let Some(name) = &op.name {
                    let child = dir.join(format!("{name}.{SOURCE_EXT}"));
                    self.load_into(&child, out)?;
                }
            }
            out.push(op);
        }
        Ok(())
    }
}
