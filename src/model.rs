use std::path::{Path, PathBuf};

use crate::processor::vm::Instruction;

/// One `.jack` file as read from disk.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    /// File name without extension; names every output for this file.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("out")
    }

    /// Directory outputs go to when no output directory is configured.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Fully compiled class handed to the writers.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledClass {
    pub name: String,
    pub instructions: Vec<Instruction>,
}
