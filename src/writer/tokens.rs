//! Dump the token stream of a source file as JSON, `<stem>.tokens.json`.
//! Handy for checking what the lexer made of a file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::processor::lexer::Located;

pub fn emit(tokens: &[Located], out_dir: &Path, stem: &str) -> Result<PathBuf> {
    let path = out_dir.join(format!("{stem}.tokens.json"));
    let file = File::create(&path).with_context(|| format!("Creating {}", path.display()))?;

    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, tokens)
        .with_context(|| format!("Writing {}", path.display()))?;
    out.flush()
        .with_context(|| format!("Writing {}", path.display()))?;

    Ok(path)
}
