//! Write a compiled class as VM text, `<stem>.vm`.
//!
//! The text goes to a temporary file in the output directory that is renamed
//! over `<stem>.vm` once complete, so a failed write never leaves a
//! truncated file behind.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::CompiledClass;
use crate::processor::vm::VmWriter;

pub const VM_EXTENSION: &str = "vm";

pub fn emit(class: &CompiledClass, out_dir: &Path, stem: &str) -> io::Result<PathBuf> {
    let path = out_dir.join(format!("{stem}.{VM_EXTENSION}"));
    let mut tmp = NamedTempFile::new_in(out_dir)?;

    let mut writer = VmWriter::new(BufWriter::new(&mut tmp));
    writer.write_all(&class.instructions)?;
    drop(writer);

    tmp.persist(&path).map_err(|e| e.error)?;
    Ok(path)
}
