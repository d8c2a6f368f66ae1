pub mod cli;
pub mod error;
pub mod loader;
pub mod model;
pub mod processor;
pub mod writer;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use log::{error, info};

pub use error::{CompileError, LexErrorKind, SymbolError};
pub use processor::compile_source;

/// Compiles every file named by `args.input`.
///
/// Files are independent: one failing does not stop the others. The error
/// returned at the end only says how many failed; each failure has already
/// been logged with its cause.
pub fn run(args: &cli::Cli) -> anyhow::Result<()> {
    // 1. ── Discover ───────────────────────────────────────────────────
    let files = loader::discover(&args.input)
        .with_context(|| format!("Finding sources in {}", args.input.display()))?;

    if let Some(out_dir) = &args.out_dir {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Creating {}", out_dir.display()))?;
    }

    // 2. ── Compile + write, one file at a time ────────────────────────
    let mut failed = 0;
    for path in &files {
        match compile_path(path, args) {
            Ok(out) => info!("wrote {}", out.display()),
            Err(e) => {
                error!("{e:#}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!(
            "{} of {} files failed to compile",
            failed,
            files.len()
        ));
    }
    Ok(())
}

/// Loads, compiles and writes one file, returning the `.vm` path.
pub fn compile_path(path: &Path, args: &cli::Cli) -> anyhow::Result<PathBuf> {
    let file = loader::load(path)?;
    let out_dir = args.out_dir.as_deref().unwrap_or_else(|| file.dir());

    // nothing is written for a file that does not compile
    let compiled = processor::compile_file(&file)
        .with_context(|| format!("Compiling {}", path.display()))?;

    if args.tokens {
        let tokens = processor::tokenize(&file.text)
            .with_context(|| format!("Tokenizing {}", path.display()))?;
        writer::tokens::emit(&tokens, out_dir, file.stem())?;
    }

    let written = writer::vm::emit(&compiled, out_dir, file.stem())
        .with_context(|| format!("Writing {}.vm", file.stem()))?;
    Ok(written)
}
