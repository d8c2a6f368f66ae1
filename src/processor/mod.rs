//! The functional core: source text in, VM instructions out.
//!
//! One call compiles one class. All state (symbol table, label counter,
//! token cursor) lives inside the `CompilationEngine` built for that call,
//! so independent files never share anything.
pub mod compiler;
pub mod lexer;
pub mod scanner;
pub mod symbol_table;
pub mod vm;

use log::info;

use crate::error::CompileError;
use crate::model::{CompiledClass, SourceFile};

use self::compiler::CompilationEngine;
use self::lexer::{Lexer, Located};
use self::vm::Instruction;

/// Compiles a single class held in `source`.
pub fn compile_source(source: &str) -> Result<CompiledClass, CompileError> {
    let mut engine = CompilationEngine::new(source, Vec::<Instruction>::new());
    engine.compile_class()?;
    let name = engine.class_name().to_string();

    Ok(CompiledClass {
        name,
        instructions: engine.into_output(),
    })
}

/// Compiles one loaded file. Nothing is produced for a file that fails.
pub fn compile_file(file: &SourceFile) -> Result<CompiledClass, CompileError> {
    info!("compiling {}", file.path.display());
    let compiled = compile_source(&file.text)?;
    info!(
        "{}: class {} -> {} instructions",
        file.path.display(),
        compiled.name,
        compiled.instructions.len()
    );
    Ok(compiled)
}

/// Full token stream of `source`, stopping at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Located>, CompileError> {
    Lexer::new(source).collect()
}
