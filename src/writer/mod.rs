//! Output stage: turns compiled classes into files on disk.
pub mod tokens;
pub mod vm;
