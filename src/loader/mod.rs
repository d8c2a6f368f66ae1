use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use walkdir::WalkDir;

use crate::model::SourceFile;

pub const SOURCE_EXTENSION: &str = "jack";

/// Finds the source files named by `input`.
///
/// `input` is either a single `.jack` file or a directory, in which case
/// every `.jack` file directly inside it is returned, sorted by file name.
pub fn discover(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        if !is_source(input) {
            return Err(anyhow!(
                "{} is not a .{} file",
                input.display(),
                SOURCE_EXTENSION
            ));
        }
        return Ok(vec![input.to_path_buf()]);
    }

    if !input.is_dir() {
        return Err(anyhow!("{} does not exist", input.display()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Listing {}", input.display()))?;
        if entry.file_type().is_file() && is_source(entry.path()) {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        warn!("no .{} files found in {}", SOURCE_EXTENSION, input.display());
    } else {
        info!("found {} source files in {}", files.len(), input.display());
    }
    Ok(files)
}

/// Reads one source file into memory.
pub fn load(path: &Path) -> Result<SourceFile> {
    let text = fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    Ok(SourceFile {
        path: path.to_path_buf(),
        text,
    })
}

fn is_source(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Square.jack", "Main.jack", "notes.txt", "Game.jack.bak"] {
            fs::write(dir.path().join(name), "class X {}").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("Inner.jack"), "").unwrap();

        let files = discover(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Main.jack", "Square.jack"]);
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Main.jack");
        fs::write(&path, "class Main {}").unwrap();

        assert_eq!(discover(&path).unwrap(), vec![path.clone()]);

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.text, "class Main {}");
    }

    #[test]
    fn test_discover_errors() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("readme.txt");
        fs::write(&txt, "").unwrap();

        assert!(discover(&txt).is_err());
        assert!(discover(&dir.path().join("missing")).is_err());
        assert!(load(&dir.path().join("Missing.jack")).is_err());
    }
}
