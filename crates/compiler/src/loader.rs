//! Source Loader
//!
//! Resolves import targets to canonical paths and reads stylesheet text.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{CompileError, CompileResult};

/// Where stylesheet sources come from
pub trait SourceLoader {
    /// Canonical path of `target` as imported from the file at `base`.
    /// Relative targets resolve against the directory of `base`.
    fn canonicalize(&self, base: &Path, target: &str) -> CompileResult<PathBuf>;

    /// Read the text of a canonical path
    fn load(&self, path: &Path) -> CompileResult<String>;
}

fn joined(base: &Path, target: &str) -> PathBuf {
    match base.parent() {
        Some(dir) => dir.join(target),
        None => PathBuf::from(target),
    }
}

/// Loader backed by the real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl FsLoader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceLoader for FsLoader {
    fn canonicalize(&self, base: &Path, target: &str) -> CompileResult<PathBuf> {
        let path = joined(base, target);
        fs::canonicalize(&path).map_err(|e| CompileError::io(path, e))
    }

    fn load(&self, path: &Path) -> CompileResult<String> {
        log::debug!("Reading {}", path.display());
        fs::read_to_string(path).map_err(|e| CompileError::io(path, e))
    }
}

/// Loader over an in-memory set of files
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous text at the same path
    pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), source.into());
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SourceLoader for MemoryLoader {
    fn canonicalize(&self, base: &Path, target: &str) -> CompileResult<PathBuf> {
        let path = normalize(&joined(base, target));
        if self.files.contains_key(&path) {
            Ok(path)
        } else {
            Err(not_found(path))
        }
    }

    fn load(&self, path: &Path) -> CompileResult<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| not_found(path.to_path_buf()))
    }
}

fn not_found(path: PathBuf) -> CompileError {
    CompileError::io(path, io::Error::new(io::ErrorKind::NotFound, "no such file"))
}

/// Lexically resolve `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c.css")), PathBuf::from("/a/c.css"));
        assert_eq!(normalize(Path::new("a/../../b.css")), PathBuf::from("../b.css"));
    }

    #[test]
    fn test_memory_loader_resolves_relative_to_importer() {
        let loader = MemoryLoader::new()
            .with_file("/styles/main.css", "")
            .with_file("/styles/base/colors.css", "")
            .with_file("/shared.css", "");

        let main = Path::new("/styles/main.css");
        assert_eq!(
            loader.canonicalize(main, "base/colors.css").unwrap(),
            PathBuf::from("/styles/base/colors.css")
        );
        assert_eq!(
            loader.canonicalize(Path::new("/styles/base/colors.css"), "../../shared.css").unwrap(),
            PathBuf::from("/shared.css")
        );
        assert!(matches!(
            loader.canonicalize(main, "missing.css"),
            Err(CompileError::Io { .. })
        ));
    }

    #[test]
    fn test_fs_loader() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("parts")).unwrap();
        fs::write(dir.path().join("main.css"), ".a { color: red; }").unwrap();
        fs::write(dir.path().join("parts/b.css"), ".b { color: blue; }").unwrap();

        let loader = FsLoader::new();
        let main = loader.canonicalize(Path::new(""), dir.path().join("main.css").to_str().unwrap()).unwrap();
        let part = loader.canonicalize(&main, "./parts/b.css").unwrap();
        assert!(part.ends_with("parts/b.css"));
        assert_eq!(loader.load(&part).unwrap(), ".b { color: blue; }");

        let err = loader.canonicalize(&main, "nope.css").unwrap_err();
        assert!(err.path().unwrap().ends_with("nope.css"));
    }
}
