//! File loading collaborators.
//!
//! Package discovery never touches the filesystem directly; it goes through
//! a [`Loader`]. [`OsLoader`] is the real implementation, and
//! [`MemoryLoader`] serves an in-memory file table for tests and embedding.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;

use crate::path;

/// Supplies `.pc` file contents and directory listings.
pub trait Loader: fmt::Debug {
    /// Load the file at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist, and an error when it
    /// exists but cannot be read.
    fn load(&self, path: &str) -> io::Result<Option<String>>;

    /// List the `.pc` file names (not paths) inside `dir`, sorted.
    ///
    /// Unreadable or missing directories yield an empty list.
    fn list(&self, dir: &str) -> Vec<String>;
}

/// Loads files from the host filesystem.
///
/// Contents are decoded as UTF-8, replacing invalid sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLoader;

impl Loader for OsLoader {
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn list(&self, dir: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| path::is_pc_path(name))
            .collect();
        names.sort();
        names
    }
}

/// An in-memory file table keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: BTreeMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder-style variant of [`MemoryLoader::insert`].
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Loader for MemoryLoader {
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }

    fn list(&self, dir: &str) -> Vec<String> {
        let dir = dir.trim_end_matches(path::is_separator);
        self.files
            .keys()
            .filter(|p| path::dirname(p) == dir)
            .map(|p| path::basename(p))
            .filter(|name| path::is_pc_path(name))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_loader_load() {
        let loader = MemoryLoader::new().with_file("/a/b.pc", "Name: b\n");
        assert_eq!(loader.load("/a/b.pc").unwrap().as_deref(), Some("Name: b\n"));
        assert!(loader.load("/a/c.pc").unwrap().is_none());
    }

    #[test]
    fn memory_loader_list() {
        let loader = MemoryLoader::new()
            .with_file("/a/zeta.pc", "")
            .with_file("/a/alpha.pc", "")
            .with_file("/a/readme.txt", "")
            .with_file("/a/sub/nested.pc", "");
        assert_eq!(loader.list("/a"), vec!["alpha.pc", "zeta.pc"]);
        assert_eq!(loader.list("/a/"), vec!["alpha.pc", "zeta.pc"]);
        assert_eq!(loader.list("/a/sub"), vec!["nested.pc"]);
        assert!(loader.list("/missing").is_empty());
    }

    #[test]
    fn os_loader_reads_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("foo.pc"), "Name: foo\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("dir.pc")).unwrap();

        let base = dir.path().to_str().unwrap();
        let loader = OsLoader;
        let foo = format!("{base}/foo.pc");
        assert_eq!(loader.load(&foo).unwrap().as_deref(), Some("Name: foo\n"));
        assert!(loader.load(&format!("{base}/bar.pc")).unwrap().is_none());
        assert_eq!(loader.list(base), vec!["foo.pc"]);
    }

    #[test]
    fn os_loader_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bin.pc");
        std::fs::write(&file, b"Name: \xff\n").unwrap();
        let contents = OsLoader.load(file.to_str().unwrap()).unwrap().unwrap();
        assert_eq!(contents, "Name: \u{fffd}\n");
    }

    #[test]
    fn os_loader_missing_directory_lists_nothing() {
        assert!(OsLoader.list("/nonexistent/pcmeta/dir").is_empty());
    }
}
