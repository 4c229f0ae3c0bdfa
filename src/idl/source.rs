//! Where IDL text comes from.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Resolves include paths to canonical keys and reads their contents.
///
/// Keys are opaque to the compiler: it only uses them to detect files it has
/// already seen in the current run.
pub trait SourceLoader {
    /// Resolve `path` as written in an `#include`, relative to the including
    /// file `from` (or as a root file when `from` is `None`).
    fn resolve(&self, path: &str, from: Option<&str>) -> Option<String>;

    fn read(&self, key: &str) -> io::Result<String>;
}

fn parent_of(key: &str) -> Option<&str> {
    key.rsplit_once('/').map(|(dir, _)| dir)
}

/// In-memory sources keyed by path, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl SourceLoader for MemorySource {
    fn resolve(&self, path: &str, from: Option<&str>) -> Option<String> {
        if let Some(dir) = from.and_then(parent_of) {
            let joined = format!("{dir}/{path}");
            if self.files.contains_key(&joined) {
                return Some(joined);
            }
        }
        self.files.contains_key(path).then(|| path.to_string())
    }

    fn read(&self, key: &str) -> io::Result<String> {
        self.files
            .get(key)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, key.to_string()))
    }
}

/// Files on disk. Includes are looked up next to the including file first,
/// then in each include directory in order.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    include_dirs: Vec<PathBuf>,
}

impl FsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_dirs(include_dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            include_dirs: include_dirs.into_iter().collect(),
        }
    }

    fn canonical(path: &Path) -> Option<String> {
        let path = path.canonicalize().ok()?;
        path.is_file().then(|| path.to_string_lossy().into_owned())
    }
}

impl SourceLoader for FsSource {
    fn resolve(&self, path: &str, from: Option<&str>) -> Option<String> {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            return Self::canonical(candidate);
        }
        let mut dirs: Vec<PathBuf> = Vec::new();
        if let Some(dir) = from.and_then(|f| Path::new(f).parent()) {
            dirs.push(dir.to_path_buf());
        } else {
            dirs.push(PathBuf::from("."));
        }
        dirs.extend(self.include_dirs.iter().cloned());
        dirs.iter().find_map(|dir| Self::canonical(&dir.join(candidate)))
    }

    fn read(&self, key: &str) -> io::Result<String> {
        std::fs::read_to_string(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_relative_include() {
        let src = MemorySource::new()
            .with_file("proto/a.tars", "")
            .with_file("proto/b.tars", "")
            .with_file("c.tars", "");
        assert_eq!(
            src.resolve("b.tars", Some("proto/a.tars")),
            Some("proto/b.tars".to_string())
        );
        assert_eq!(
            src.resolve("c.tars", Some("proto/a.tars")),
            Some("c.tars".to_string())
        );
        assert_eq!(src.resolve("missing.tars", None), None);
    }

    #[test]
    fn test_fs_include_dirs() -> std::io::Result<()> {
        let root = tempfile::tempdir()?;
        let shared = root.path().join("shared");
        std::fs::create_dir(&shared)?;
        std::fs::write(shared.join("base.tars"), "module Base {};")?;
        std::fs::write(root.path().join("main.tars"), "#include \"base.tars\"")?;

        let loader = FsSource::with_include_dirs([shared.clone()]);
        let main = root.path().join("main.tars");
        let main_key = loader.resolve(&main.to_string_lossy(), None).unwrap();
        let base_key = loader.resolve("base.tars", Some(&main_key)).unwrap();
        assert!(base_key.ends_with("base.tars"));
        assert_eq!(loader.read(&base_key)?, "module Base {};");
        Ok(())
    }
}
