//! Corpus sources: the ordered set of files a scan runs over.
//!
//! The scanner iterates the corpus once per phase and loads each file's
//! source on demand, so a source must be re-iterable and return files in
//! a stable order.

use ignore::WalkBuilder;
use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};

/// An ordered supply of (file identifier, raw source) pairs.
pub trait Corpus {
    /// File identifiers in scan order.
    fn paths(&self) -> &[PathBuf];

    /// Loads one file's source. I/O failures are treated like parse
    /// failures by the scanner (skip or abort, per policy).
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Corpus discovered on disk. Walking respects `.gitignore` files, skips
/// the configured directory names, and keeps only files with one of the
/// wanted extensions. Paths are sorted for deterministic scan order.
#[derive(Debug)]
pub struct DiskCorpus {
    paths: Vec<PathBuf>,
}

impl DiskCorpus {
    /// Walks the given roots. Explicit file roots are taken as-is.
    #[must_use]
    pub fn collect(roots: &[PathBuf], extensions: &[String], skip: &[String]) -> Self {
        let mut paths = Vec::new();
        for root in roots {
            if root.is_file() {
                paths.push(root.clone());
                continue;
            }
            let skip = skip.to_vec();
            let walker = WalkBuilder::new(root)
                .filter_entry(move |entry| {
                    let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                    if !is_dir {
                        return true;
                    }
                    let name = entry.file_name().to_string_lossy();
                    !skip.iter().any(|skipped| skipped == name.as_ref())
                })
                .build();
            for entry in walker.flatten() {
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let path = entry.into_path();
                let matches = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext));
                if matches {
                    paths.push(path);
                }
            }
        }
        paths.sort();
        paths.dedup();
        Self { paths }
    }
}

impl Corpus for DiskCorpus {
    fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn load(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory corpus for tests and embedding without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryCorpus {
    paths: Vec<PathBuf>,
    sources: FxHashMap<PathBuf, String>,
}

impl MemoryCorpus {
    /// Builds a corpus from (identifier, source) pairs, in order.
    #[must_use]
    pub fn new(files: &[(&str, &str)]) -> Self {
        let mut corpus = Self::default();
        for (path, source) in files {
            corpus.add(path, source);
        }
        corpus
    }

    /// Appends one file.
    pub fn add(&mut self, path: &str, source: &str) {
        let path = PathBuf::from(path);
        self.paths.push(path.clone());
        self.sources.insert(path, source.to_owned());
    }

    /// Registers a path with no source; loading it fails, which is how
    /// tests exercise per-file I/O errors.
    pub fn add_unreadable(&mut self, path: &str) {
        self.paths.push(PathBuf::from(path));
    }
}

impl Corpus for MemoryCorpus {
    fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn load(&self, path: &Path) -> io::Result<String> {
        self.sources.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::create_dir(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("b.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not python").unwrap();
        fs::write(dir.path().join("pkg/c.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("tests/test_a.py"), "x = 1\n").unwrap();

        let corpus = DiskCorpus::collect(
            &[dir.path().to_path_buf()],
            &["py".to_owned()],
            &["tests".to_owned()],
        );
        let names: Vec<_> = corpus
            .paths()
            .iter()
            .map(|path| path.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, ["a.py", "b.py", "pkg/c.py"]);
    }

    #[test]
    fn file_roots_are_taken_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.py");
        fs::write(&file, "x = 1\n").unwrap();
        let corpus = DiskCorpus::collect(&[file.clone()], &["py".to_owned()], &[]);
        assert_eq!(corpus.paths(), [file]);
    }
}
