//! File scanning utilities
//!
//! Recursive file discovery with extension and directory filters. Walks are
//! sorted by file name so every consumer sees a deterministic order.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File scanner with configurable filters
pub struct FileScanner {
    root: PathBuf,
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
}

impl FileScanner {
    /// Create a new file scanner rooted at the given path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: Vec::new(),
            excluded_dirs: Vec::new(),
        }
    }

    /// Filter by file extensions (e.g., "rs", "toml")
    #[must_use]
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Directory names whose whole subtree is skipped
    #[must_use]
    pub fn exclude_dirs<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.excluded_dirs = names.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Scan and return matching files.
    ///
    /// Entries that cannot be read (permissions, races with deletion) are
    /// skipped rather than failing the scan.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::directory_not_found(&self.root));
        }

        let files = self
            .walk()
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches_extension(e.path()))
            .map(DirEntry::into_path)
            .collect();

        Ok(files)
    }

    fn walk(&self) -> impl Iterator<Item = DirEntry> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_excluded_dir(e))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable entry");
                    None
                }
            })
    }

    fn matches_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.extensions.iter().any(|e| e == ext)
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.excluded_dirs.iter().any(|d| d == name))
    }
}

/// Count files under `dir` (recursively) whose extension equals `extension`
pub fn count_files_with_extension(dir: &Path, extension: &str) -> Result<usize> {
    Ok(FileScanner::new(dir).with_extensions(&[extension]).scan()?.len())
}

/// A file that exceeds the size threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OversizedFile {
    /// Path relative to the scanned root
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

/// Find files larger than `max_bytes` under `root`.
///
/// Files whose extension is in `excluded_extensions` and anything under a
/// directory named in `excluded_dirs` are ignored. Files whose metadata
/// cannot be read are skipped.
pub fn oversized_files<S: AsRef<str>>(
    root: &Path,
    max_bytes: u64,
    excluded_extensions: &[S],
    excluded_dirs: &[S],
) -> Result<Vec<OversizedFile>> {
    let files = FileScanner::new(root).exclude_dirs(excluded_dirs).scan()?;

    let oversized = files
        .into_iter()
        .filter(|path| {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            !excluded_extensions.iter().any(|x| x.as_ref() == ext)
        })
        .filter_map(|path| {
            let size = file_size(&path).ok()?;
            (size > max_bytes).then(|| OversizedFile {
                path: path.strip_prefix(root).map(Path::to_path_buf).unwrap_or(path),
                size,
            })
        })
        .collect();

    Ok(oversized)
}

/// Get file size in bytes
pub fn file_size(path: &Path) -> Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Read a file as UTF-8 text, separating "missing", "unreadable" and
/// "not valid UTF-8" into distinct error codes.
pub fn read_text(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| Error::decode(path, e))
}
