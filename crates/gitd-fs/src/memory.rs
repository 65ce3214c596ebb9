use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::{normalize_path, FileKind, Filesystem, FsError, Metadata};

/// In-memory filesystem for tests.
///
/// Files live in a path-keyed map behind a mutex; directories exist
/// implicitly as file-path prefixes and explicitly via [`mkdir`]
/// (so an empty `objects/` directory stats as a directory, as it does on
/// disk in a freshly initialised repository).
///
/// [`mkdir`]: Filesystem::mkdir
#[derive(Default)]
pub struct MemoryFs {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently stored.
    pub fn file_count(&self) -> usize {
        self.inner.lock().unwrap().files.len()
    }
}

impl Inner {
    fn dir_exists(&self, path: &str) -> bool {
        if self.dirs.contains(path) {
            return true;
        }
        let prefix = format!("{path}/");
        self.files.keys().any(|k| k.starts_with(&prefix))
            || self.dirs.iter().any(|d| d.starts_with(&prefix))
    }
}

impl Filesystem for MemoryFs {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let path = normalize_path(path);
        let inner = self.inner.lock().unwrap();
        inner
            .files
            .get(&path)
            .cloned()
            .ok_or(FsError::NotFound(path))
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<(), FsError> {
        let path = normalize_path(path);
        let mut inner = self.inner.lock().unwrap();
        inner.files.insert(path, data.to_vec());
        Ok(())
    }

    fn stat(&self, path: &str) -> Metadata {
        let path = normalize_path(path);
        let inner = self.inner.lock().unwrap();
        if path.is_empty() {
            return Metadata {
                kind: FileKind::Dir,
                size: 0,
            };
        }
        if let Some(data) = inner.files.get(&path) {
            return Metadata {
                kind: FileKind::File,
                size: data.len() as u64,
            };
        }
        if inner.dir_exists(&path) {
            return Metadata {
                kind: FileKind::Dir,
                size: 0,
            };
        }
        Metadata::ABSENT
    }

    fn scan(&self, path: &str, max_depth: i32) -> Result<BTreeMap<String, Metadata>, FsError> {
        let path = normalize_path(path);
        let inner = self.inner.lock().unwrap();
        if !path.is_empty() && !inner.dir_exists(&path) {
            return Err(FsError::NotFound(path));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        let mut result = BTreeMap::new();
        for (key, data) in &inner.files {
            let Some(rel) = key.strip_prefix(&prefix) else {
                continue;
            };
            // Depth of a file is the number of directories below the scan
            // root it sits in.
            let depth = rel.matches('/').count() as i32;
            if max_depth >= 0 && depth > max_depth {
                continue;
            }
            result.insert(
                key.clone(),
                Metadata {
                    kind: FileKind::File,
                    size: data.len() as u64,
                },
            );
        }
        Ok(result)
    }

    fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Ok(());
        }
        let mut inner = self.inner.lock().unwrap();
        inner.dirs.insert(path);
        Ok(())
    }
}
