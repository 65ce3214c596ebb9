use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{normalize_path, FileKind, Filesystem, FsError, Metadata};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Disk-backed filesystem rooted at a repository directory.
///
/// All paths are normalised relative to the root; a request can never
/// resolve outside it.
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    /// Open a filesystem rooted at `root`. The directory must exist.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, FsError> {
        let root = root.as_ref().to_path_buf();
        let meta = fs::metadata(&root).map_err(|e| io_err(&root, e))?;
        if !meta.is_dir() {
            return Err(FsError::NotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }

    fn abs(&self, path: &str) -> PathBuf {
        let rel = normalize_path(path);
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }
}

impl Filesystem for DiskFs {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let full = self.abs(path);
        fs::read(&full).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FsError::NotFound(normalize_path(path))
            } else {
                io_err(&full, e)
            }
        })
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<(), FsError> {
        let full = self.abs(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        // Write to a sibling temp file, then rename into place so readers
        // never observe a half-written file.
        let tmp = full.with_extension(format!(
            "tmp{}_{}",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, data).map_err(|e| io_err(&tmp, e))?;
        match fs::rename(&tmp, &full) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                Err(io_err(&full, e))
            }
        }
    }

    fn stat(&self, path: &str) -> Metadata {
        match fs::metadata(self.abs(path)) {
            Ok(meta) if meta.is_dir() => Metadata {
                kind: FileKind::Dir,
                size: meta.len(),
            },
            Ok(meta) => Metadata {
                kind: FileKind::File,
                size: meta.len(),
            },
            Err(_) => Metadata::ABSENT,
        }
    }

    fn scan(&self, path: &str, max_depth: i32) -> Result<BTreeMap<String, Metadata>, FsError> {
        let root = self.abs(path);
        let prefix = normalize_path(path);
        let mut result = BTreeMap::new();
        walk(&root, &prefix, 0, max_depth, &mut result)?;
        Ok(result)
    }

    fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let full = self.abs(path);
        fs::create_dir_all(&full).map_err(|e| io_err(&full, e))
    }
}

fn walk(
    dir: &Path,
    prefix: &str,
    depth: i32,
    max_depth: i32,
    result: &mut BTreeMap<String, Metadata>,
) -> Result<(), FsError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FsError::NotFound(prefix.to_string())
        } else {
            io_err(dir, e)
        }
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let key = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };

        let meta = entry.metadata().map_err(|e| io_err(&entry.path(), e))?;
        if meta.is_dir() {
            if max_depth < 0 || depth < max_depth {
                walk(&entry.path(), &key, depth + 1, max_depth, result)?;
            }
        } else {
            result.insert(
                key,
                Metadata {
                    kind: FileKind::File,
                    size: meta.len(),
                },
            );
        }
    }

    Ok(())
}

fn io_err(path: &Path, source: std::io::Error) -> FsError {
    FsError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, DiskFs) {
        let dir = tempfile::tempdir().unwrap();
        let fs = DiskFs::open(dir.path()).unwrap();
        (dir, fs)
    }

    #[test]
    fn write_creates_parents_and_reads_back() {
        let (_dir, fs) = open_temp();
        fs.write_file("refs/heads/main", b"abc").unwrap();
        assert_eq!(fs.read_file("refs/heads/main").unwrap(), b"abc");
    }

    #[test]
    fn read_missing_is_not_found() {
        let (_dir, fs) = open_temp();
        assert!(matches!(
            fs.read_file("nope").unwrap_err(),
            FsError::NotFound(_)
        ));
    }

    #[test]
    fn stat_classifies() {
        let (_dir, fs) = open_temp();
        fs.write_file("refs/heads/main", b"abc").unwrap();
        assert!(fs.stat("refs").is_dir());
        assert!(fs.stat("refs/heads/main").is_file());
        assert_eq!(fs.stat("refs/heads/main").size, 3);
        assert_eq!(fs.stat("missing").kind, FileKind::Absent);
    }

    #[test]
    fn scan_returns_files_with_prefixed_keys() {
        let (_dir, fs) = open_temp();
        fs.write_file("refs/heads/main", b"a").unwrap();
        fs.write_file("refs/heads/dev", b"b").unwrap();
        fs.write_file("refs/tags/v1", b"c").unwrap();

        let found = fs.scan("refs", -1).unwrap();
        let keys: Vec<&str> = found.keys().map(String::as_str).collect();
        assert_eq!(keys, ["refs/heads/dev", "refs/heads/main", "refs/tags/v1"]);
        assert!(found.values().all(|m| m.is_file()));
    }

    #[test]
    fn scan_respects_depth() {
        let (_dir, fs) = open_temp();
        fs.write_file("top", b"x").unwrap();
        fs.write_file("a/mid", b"x").unwrap();
        fs.write_file("a/b/deep", b"x").unwrap();

        let shallow = fs.scan("", 0).unwrap();
        assert!(shallow.contains_key("top"));
        assert!(!shallow.contains_key("a/mid"));

        let one = fs.scan("", 1).unwrap();
        assert!(one.contains_key("a/mid"));
        assert!(!one.contains_key("a/b/deep"));
    }

    #[test]
    fn paths_cannot_escape_root() {
        let (_dir, fs) = open_temp();
        fs.write_file("../escape", b"x").unwrap();
        // The file landed inside the root, not beside it.
        assert!(fs.stat("escape").is_file());
    }

    #[test]
    fn overwrite_replaces_content() {
        let (_dir, fs) = open_temp();
        fs.write_file("f", b"one").unwrap();
        fs.write_file("f", b"two").unwrap();
        assert_eq!(fs.read_file("f").unwrap(), b"two");
    }

    #[test]
    fn mkdir_is_recursive() {
        let (_dir, fs) = open_temp();
        fs.mkdir("objects/aa").unwrap();
        assert!(fs.stat("objects/aa").is_dir());
    }
}
