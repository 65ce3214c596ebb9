//! Filesystem collaborator for the gitd server core.
//!
//! The repository core never touches the host filesystem directly; it goes
//! through the [`Filesystem`] trait with forward-slash paths relative to a
//! repository root fixed at construction. [`DiskFs`] is the production
//! implementation, [`MemoryFs`] the in-memory one used by tests.

mod disk;
mod memory;

pub use disk::DiskFs;
pub use memory::MemoryFs;

use std::collections::BTreeMap;

/// Errors from filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Absent,
    File,
    Dir,
}

/// Result of a [`Filesystem::stat`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub kind: FileKind,
    pub size: u64,
}

impl Metadata {
    pub const ABSENT: Self = Self {
        kind: FileKind::Absent,
        size: 0,
    };

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }
}

/// Capability set the repository core requires from its host.
///
/// Paths use forward slashes and are interpreted relative to the root the
/// implementation was constructed with; implementations normalise them and
/// never let a path escape the root.
pub trait Filesystem: Send + Sync {
    /// Read a whole file.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError>;

    /// Write a whole file, creating parent directories as needed.
    fn write_file(&self, path: &str, data: &[u8]) -> Result<(), FsError>;

    /// Classify a path. Errors collapse to [`Metadata::ABSENT`].
    fn stat(&self, path: &str) -> Metadata;

    /// Recursively list the files below `path`.
    ///
    /// `max_depth < 0` means unlimited depth; otherwise directories more
    /// than `max_depth` levels below `path` are not descended into. Keys
    /// are forward-slash paths including the `path` prefix; only files are
    /// returned.
    fn scan(&self, path: &str, max_depth: i32) -> Result<BTreeMap<String, Metadata>, FsError>;

    /// Create a directory, including missing parents.
    fn mkdir(&self, path: &str) -> Result<(), FsError>;
}

/// Normalise a repository-relative path.
///
/// Control characters are dropped, separators collapsed, and `.` / `..`
/// components resolved without ever climbing above the root.
pub(crate) fn normalize_path(path: &str) -> String {
    let cleaned: String = path.chars().filter(|&c| c >= ' ').collect();
    let mut parts: Vec<&str> = Vec::new();
    for part in cleaned.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}
