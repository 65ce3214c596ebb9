//! Loose object storage over the filesystem collaborator.
//!
//! Each object lives at `objects/XX/YYYY...` where `XX` is the first byte
//! of the OID in hex and `YYYY...` is the rest. The file content is
//! zlib-compressed `"<type> <size>\0<payload>"`. The store is
//! content-addressed and append-only: objects are never mutated or deleted.

mod read;
mod write;
pub mod zlib;

use std::sync::Arc;

use gitd_fs::Filesystem;
use gitd_hash::ObjectId;

pub use zlib::ZlibError;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum OdbError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: ObjectId, reason: String },

    #[error(transparent)]
    Zlib(#[from] ZlibError),

    #[error(transparent)]
    Object(#[from] gitd_object::ObjectError),

    #[error(transparent)]
    Fs(#[from] gitd_fs::FsError),
}

/// Interface to the loose object directory (`objects/`).
pub struct ObjectStore {
    fs: Arc<dyn Filesystem>,
    compression: flate2::Compression,
}

impl ObjectStore {
    /// Open the store over a filesystem collaborator.
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self {
            fs,
            compression: flate2::Compression::default(),
        }
    }

    /// Set the zlib compression level (0–9).
    pub fn set_compression_level(&mut self, level: u32) {
        self.compression = flate2::Compression::new(level);
    }

    /// The repository-relative path for a given OID.
    pub fn object_path(oid: &ObjectId) -> String {
        format!("objects/{}", oid.loose_path())
    }

    /// Check if an object exists.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.fs.stat(&Self::object_path(oid)).is_file()
    }

    pub(crate) fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }
}
