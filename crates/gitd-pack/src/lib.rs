//! Packfile emission and ingestion for the gitd server core.
//!
//! A v2 packfile is `"PACK"`, a big-endian version, a big-endian object
//! count, one header-plus-deflate record per object, and a trailing SHA-1
//! of everything before it. The emitter sends every object undeltified;
//! the ingester additionally resolves `ref-delta` entries against the
//! local store. `ofs-delta` entries are recognized and rejected.

pub mod delta;
pub mod emit;
pub mod entry;
pub mod ingest;

use gitd_hash::ObjectId;
use gitd_odb::{OdbError, ZlibError};

pub use emit::write_pack;
pub use ingest::ingest_pack;

/// Pack format constants.
pub const PACK_SIGNATURE: &[u8; 4] = b"PACK";
pub const PACK_VERSION: u32 = 2;

/// Pack entry type numbers for the two delta encodings.
pub const OFS_DELTA: u8 = 6;
pub const REF_DELTA: u8 = 7;

/// Errors that can occur during pack operations.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("invalid pack signature")]
    BadMagic,

    #[error("unsupported pack version: {0}")]
    BadVersion(u32),

    #[error("ofs-delta entries are not supported")]
    OfsDeltaUnsupported,

    #[error("delta base not found: {0}")]
    MissingBase(ObjectId),

    #[error("invalid delta: {reason}")]
    InvalidDelta { reason: String },

    #[error("corrupt pack entry {index}: {reason}")]
    CorruptEntry { index: u32, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zlib(#[from] ZlibError),

    #[error(transparent)]
    Odb(#[from] OdbError),

    #[error(transparent)]
    Object(#[from] gitd_object::ObjectError),
}
