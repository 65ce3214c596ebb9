//! Git object model for the gitd server core.
//!
//! Objects are typed, immutable byte sequences identified by the SHA-1 of
//! `"<type> <size>\0" || payload`. This crate provides the type enum with
//! its wire numbers, the object header codec, and the two structural parses
//! the transfer protocol needs: commit metadata (tree + parents) and tree
//! entries.

mod commit;
pub mod header;
mod tree;

pub use commit::CommitInfo;
pub use tree::TreeEntry;

use bstr::BString;
use gitd_hash::{HashError, Hasher, ObjectId};

/// Errors produced by object parsing.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("unknown object type: {0}")]
    UnknownType(BString),

    #[error("unknown pack object type number: {0}")]
    UnknownTypeNumber(u8),

    #[error("invalid object header: {0}")]
    InvalidHeader(String),

    #[error("object size mismatch: header says {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid tree entry at offset {offset}: {reason}")]
    InvalidTreeEntry { offset: usize, reason: String },

    #[error("expected a {expected} object, found {actual}")]
    WrongType {
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// The four storable object types.
///
/// Pack streams additionally use numbers 6 (`ofs-delta`) and 7 (`ref-delta`);
/// those never reach this enum — deltas are resolved to one of these four
/// before an object is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectType {
    /// Parse from the type string in object headers.
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        match s {
            b"commit" => Ok(Self::Commit),
            b"tree" => Ok(Self::Tree),
            b"blob" => Ok(Self::Blob),
            b"tag" => Ok(Self::Tag),
            _ => Err(ObjectError::UnknownType(BString::from(s))),
        }
    }

    /// The canonical byte representation.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Commit => b"commit",
            Self::Tree => b"tree",
            Self::Blob => b"blob",
            Self::Tag => b"tag",
        }
    }

    /// The canonical name as a str.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
        }
    }

    /// Type number as used in pack entry headers (1..=4).
    pub fn type_number(&self) -> u8 {
        match self {
            Self::Commit => 1,
            Self::Tree => 2,
            Self::Blob => 3,
            Self::Tag => 4,
        }
    }

    /// Parse a pack entry type number (1..=4).
    pub fn from_type_number(n: u8) -> Result<Self, ObjectError> {
        match n {
            1 => Ok(Self::Commit),
            2 => Ok(Self::Tree),
            3 => Ok(Self::Blob),
            4 => Ok(Self::Tag),
            other => Err(ObjectError::UnknownTypeNumber(other)),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = ObjectError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

/// A loaded object: identity, type, and raw payload (no header).
///
/// Commit metadata and tree entries are parsed on demand from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub oid: ObjectId,
    pub obj_type: ObjectType,
    pub data: Vec<u8>,
}

impl Object {
    /// Build an object from decompressed bytes (`"<type> <size>\0" || payload`).
    ///
    /// The payload length must equal the declared size exactly.
    pub fn from_raw(oid: ObjectId, raw: &[u8]) -> Result<Self, ObjectError> {
        let (obj_type, size, header_len) = header::parse_header(raw)?;
        let data = &raw[header_len..];
        if data.len() != size {
            return Err(ObjectError::SizeMismatch {
                expected: size,
                actual: data.len(),
            });
        }
        Ok(Self {
            oid,
            obj_type,
            data: data.to_vec(),
        })
    }

    /// Build an object from a type and bare payload, computing the oid.
    pub fn from_payload(obj_type: ObjectType, data: Vec<u8>) -> Self {
        let oid = Hasher::hash_object(obj_type.as_str(), &data);
        Self {
            oid,
            obj_type,
            data,
        }
    }

    /// Parse commit metadata (tree hash + ordered parent hashes).
    pub fn commit_info(&self) -> Result<CommitInfo, ObjectError> {
        if self.obj_type != ObjectType::Commit {
            return Err(ObjectError::WrongType {
                expected: ObjectType::Commit,
                actual: self.obj_type,
            });
        }
        CommitInfo::parse(&self.data)
    }

    /// Parse the payload as a tree and return its entries.
    pub fn tree_entries(&self) -> Result<Vec<TreeEntry>, ObjectError> {
        if self.obj_type != ObjectType::Tree {
            return Err(ObjectError::WrongType {
                expected: ObjectType::Tree,
                actual: self.obj_type,
            });
        }
        tree::parse_tree(&self.data)
    }
}
