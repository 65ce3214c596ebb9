//! Object identity and hash computation for the gitd server core.
//!
//! This crate provides the `ObjectId` type (a 20-byte SHA-1), hex
//! encoding/decoding, and the streaming `Hasher` used for object addresses
//! and packfile trailers.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use hasher::Hasher;
pub use oid::{ObjectId, OID_HEX_LEN, OID_LEN};
