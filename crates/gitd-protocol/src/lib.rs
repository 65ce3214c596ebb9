//! Smart protocol v1 services for the gitd server core.
//!
//! Implements the server half of the original line-framed smart protocol:
//! the refs advertisement, the want/have negotiation with reachability
//! traversal feeding the pack emitter (`git-upload-pack`), and ref updates
//! with pack ingestion and the report-status response (`git-receive-pack`).
//! Transport glue (HTTP, TCP) is the caller's business — every entry point
//! consumes a byte reader and writes to a byte writer.

pub mod advertise;
pub mod negotiate;
pub mod pktline;
pub mod receive;
mod serve;
pub mod traverse;
mod upload;

pub use advertise::Service;
pub use negotiate::Negotiation;
pub use pktline::{Packet, PktReader, PktWriter, MAX_PKT_DATA_LEN};
pub use receive::{ReceiveReport, RefUpdate};
pub use serve::{Phase, PhaseObserver, Repository};
pub use traverse::reachable;

use gitd_hash::ObjectId;

/// Errors that can occur during protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed pkt-line frame: {0}")]
    MalformedFrame(String),

    #[error("short read while reading {0}")]
    ShortRead(&'static str),

    #[error("pkt-line payload too long: {0} bytes")]
    LineTooLong(usize),

    #[error("unsupported service: {0}")]
    UnsupportedService(String),

    #[error("invalid ref update line: {0}")]
    BadUpdate(String),

    #[error("tag objects are not supported: {0}")]
    UnsupportedTag(ObjectId),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Pack(#[from] gitd_pack::PackError),

    #[error(transparent)]
    Odb(#[from] gitd_odb::OdbError),

    #[error(transparent)]
    Object(#[from] gitd_object::ObjectError),

    #[error(transparent)]
    Ref(#[from] gitd_ref::RefError),

    #[error(transparent)]
    Fs(#[from] gitd_fs::FsError),
}
