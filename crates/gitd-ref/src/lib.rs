//! Refs and HEAD for the gitd server core.
//!
//! A ref is a file below `refs/` whose content begins with 40 hex
//! characters (trailing newline optional). `HEAD` at the repository root is
//! either symbolic (`ref: refs/heads/main`) or detached (a bare hex hash).

mod head;
mod store;

pub use head::Head;
pub use store::RefStore;

/// Errors from ref operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("invalid ref {name}: {reason}")]
    Parse { name: String, reason: String },

    #[error("could not determine HEAD: {0}")]
    BadHead(String),

    #[error(transparent)]
    Fs(#[from] gitd_fs::FsError),
}
