use std::path::PathBuf;

use warden_protocol::ProtocolError;

/// Errors that can occur while loading or saving the ledger.
///
/// The ledger logs these and carries on: in-memory state stays
/// authoritative even when a write fails.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading the ledger file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or replacing the ledger file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document couldn't be encoded or the stored bytes couldn't be
    /// decoded.
    #[error(transparent)]
    Codec(#[from] ProtocolError),

    /// The store refused the operation (used by [`MemoryStore`](crate::MemoryStore)
    /// to simulate outages).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
