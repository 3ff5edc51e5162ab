//! Error types for the ledger.

use warden_store::StoreError;

/// Errors returned by ledger operations.
///
/// Note what's missing: imposing, querying, and revoking never fail.
/// Persistence problems during those calls are logged and swallowed; only
/// an explicit [`flush`](crate::PunishmentLedger::flush) reports them.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A duration string like `"1d12h"` didn't parse. Expected user
    /// input error; show the accepted format and move on.
    #[error("invalid duration format: {0:?} (expected e.g. 1d12h30m)")]
    InvalidDurationFormat(String),

    /// Saving the ledger document failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
