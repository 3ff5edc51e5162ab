//! Unified error type for the Warden facade.

use std::path::PathBuf;

use warden_ledger::LedgerError;
use warden_presence::RequestError;
use warden_protocol::PlayerId;
use warden_store::StoreError;
use warden_tick::TickError;

/// Top-level error that wraps every sub-crate error.
///
/// `?` converts sub-crate errors automatically through the `#[from]`
/// impls, so callers of the facade only ever match on this type.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    /// The scheduler couldn't be created.
    #[error(transparent)]
    Tick(#[from] TickError),

    /// The durable store failed. A failed flush at shutdown lands here
    /// rather than under [`Ledger`](Self::Ledger).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Ledger failure, such as a malformed duration string.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The request slot is occupied, or there's nothing to accept.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A player tried to send a teleport request to themselves.
    #[error("player {0} cannot send a request to themselves")]
    SelfRequest(PlayerId),

    /// The configuration file couldn't be read or parsed.
    #[error("invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl WardenError {
    /// Like `From<LedgerError>`, but lifts a store failure out of the
    /// ledger wrapper so hosts can match on [`Store`](Self::Store) directly.
    pub(crate) fn from_ledger(err: LedgerError) -> Self {
        match err {
            LedgerError::Store(e) => Self::Store(e),
            other => Self::Ledger(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_request_error() {
        let target = PlayerId::random();
        let err: WardenError = RequestError::NotFound(target).into();
        assert!(matches!(err, WardenError::Request(RequestError::NotFound(t)) if t == target));
        assert!(err.to_string().contains(&target.to_string()));
    }

    #[test]
    fn test_from_ledger_error() {
        let err: WardenError = LedgerError::InvalidDurationFormat("7x".into()).into();
        assert!(matches!(err, WardenError::Ledger(_)));
        assert!(err.to_string().contains("7x"));
    }

    #[test]
    fn test_ledger_store_failure_flattens_to_store() {
        let store_err = StoreError::Unavailable("disk full".into());
        let err = WardenError::from_ledger(LedgerError::Store(store_err));
        assert!(matches!(err, WardenError::Store(StoreError::Unavailable(_))));
        assert!(err.to_string().contains("disk full"));

        let err = WardenError::from_ledger(LedgerError::InvalidDurationFormat("x".into()));
        assert!(matches!(err, WardenError::Ledger(_)));
    }

    #[test]
    fn test_from_tick_error() {
        let err: WardenError = TickError::NoRuntime.into();
        assert!(matches!(err, WardenError::Tick(_)));
    }

    #[test]
    fn test_config_error_names_the_file() {
        let err = WardenError::Config {
            path: PathBuf::from("warden.json"),
            reason: "expected value".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration in warden.json: expected value"
        );
    }
}
