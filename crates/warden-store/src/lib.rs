//! Durability for the punishment ledger.
//!
//! Provides the [`PersistentStore`] trait that abstracts over where the
//! ledger document lives, plus two implementations:
//!
//! - [`JsonFileStore`]: one JSON file on disk, replaced atomically on
//!   every save (feature `json`, on by default).
//! - [`MemoryStore`]: keeps the last saved document in memory; can be
//!   told to fail saves, which is how the ledger's "log and keep going"
//!   policy is tested.
//!
//! The ledger only needs "load once at startup, write the whole document
//! after each mutation", so that's all the trait offers.

mod error;
#[cfg(feature = "json")]
mod file;
mod memory;

pub use error::StoreError;
#[cfg(feature = "json")]
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use warden_protocol::LedgerDocument;

/// Loads and saves the ledger document.
///
/// Called synchronously from whichever thread mutated the ledger, so
/// implementations must be `Send + Sync`.
pub trait PersistentStore: Send + Sync + 'static {
    /// Reads the stored document.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet (first start).
    fn load(&self) -> Result<Option<LedgerDocument>, StoreError>;

    /// Replaces the stored document with `document`.
    fn save(&self, document: &LedgerDocument) -> Result<(), StoreError>;
}
