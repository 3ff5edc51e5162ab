//! A [`PersistentStore`] backed by a single JSON file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use warden_protocol::{Codec, JsonCodec, LedgerDocument};

use crate::{PersistentStore, StoreError};

/// Stores the ledger document in one file, pretty-printed JSON by default.
///
/// Saves go to a sibling `*.tmp` file which is then renamed over the real
/// one, so a crash mid-write leaves the previous document intact rather
/// than a truncated file. Saves are serialized internally because they
/// share that temporary path.
pub struct JsonFileStore<C: Codec = JsonCodec> {
    path: PathBuf,
    codec: C,
    write_lock: Mutex<()>,
}

impl JsonFileStore<JsonCodec> {
    /// Creates a store at `path` using pretty JSON. The file (and its
    /// parent directories) are created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_codec(path, JsonCodec::pretty())
    }
}

impl<C: Codec> JsonFileStore<C> {
    /// Creates a store at `path` that encodes with `codec`.
    pub fn with_codec(path: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            path: path.into(),
            codec,
            write_lock: Mutex::new(()),
        }
    }

    /// Where the document lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<C: Codec> PersistentStore for JsonFileStore<C> {
    fn load(&self) -> Result<Option<LedgerDocument>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger file yet");
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let document: LedgerDocument = self.codec.decode(&bytes)?;
        tracing::debug!(
            path = %self.path.display(),
            bans = document.bans.len(),
            mutes = document.mutes.len(),
            "ledger file loaded"
        );
        Ok(Some(document))
    }

    fn save(&self, document: &LedgerDocument) -> Result<(), StoreError> {
        let bytes = self.codec.encode(document)?;
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let _guard = self.write_lock.lock();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let temp = self.temp_path();
        fs::write(&temp, &bytes).map_err(write_err)?;
        fs::rename(&temp, &self.path).map_err(write_err)?;

        tracing::trace!(path = %self.path.display(), bytes = bytes.len(), "ledger file saved");
        Ok(())
    }
}
