//! Errors for identity parsing and document encoding.

/// Errors that can occur while decoding identities or (de)serializing
/// the ledger document.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The document couldn't be encoded.
    #[cfg(feature = "json")]
    #[error("failed to encode ledger document: {0}")]
    Encode(serde_json::Error),

    /// The bytes weren't a valid document.
    ///
    /// Common causes: a hand-edited ledger file with a syntax error,
    /// or a field with the wrong type.
    #[cfg(feature = "json")]
    #[error("failed to decode ledger document: {0}")]
    Decode(serde_json::Error),

    /// A string that should have been a player UUID wasn't one.
    #[error("invalid player id: {0}")]
    InvalidPlayerId(String),
}
