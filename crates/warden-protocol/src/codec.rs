//! Codec trait and implementations for the persisted ledger document.
//!
//! Stores are generic over [`Codec`]. The one in use is [`JsonCodec`], so
//! the ledger file stays readable and hand-editable by server operators.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns the ledger document (or any serde type) into bytes and back.
///
/// `Send + Sync + 'static` because the store that owns it is shared
/// across every thread that mutates the ledger.
pub trait Codec: Send + Sync + 'static {
    /// Encodes `value`.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Decodes a value from `data`.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// `pretty` switches to indented output. The file store uses the pretty
/// form so the ledger diffs cleanly and operators can read it.
///
/// ## Example
///
/// ```rust
/// use warden_protocol::{Codec, JsonCodec, LedgerDocument};
///
/// let codec = JsonCodec::pretty();
/// let bytes = codec.encode(&LedgerDocument::default()).unwrap();
/// let decoded: LedgerDocument = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, LedgerDocument::default());
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    /// Emit indented JSON instead of a single line.
    pub pretty: bool,
}

#[cfg(feature = "json")]
impl JsonCodec {
    /// A codec that writes indented JSON.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        if self.pretty {
            serde_json::to_vec_pretty(value).map_err(ProtocolError::Encode)
        } else {
            serde_json::to_vec(value).map_err(ProtocolError::Encode)
        }
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{LedgerDocument, StoredPunishment};

    #[test]
    fn test_compact_codec_emits_single_line() {
        let bytes = JsonCodec::default()
            .encode(&LedgerDocument::default())
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_pretty_codec_emits_indented_json() {
        let mut doc = LedgerDocument::default();
        doc.bans.insert(
            "0f8fad5b-d9cb-469f-a165-70867728950e".into(),
            StoredPunishment {
                player_name: "Steve".into(),
                reason: "griefing".into(),
                expire_time: None,
                created_time: 1,
            },
        );
        let bytes = JsonCodec::pretty().encode(&doc).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\n  \"bans\""));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<LedgerDocument, _> = JsonCodec::default().decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
