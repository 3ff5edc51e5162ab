//! Error types for the request table.

use warden_protocol::PlayerId;

/// Expected outcomes of request operations that the caller reports back
/// to the player. Neither is a fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The target already has a pending request (from anyone).
    #[error("player {target} already has a pending request from {requester}")]
    AlreadyPending {
        target: PlayerId,
        requester: PlayerId,
    },

    /// There is no pending request addressed to this player.
    #[error("no pending request for player {0}")]
    NotFound(PlayerId),
}
