//! Notices: the events the core hands to the host's broadcast service.
//!
//! The core's contract is about *when* and *how many times* each notice
//! fires. Turning a notice into a coloured chat line is the host's
//! business, so a [`Notice`] carries ids and nothing presentational.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::PlayerId;

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who a notice is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every connected player (server-wide announcement).
    All,
    /// Exactly one player.
    Player(PlayerId),
    /// Both parties of a paired request: `(requester, target)`.
    Pair(PlayerId, PlayerId),
}

impl Recipient {
    /// Returns `true` if `player` would receive a notice sent here.
    pub fn includes(&self, player: PlayerId) -> bool {
        match *self {
            Self::All => true,
            Self::Player(p) => p == player,
            Self::Pair(a, b) => a == player || b == player,
        }
    }
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// An event emitted by one of the core subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    /// `requester` asked to teleport to `target`.
    TeleportRequested { requester: PlayerId, target: PlayerId },
    /// `target` accepted the pending request from `requester`.
    TeleportAccepted { requester: PlayerId, target: PlayerId },
    /// The request from `requester` to `target` timed out unanswered.
    TeleportExpired { requester: PlayerId, target: PlayerId },
    /// `player` started an idle episode.
    NowIdle { player: PlayerId },
    /// `player` ended an idle episode.
    Returned { player: PlayerId },
}

impl Notice {
    /// Who should see this notice.
    pub fn recipient(&self) -> Recipient {
        match *self {
            Self::TeleportRequested { requester, target }
            | Self::TeleportAccepted { requester, target }
            | Self::TeleportExpired { requester, target } => Recipient::Pair(requester, target),
            Self::NowIdle { .. } | Self::Returned { .. } => Recipient::All,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// The host's broadcast/announcement service, as seen by the core.
///
/// Called from event callbacks, sweeps, and timer tasks, possibly all at
/// once, hence `Send + Sync`. Implementations must not block and must not
/// call back into the subsystem that emitted the notice: the idleness
/// tracker emits while holding its lock so notices come out in the same
/// order as the state changes that caused them.
pub trait Notifier: Send + Sync + 'static {
    /// Delivers one notice.
    fn notify(&self, notice: Notice);
}

/// Forwards notices into an unbounded Tokio channel.
///
/// The host drains the receiver on its own task and renders each notice.
/// Tests use it to count exactly how many notices fired.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiver end that yields its notices.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // The receiver only goes away during host shutdown.
        if self.sender.send(notice).is_err() {
            tracing::trace!("notice dropped, receiver closed");
        }
    }
}

/// Writes every notice to the log. The default when the host hasn't
/// wired up a broadcast service.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::info!(?notice, recipient = ?notice.recipient(), "notice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teleport_notices_address_both_parties() {
        let a = PlayerId::random();
        let b = PlayerId::random();
        let notice = Notice::TeleportExpired { requester: a, target: b };
        let recipient = notice.recipient();
        assert_eq!(recipient, Recipient::Pair(a, b));
        assert!(recipient.includes(a));
        assert!(recipient.includes(b));
        assert!(!recipient.includes(PlayerId::random()));
    }

    #[test]
    fn test_idle_notices_are_broadcast() {
        let p = PlayerId::random();
        assert_eq!(Notice::NowIdle { player: p }.recipient(), Recipient::All);
        assert_eq!(Notice::Returned { player: p }.recipient(), Recipient::All);
    }

    #[tokio::test]
    async fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let p = PlayerId::random();
        notifier.notify(Notice::NowIdle { player: p });
        notifier.notify(Notice::Returned { player: p });

        assert_eq!(rx.recv().await, Some(Notice::NowIdle { player: p }));
        assert_eq!(rx.recv().await, Some(Notice::Returned { player: p }));
    }

    #[test]
    fn test_channel_notifier_survives_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notice::NowIdle { player: PlayerId::random() });
    }
}
