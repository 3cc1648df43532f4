//! Outbound platform interfaces: message rendering and channel broadcasts.
//!
//! Sinks run strictly after the owning session actor has committed a
//! mutation. A sink failure aborts that event's remaining side effects and
//! nothing else; the roster is never rolled back and nothing is retried.

use crate::trigger::TriggerKind;
use crate::view::SessionView;
use async_trait::async_trait;
use common::types::{ChannelId, SessionId, UserId};
use serde::Serialize;
use thiserror::Error;

/// Failure modes reported by the platform sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The backing message no longer exists; the session should be evicted.
    #[error("backing message gone")]
    MessageGone,

    /// Transient platform failure; the update is dropped, never retried.
    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

/// How many more players a recruit call should ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NeededRange {
    /// Between `min` and `max` more players.
    Between { min: u32, max: u32 },
    /// Exactly this many.
    Exactly(u32),
}

impl NeededRange {
    /// Headcount table keyed off the current number of real participants
    /// in the main partition. Returns `None` once the squad is full:
    /// nothing to broadcast.
    #[must_use]
    pub fn for_count(count: usize) -> Option<Self> {
        let count = u32::try_from(count).ok()?;
        match count {
            0..=8 => Some(NeededRange::Between {
                min: 8 - count,
                max: 12 - count,
            }),
            9 | 10 => Some(NeededRange::Between {
                min: 10 - count,
                max: 12 - count,
            }),
            11 => Some(NeededRange::Exactly(1)),
            _ => None,
        }
    }
}

/// A one-shot channel broadcast produced by a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Announcement {
    /// Summon current squad members (notify trigger).
    Rally {
        mentions: Vec<String>,
        triggered_by: String,
    },
    /// Ask for more players (recruit trigger).
    CallForPlayers {
        needed: NeededRange,
        triggered_by: String,
    },
    /// Final roll call when a session is closed.
    Disbanded { mentions: Vec<String> },
}

/// Applies view updates to the session's backing message.
#[async_trait]
pub trait RenderSink: Send + Sync {
    /// Replace the message's visual state with `view`.
    async fn apply(&self, session: SessionId, view: &SessionView) -> Result<(), SinkError>;

    /// Remove the triggering user's reaction from the backing message
    /// (acknowledgment for consumed triggers).
    async fn clear_reaction(
        &self,
        session: SessionId,
        user: UserId,
        kind: TriggerKind,
    ) -> Result<(), SinkError>;
}

/// Posts announcements into the session's channel.
#[async_trait]
pub trait BroadcastSink: Send + Sync {
    async fn announce(
        &self,
        channel: ChannelId,
        announcement: Announcement,
    ) -> Result<(), SinkError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_needed_range_low_counts() {
        assert_eq!(
            NeededRange::for_count(0),
            Some(NeededRange::Between { min: 8, max: 12 })
        );
        assert_eq!(
            NeededRange::for_count(7),
            Some(NeededRange::Between { min: 1, max: 5 })
        );
        assert_eq!(
            NeededRange::for_count(8),
            Some(NeededRange::Between { min: 0, max: 4 })
        );
    }

    #[test]
    fn test_needed_range_mid_counts() {
        assert_eq!(
            NeededRange::for_count(9),
            Some(NeededRange::Between { min: 1, max: 3 })
        );
        assert_eq!(
            NeededRange::for_count(10),
            Some(NeededRange::Between { min: 0, max: 2 })
        );
    }

    #[test]
    fn test_needed_range_boundary() {
        assert_eq!(NeededRange::for_count(11), Some(NeededRange::Exactly(1)));
        assert_eq!(NeededRange::for_count(12), None);
        assert_eq!(NeededRange::for_count(30), None);
    }
}
