//! Message types for actor communication.
//!
//! All inter-actor communication uses strongly-typed message passing via
//! `tokio::sync::mpsc`. Request-reply uses `tokio::sync::oneshot`.

use super::session::SessionActorHandle;
use crate::errors::RecruitError;
use crate::roster::{real_user_ids, ParticipantEntry, ParticipantKey, SQUAD_CAPACITY};
use crate::trigger::TriggerBindings;
use common::types::{ChannelId, GuildId, SessionId, UserId};
use tokio::sync::oneshot;

/// Messages sent to `SessionRegistryActor`.
#[derive(Debug)]
pub enum RegistryMessage {
    /// Start tracking a session under the given message id.
    CreateSession {
        session_id: SessionId,
        seed: SessionSeed,
        /// Response channel for confirmation or conflict.
        respond_to: oneshot::Sender<Result<(), RecruitError>>,
    },

    /// Get a handle to a tracked session.
    GetSession {
        session_id: SessionId,
        respond_to: oneshot::Sender<Result<SessionActorHandle, RecruitError>>,
    },

    /// Drop a session whose backing message is confirmed gone.
    EvictSession {
        session_id: SessionId,
        respond_to: oneshot::Sender<Result<(), RecruitError>>,
    },

    /// Get current registry status (for health checks).
    GetStatus {
        respond_to: oneshot::Sender<RegistryStatus>,
    },

    /// Initiate graceful shutdown.
    Shutdown {
        respond_to: oneshot::Sender<Result<(), RecruitError>>,
    },
}

/// Initial state for a newly tracked session.
#[derive(Debug, Clone)]
pub struct SessionSeed {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    /// Free-text title from the initiating command.
    pub title: String,
    /// Reaction symbols the platform managed to attach to the message.
    pub bindings: TriggerBindings,
    /// The organizer, pre-enrolled as the first participant.
    pub organizer: Option<UserId>,
}

/// Messages sent to `SessionActor`.
#[derive(Debug)]
pub enum SessionMessage {
    /// A user toggled the join reaction on.
    Join {
        user: UserId,
        respond_to: oneshot::Sender<PassiveOutcome>,
    },

    /// A user toggled the join reaction off.
    Leave {
        user: UserId,
        respond_to: oneshot::Sender<PassiveOutcome>,
    },

    /// Reveal the teams and rebalance over the current main partition.
    RevealTeams {
        respond_to: oneshot::Sender<PassiveOutcome>,
    },

    /// Append the next synthetic filler participant.
    AddDummy {
        respond_to: oneshot::Sender<PassiveOutcome>,
    },

    /// Administrative out-of-band removal.
    RemoveParticipant {
        key: ParticipantKey,
        respond_to: oneshot::Sender<Result<ParticipantEntry, RecruitError>>,
    },

    /// Close the session (irreversible).
    Close {
        respond_to: oneshot::Sender<Result<CloseReport, RecruitError>>,
    },

    /// Get the committed session state.
    GetSnapshot {
        respond_to: oneshot::Sender<SessionSnapshot>,
    },
}

/// Result of a reaction-driven mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassiveOutcome {
    /// State changed; the view should be re-rendered.
    Applied,
    /// Idempotent no-op (duplicate join, leave by a non-participant).
    Unchanged,
    /// Silently dropped because the session is disbanded.
    Dropped,
}

/// Outcome of closing a session.
#[derive(Debug, Clone)]
pub struct CloseReport {
    /// Real members at close time (reserve included), for the final roll
    /// call broadcast.
    pub member_ids: Vec<UserId>,
}

/// Status of the `SessionRegistryActor`.
#[derive(Debug, Clone)]
pub struct RegistryStatus {
    /// Sessions currently tracked.
    pub session_count: usize,
    /// Whether the registry refuses new sessions.
    pub is_draining: bool,
    /// Current registry mailbox depth.
    pub mailbox_depth: usize,
}

/// Committed state of one session.
///
/// Handed out for view derivation and for the read-only notify/recruit
/// triggers; always re-read after a mutation so side effects never act on
/// state captured earlier in the handler.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub title: String,
    pub bindings: TriggerBindings,
    /// Roster in join order.
    pub entries: Vec<ParticipantEntry>,
    /// Team key lists in assignment order.
    pub team_one: Vec<ParticipantKey>,
    pub team_two: Vec<ParticipantKey>,
    pub teams_visible: bool,
    pub disbanded: bool,
    /// Creation timestamp (unix seconds).
    pub created_at: i64,
}

impl SessionSnapshot {
    /// Main partition (first [`SQUAD_CAPACITY`] entries) and reserve.
    #[must_use]
    pub fn partition(&self) -> (&[ParticipantEntry], &[ParticipantEntry]) {
        self.entries
            .split_at(SQUAD_CAPACITY.min(self.entries.len()))
    }

    /// Real user ids in the main partition, in join order.
    #[must_use]
    pub fn main_real_user_ids(&self) -> Vec<UserId> {
        let (main, _) = self.partition();
        real_user_ids(main)
    }

    /// Real user ids across the whole roster, reserve included.
    #[must_use]
    pub fn all_real_user_ids(&self) -> Vec<UserId> {
        real_user_ids(&self.entries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn snapshot_with_users(count: u64) -> SessionSnapshot {
        SessionSnapshot {
            session_id: SessionId(1),
            guild_id: GuildId(2),
            channel_id: ChannelId(3),
            title: "scrim".to_string(),
            bindings: TriggerBindings::default(),
            entries: (1..=count)
                .map(|id| ParticipantEntry::user(UserId(id)))
                .collect(),
            team_one: Vec::new(),
            team_two: Vec::new(),
            teams_visible: false,
            disbanded: false,
            created_at: 0,
        }
    }

    #[test]
    fn test_snapshot_partition_caps_main() {
        let snapshot = snapshot_with_users(14);
        let (main, reserve) = snapshot.partition();
        assert_eq!(main.len(), 12);
        assert_eq!(reserve.len(), 2);
    }

    #[test]
    fn test_snapshot_main_real_ids() {
        let mut snapshot = snapshot_with_users(3);
        snapshot.entries.push(ParticipantEntry::dummy(1));
        assert_eq!(
            snapshot.main_real_user_ids(),
            vec![UserId(1), UserId(2), UserId(3)]
        );
        assert_eq!(snapshot.all_real_user_ids().len(), 3);
    }

    #[test]
    fn test_passive_outcome_equality() {
        assert_eq!(PassiveOutcome::Applied, PassiveOutcome::Applied);
        assert_ne!(PassiveOutcome::Applied, PassiveOutcome::Dropped);
    }
}
