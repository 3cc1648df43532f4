//! Event dispatcher: typed trigger events in, committed state plus side
//! effects out.
//!
//! The dispatcher routes each event to the owning session actor, which
//! serializes the mutation. Everything that talks to the platform -
//! identity resolution, rendering, broadcasts, reaction acknowledgment -
//! happens here, after the mutation has committed, against a freshly read
//! snapshot. A failing external call aborts the remaining side effects of
//! that one event; the committed mutation is never rolled back.

use crate::actors::messages::{PassiveOutcome, SessionSeed};
use crate::actors::registry::SessionRegistryHandle;
use crate::actors::session::SessionActorHandle;
use crate::errors::RecruitError;
use crate::resolve::{display_map, IdentityResolver};
use crate::roster::ParticipantKey;
use crate::sinks::{Announcement, BroadcastSink, NeededRange, RenderSink, SinkError};
use crate::trigger::TriggerKind;
use crate::view::build_view;
use common::types::{ChannelId, SessionId, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

/// A reaction toggle forwarded by the platform gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionEvent {
    pub session_id: SessionId,
    /// The user whose reaction changed.
    pub actor: UserId,
    pub kind: TriggerKind,
    /// `true` for reaction-add, `false` for reaction-remove.
    pub added: bool,
}

/// Structured administrative commands from the command surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Remove a participant out-of-band.
    RemoveParticipant {
        session_id: SessionId,
        target: ParticipantKey,
    },
    /// Close the session (irreversible).
    Close { session_id: SessionId },
}

/// Routes trigger events through the session actors and performs the
/// post-commit platform side effects.
#[derive(Clone)]
pub struct EventDispatcher {
    registry: SessionRegistryHandle,
    identity: Arc<dyn IdentityResolver>,
    render: Arc<dyn RenderSink>,
    broadcast: Arc<dyn BroadcastSink>,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(
        registry: SessionRegistryHandle,
        identity: Arc<dyn IdentityResolver>,
        render: Arc<dyn RenderSink>,
        broadcast: Arc<dyn BroadcastSink>,
    ) -> Self {
        Self {
            registry,
            identity,
            render,
            broadcast,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SessionRegistryHandle {
        &self.registry
    }

    /// Start tracking a session and render its initial view.
    pub async fn open_session(
        &self,
        session_id: SessionId,
        seed: SessionSeed,
    ) -> Result<(), RecruitError> {
        self.registry.create_session(session_id, seed).await?;
        self.render_latest(session_id).await;
        Ok(())
    }

    /// Handle one reaction toggle.
    ///
    /// Returns `Err` only for routing failures (unknown session, actor
    /// channel breakage); sink failures are absorbed here.
    pub async fn handle_reaction(&self, event: ReactionEvent) -> Result<(), RecruitError> {
        let session = self.registry.session(event.session_id).await?;

        debug!(
            target: "rc.dispatch",
            session_id = %event.session_id,
            actor = %event.actor,
            kind = event.kind.as_str(),
            added = event.added,
            "Handling reaction event"
        );

        match (event.kind, event.added) {
            (TriggerKind::Join, true) => {
                if session.join(event.actor).await? == PassiveOutcome::Applied {
                    self.render_latest(event.session_id).await;
                }
            }

            (TriggerKind::Join, false) => {
                if session.leave(event.actor).await? == PassiveOutcome::Applied {
                    self.render_latest(event.session_id).await;
                }
            }

            (TriggerKind::Confirm, true) => {
                if session.reveal_teams().await? == PassiveOutcome::Applied {
                    self.render_latest(event.session_id).await;
                }
            }

            (TriggerKind::Dummy, true) => {
                if session.add_dummy().await? == PassiveOutcome::Applied {
                    self.render_latest(event.session_id).await;
                }
            }

            (TriggerKind::Notify, true) => {
                self.handle_notify(event, &session).await?;
            }

            (TriggerKind::Recruit, true) => {
                self.handle_recruit(event, &session).await?;
            }

            // Removing the confirm reaction is meaningless, and removals
            // of consumed reactions are echoes of our own cleanup.
            (TriggerKind::Confirm | TriggerKind::Dummy, false)
            | (TriggerKind::Notify | TriggerKind::Recruit, false) => {}
        }

        // Consumed triggers are acknowledged unconditionally, dropped-on-
        // disbanded included.
        if event.added && event.kind.is_consumed() {
            self.acknowledge(event).await;
        }

        Ok(())
    }

    /// Handle a structured administrative command.
    ///
    /// Unlike reaction triggers, failures here are user-facing: the caller
    /// echoes `RecruitError::user_message` back to the operator.
    pub async fn handle_admin(&self, command: AdminCommand) -> Result<(), RecruitError> {
        match command {
            AdminCommand::RemoveParticipant { session_id, target } => {
                let session = self.registry.session(session_id).await?;
                let removed = session.remove_participant(target).await?;
                debug!(
                    target: "rc.dispatch",
                    session_id = %session_id,
                    key = %removed.key,
                    "Participant removed by admin command"
                );
                self.render_latest(session_id).await;
                Ok(())
            }

            AdminCommand::Close { session_id } => {
                let session = self.registry.session(session_id).await?;
                let report = session.close().await?;

                // Final roll call before the closed view goes out.
                if !report.member_ids.is_empty() {
                    if let Ok(snapshot) = session.snapshot().await {
                        let mentions = self.identity.display_mentions(&report.member_ids).await;
                        self.announce(snapshot.channel_id, Announcement::Disbanded { mentions })
                            .await;
                    }
                }

                self.render_latest(session_id).await;
                Ok(())
            }
        }
    }

    /// Notify trigger: summon the current main-partition members.
    async fn handle_notify(
        &self,
        event: ReactionEvent,
        session: &SessionActorHandle,
    ) -> Result<(), RecruitError> {
        let snapshot = session.snapshot().await?;
        if snapshot.disbanded {
            return Ok(());
        }

        let member_ids = snapshot.main_real_user_ids();
        if member_ids.is_empty() {
            return Ok(());
        }

        let mentions = self.identity.display_mentions(&member_ids).await;
        let triggered_by = self.identity.display_mention(event.actor).await;
        self.announce(
            snapshot.channel_id,
            Announcement::Rally {
                mentions,
                triggered_by,
            },
        )
        .await;

        Ok(())
    }

    /// Recruit trigger: broadcast how many more players are needed.
    async fn handle_recruit(
        &self,
        event: ReactionEvent,
        session: &SessionActorHandle,
    ) -> Result<(), RecruitError> {
        let snapshot = session.snapshot().await?;
        if snapshot.disbanded {
            return Ok(());
        }

        let count = snapshot.main_real_user_ids().len();
        let Some(needed) = NeededRange::for_count(count) else {
            // Squad is full: nothing to send.
            return Ok(());
        };

        let triggered_by = self.identity.display_mention(event.actor).await;
        self.announce(
            snapshot.channel_id,
            Announcement::CallForPlayers {
                needed,
                triggered_by,
            },
        )
        .await;

        Ok(())
    }

    /// Re-derive the view from the latest committed state and push it to
    /// the render sink.
    ///
    /// A report that the backing message is gone evicts the session; other
    /// failures are logged and dropped. A render reflecting state slightly
    /// newer than the triggering event is the expected outcome.
    async fn render_latest(&self, session_id: SessionId) {
        let Ok(session) = self.registry.session(session_id).await else {
            return;
        };
        let Ok(snapshot) = session.snapshot().await else {
            return;
        };

        let displays = display_map(self.identity.as_ref(), &snapshot.all_real_user_ids()).await;
        let view = build_view(&snapshot, &displays);

        match self.render.apply(session_id, &view).await {
            Ok(()) => {}
            Err(SinkError::MessageGone) => {
                warn!(
                    target: "rc.dispatch",
                    session_id = %session_id,
                    "Backing message gone, evicting session"
                );
                if let Err(err) = self.registry.evict_session(session_id).await {
                    debug!(
                        target: "rc.dispatch",
                        session_id = %session_id,
                        error = %err,
                        "Eviction after lost message failed"
                    );
                }
            }
            Err(SinkError::Unavailable(reason)) => {
                warn!(
                    target: "rc.dispatch",
                    session_id = %session_id,
                    reason = %reason,
                    "Render sink unavailable, view update dropped"
                );
            }
        }
    }

    /// Clear the triggering reaction (acknowledgment for consumed
    /// triggers). Best effort.
    async fn acknowledge(&self, event: ReactionEvent) {
        if let Err(err) = self
            .render
            .clear_reaction(event.session_id, event.actor, event.kind)
            .await
        {
            debug!(
                target: "rc.dispatch",
                session_id = %event.session_id,
                actor = %event.actor,
                kind = event.kind.as_str(),
                error = %err,
                "Failed to clear triggering reaction"
            );
        }
    }

    /// Post an announcement, logging and swallowing failures.
    async fn announce(&self, channel: ChannelId, announcement: Announcement) {
        if let Err(err) = self.broadcast.announce(channel, announcement).await {
            warn!(
                target: "rc.dispatch",
                channel = %channel,
                error = %err,
                "Broadcast failed, announcement dropped"
            );
        }
    }
}
