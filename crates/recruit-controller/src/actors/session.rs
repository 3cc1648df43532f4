//! `SessionActor` - per-session actor that owns recruitment state.
//!
//! Each `SessionActor`:
//! - Owns all state for one tracked session (roster, team assignment,
//!   dummy counter, lifecycle flags)
//! - Serializes mutations through its mailbox: one mutation of a given
//!   session is in flight at a time, while distinct sessions proceed
//!   independently
//! - Resolves weights and runs the balancer inside the exclusive section;
//!   identity resolution, rendering and broadcasts happen after commit,
//!   outside the actor
//!
//! # Disbanded gating
//!
//! Every mutating handler checks the terminal flag first. Reaction-driven
//! mutations on a disbanded session resolve to [`PassiveOutcome::Dropped`];
//! administrative commands get an explicit `SessionClosed` error.

use super::messages::{
    CloseReport, PassiveOutcome, SessionMessage, SessionSeed, SessionSnapshot,
};
use super::metrics::{ActorType, EngineMetrics, MailboxMonitor};
use crate::balance::{balance_teams, WeightTier, WeightedParticipant};
use crate::errors::RecruitError;
use crate::resolve::WeightResolver;
use crate::roster::{ParticipantEntry, ParticipantKey, Roster, SQUAD_CAPACITY};
use crate::trigger::TriggerBindings;
use common::types::{ChannelId, GuildId, SessionId, UserId};
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Handle to a `SessionActor`.
#[derive(Clone, Debug)]
pub struct SessionActorHandle {
    sender: mpsc::Sender<SessionMessage>,
    cancel_token: CancellationToken,
    session_id: SessionId,
}

impl SessionActorHandle {
    /// Get the session id.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// A user toggled the join reaction on.
    pub async fn join(&self, user: UserId) -> Result<PassiveOutcome, RecruitError> {
        self.passive(|respond_to| SessionMessage::Join { user, respond_to })
            .await
    }

    /// A user toggled the join reaction off.
    pub async fn leave(&self, user: UserId) -> Result<PassiveOutcome, RecruitError> {
        self.passive(|respond_to| SessionMessage::Leave { user, respond_to })
            .await
    }

    /// Reveal the teams and rebalance over the current main partition.
    pub async fn reveal_teams(&self) -> Result<PassiveOutcome, RecruitError> {
        self.passive(|respond_to| SessionMessage::RevealTeams { respond_to })
            .await
    }

    /// Append the next synthetic filler participant.
    pub async fn add_dummy(&self) -> Result<PassiveOutcome, RecruitError> {
        self.passive(|respond_to| SessionMessage::AddDummy { respond_to })
            .await
    }

    /// Administrative out-of-band removal.
    pub async fn remove_participant(
        &self,
        key: ParticipantKey,
    ) -> Result<ParticipantEntry, RecruitError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SessionMessage::RemoveParticipant {
                key,
                respond_to: tx,
            })
            .await
            .map_err(|e| RecruitError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RecruitError::Internal(format!("response receive failed: {e}")))?
    }

    /// Close the session (irreversible).
    pub async fn close(&self) -> Result<CloseReport, RecruitError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SessionMessage::Close { respond_to: tx })
            .await
            .map_err(|e| RecruitError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RecruitError::Internal(format!("response receive failed: {e}")))?
    }

    /// Get the committed session state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, RecruitError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SessionMessage::GetSnapshot { respond_to: tx })
            .await
            .map_err(|e| RecruitError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RecruitError::Internal(format!("response receive failed: {e}")))
    }

    /// Cancel the session actor.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    async fn passive<F>(&self, make: F) -> Result<PassiveOutcome, RecruitError>
    where
        F: FnOnce(oneshot::Sender<PassiveOutcome>) -> SessionMessage,
    {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(make(tx))
            .await
            .map_err(|e| RecruitError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RecruitError::Internal(format!("response receive failed: {e}")))
    }
}

/// The `SessionActor` implementation.
pub struct SessionActor {
    /// Session id (= backing message id).
    session_id: SessionId,
    guild_id: GuildId,
    channel_id: ChannelId,
    title: String,
    bindings: TriggerBindings,
    /// Ordered roster plus team assignment.
    roster: Roster,
    /// Whether teams are currently shown.
    teams_visible: bool,
    /// Terminal flag; set once, never cleared.
    disbanded: bool,
    /// Monotonic dummy ordinal; never reused, even across removals.
    dummy_counter: u32,
    /// Creation timestamp (unix seconds).
    created_at: i64,
    /// Message receiver.
    receiver: mpsc::Receiver<SessionMessage>,
    /// Cancellation token (child of the registry's token).
    cancel_token: CancellationToken,
    /// Weight lookups for balancing; called inside the exclusive section.
    weight_resolver: Arc<dyn WeightResolver>,
    /// Tie-break randomness for the balancer.
    rng: StdRng,
    /// Shared engine metrics.
    metrics: Arc<EngineMetrics>,
    /// Mailbox monitor.
    mailbox: MailboxMonitor,
}

impl SessionActor {
    /// Spawn a new session actor.
    ///
    /// Returns a handle and the task join handle. The organizer from the
    /// seed, if any, is enrolled as the first participant before the actor
    /// accepts messages.
    pub fn spawn(
        session_id: SessionId,
        seed: SessionSeed,
        cancel_token: CancellationToken,
        weight_resolver: Arc<dyn WeightResolver>,
        rng: StdRng,
        metrics: Arc<EngineMetrics>,
        channel_buffer: usize,
    ) -> (SessionActorHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(channel_buffer);

        let mut roster = Roster::default();
        if let Some(organizer) = seed.organizer {
            if roster.add(ParticipantEntry::user(organizer)) {
                metrics.participant_added();
            }
        }

        let actor = Self {
            session_id,
            guild_id: seed.guild_id,
            channel_id: seed.channel_id,
            title: seed.title,
            bindings: seed.bindings,
            roster,
            teams_visible: false,
            disbanded: false,
            dummy_counter: 0,
            created_at: chrono::Utc::now().timestamp(),
            receiver,
            cancel_token: cancel_token.clone(),
            weight_resolver,
            rng,
            metrics,
            mailbox: MailboxMonitor::new(ActorType::Session, session_id.to_string()),
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = SessionActorHandle {
            sender,
            cancel_token,
            session_id,
        };

        (handle, task_handle)
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "rc.actor.session", fields(session_id = %self.session_id))]
    async fn run(mut self) {
        info!(
            target: "rc.actor.session",
            session_id = %self.session_id,
            "SessionActor started"
        );

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "rc.actor.session",
                        session_id = %self.session_id,
                        "SessionActor received cancellation signal"
                    );
                    break;
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.mailbox.record_enqueue();
                            self.handle_message(message).await;
                            self.mailbox.record_dequeue();
                            self.metrics.record_message_processed();
                        }
                        None => {
                            info!(
                                target: "rc.actor.session",
                                session_id = %self.session_id,
                                "SessionActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        // Entries die with the actor; keep the shared gauge honest.
        for _ in 0..self.roster.len() {
            self.metrics.participant_removed();
        }

        info!(
            target: "rc.actor.session",
            session_id = %self.session_id,
            participants = self.roster.len(),
            messages_processed = self.mailbox.messages_processed(),
            "SessionActor stopped"
        );
    }

    /// Handle a single message.
    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Join { user, respond_to } => {
                let outcome = self.handle_join(user);
                let _ = respond_to.send(outcome);
            }

            SessionMessage::Leave { user, respond_to } => {
                let outcome = self.handle_leave(user);
                let _ = respond_to.send(outcome);
            }

            SessionMessage::RevealTeams { respond_to } => {
                let outcome = self.handle_reveal().await;
                let _ = respond_to.send(outcome);
            }

            SessionMessage::AddDummy { respond_to } => {
                let outcome = self.handle_add_dummy();
                let _ = respond_to.send(outcome);
            }

            SessionMessage::RemoveParticipant { key, respond_to } => {
                let result = self.handle_remove_participant(&key);
                let _ = respond_to.send(result);
            }

            SessionMessage::Close { respond_to } => {
                let result = self.handle_close();
                let _ = respond_to.send(result);
            }

            SessionMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
        }
    }

    fn handle_join(&mut self, user: UserId) -> PassiveOutcome {
        if self.disbanded {
            return PassiveOutcome::Dropped;
        }

        if self.roster.add(ParticipantEntry::user(user)) {
            self.metrics.participant_added();
            debug!(
                target: "rc.actor.session",
                session_id = %self.session_id,
                user = %user,
                roster_len = self.roster.len(),
                "Participant joined"
            );
            PassiveOutcome::Applied
        } else {
            PassiveOutcome::Unchanged
        }
    }

    fn handle_leave(&mut self, user: UserId) -> PassiveOutcome {
        if self.disbanded {
            return PassiveOutcome::Dropped;
        }

        // Removal strips the key from both team lists. Deliberately no
        // rebalance here even when teams are already revealed: the
        // remaining assignment is filtered, not reshuffled.
        match self.roster.remove_user(user) {
            Some(_) => {
                self.metrics.participant_removed();
                debug!(
                    target: "rc.actor.session",
                    session_id = %self.session_id,
                    user = %user,
                    roster_len = self.roster.len(),
                    "Participant left"
                );
                PassiveOutcome::Applied
            }
            None => PassiveOutcome::Unchanged,
        }
    }

    /// Reveal teams and run a full rebalance over the current main
    /// partition, overwriting any prior assignment.
    #[instrument(skip_all, fields(session_id = %self.session_id))]
    async fn handle_reveal(&mut self) -> PassiveOutcome {
        if self.disbanded {
            return PassiveOutcome::Dropped;
        }

        self.teams_visible = true;

        let (main, _) = self.roster.partition(SQUAD_CAPACITY);
        if main.is_empty() {
            // Nothing to assign; prior teams (if any) stay as they were.
            return PassiveOutcome::Applied;
        }
        let main: Vec<ParticipantEntry> = main.to_vec();

        let mut weighted = Vec::with_capacity(main.len());
        for entry in main {
            let weight = self.resolve_weight(&entry).await;
            weighted.push(WeightedParticipant { entry, weight });
        }

        match balance_teams(weighted, &mut self.rng) {
            Some((team_one, team_two)) => {
                info!(
                    target: "rc.actor.session",
                    session_id = %self.session_id,
                    team_one = team_one.len(),
                    team_two = team_two.len(),
                    "Teams assigned"
                );
                self.roster.set_teams(team_one, team_two);
            }
            None => {
                // Odd main partition: balancing refused, assignment cleared.
                debug!(
                    target: "rc.actor.session",
                    session_id = %self.session_id,
                    "Odd participant count, teams left unassigned"
                );
                self.roster.clear_teams();
            }
        }

        PassiveOutcome::Applied
    }

    fn handle_add_dummy(&mut self) -> PassiveOutcome {
        if self.disbanded {
            return PassiveOutcome::Dropped;
        }

        self.dummy_counter += 1;
        if self.roster.add(ParticipantEntry::dummy(self.dummy_counter)) {
            self.metrics.participant_added();
        }
        debug!(
            target: "rc.actor.session",
            session_id = %self.session_id,
            ordinal = self.dummy_counter,
            "Dummy participant added"
        );
        PassiveOutcome::Applied
    }

    fn handle_remove_participant(
        &mut self,
        key: &ParticipantKey,
    ) -> Result<ParticipantEntry, RecruitError> {
        if self.disbanded {
            return Err(RecruitError::SessionClosed(self.session_id));
        }

        match self.roster.remove(key) {
            Some(entry) => {
                self.metrics.participant_removed();
                info!(
                    target: "rc.actor.session",
                    session_id = %self.session_id,
                    key = %key,
                    "Participant removed by operator"
                );
                Ok(entry)
            }
            None => Err(RecruitError::ParticipantNotFound(key.to_string())),
        }
    }

    fn handle_close(&mut self) -> Result<CloseReport, RecruitError> {
        if self.disbanded {
            return Err(RecruitError::SessionClosed(self.session_id));
        }

        self.disbanded = true;
        let member_ids = self.roster.all_real_user_ids();

        info!(
            target: "rc.actor.session",
            session_id = %self.session_id,
            members = member_ids.len(),
            "Session closed"
        );

        Ok(CloseReport { member_ids })
    }

    fn snapshot(&self) -> SessionSnapshot {
        let (team_one, team_two) = self.roster.teams();
        SessionSnapshot {
            session_id: self.session_id,
            guild_id: self.guild_id,
            channel_id: self.channel_id,
            title: self.title.clone(),
            bindings: self.bindings.clone(),
            entries: self.roster.entries().to_vec(),
            team_one: team_one.to_vec(),
            team_two: team_two.to_vec(),
            teams_visible: self.teams_visible,
            disbanded: self.disbanded,
            created_at: self.created_at,
        }
    }

    async fn resolve_weight(&self, entry: &ParticipantEntry) -> WeightTier {
        if entry.is_dummy {
            return WeightTier::default();
        }
        match entry.user_id {
            Some(user) => self.weight_resolver.weight_of(user).await,
            None => WeightTier::default(),
        }
    }
}
