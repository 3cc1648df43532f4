//! `SessionRegistryActor` - singleton supervisor for session actors.
//!
//! The registry is the top-level actor:
//!
//! - Guarantees at most one live session actor per message id
//! - Hands out session handles to the dispatcher
//! - Evicts sessions whose backing message is confirmed gone
//! - Owns the root `CancellationToken` for graceful shutdown
//! - Monitors child actor health (panic detection via `JoinHandle`)
//!
//! The registry never interprets roster contents; that is the session
//! actor's business.

use super::messages::{RegistryMessage, RegistryStatus, SessionSeed};
use super::metrics::{ActorType, EngineMetrics, MailboxMonitor};
use super::session::{SessionActor, SessionActorHandle};
use crate::config::Config;
use crate::errors::RecruitError;
use crate::resolve::WeightResolver;
use common::types::SessionId;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Handle to the `SessionRegistryActor`.
///
/// This is the public interface for interacting with the registry. All
/// methods are async and return results via oneshot channels.
#[derive(Clone)]
pub struct SessionRegistryHandle {
    sender: mpsc::Sender<RegistryMessage>,
    cancel_token: CancellationToken,
}

impl SessionRegistryHandle {
    /// Create a new `SessionRegistryActor` and return a handle to it.
    ///
    /// This spawns the actor task and returns immediately.
    #[must_use]
    pub fn new(
        config: &Config,
        weight_resolver: Arc<dyn WeightResolver>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.registry_channel_buffer);
        let cancel_token = CancellationToken::new();

        let actor = SessionRegistryActor::new(
            config,
            receiver,
            cancel_token.clone(),
            weight_resolver,
            metrics,
        );

        tokio::spawn(actor.run());

        Self {
            sender,
            cancel_token,
        }
    }

    /// Start tracking a session under the given message id.
    pub async fn create_session(
        &self,
        session_id: SessionId,
        seed: SessionSeed,
    ) -> Result<(), RecruitError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::CreateSession {
                session_id,
                seed,
                respond_to: tx,
            })
            .await
            .map_err(|e| RecruitError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RecruitError::Internal(format!("response receive failed: {e}")))?
    }

    /// Get a handle to a tracked session.
    pub async fn session(&self, session_id: SessionId) -> Result<SessionActorHandle, RecruitError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::GetSession {
                session_id,
                respond_to: tx,
            })
            .await
            .map_err(|e| RecruitError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RecruitError::Internal(format!("response receive failed: {e}")))?
    }

    /// Drop a session whose backing message is confirmed gone.
    pub async fn evict_session(&self, session_id: SessionId) -> Result<(), RecruitError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::EvictSession {
                session_id,
                respond_to: tx,
            })
            .await
            .map_err(|e| RecruitError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RecruitError::Internal(format!("response receive failed: {e}")))?
    }

    /// Get the current registry status.
    pub async fn status(&self) -> Result<RegistryStatus, RecruitError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::GetStatus { respond_to: tx })
            .await
            .map_err(|e| RecruitError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RecruitError::Internal(format!("response receive failed: {e}")))
    }

    /// Initiate graceful shutdown.
    pub async fn shutdown(&self) -> Result<(), RecruitError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::Shutdown { respond_to: tx })
            .await
            .map_err(|e| RecruitError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| RecruitError::Internal(format!("response receive failed: {e}")))?
    }

    /// Cancel the actor (for immediate shutdown).
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Internal state for a managed session.
struct ManagedSession {
    /// Handle to the session actor.
    handle: SessionActorHandle,
    /// Join handle for monitoring the actor task.
    task_handle: JoinHandle<()>,
}

/// The `SessionRegistryActor` implementation.
pub struct SessionRegistryActor {
    /// Controller instance id (log correlation).
    instance_id: String,
    /// Message receiver.
    receiver: mpsc::Receiver<RegistryMessage>,
    /// Cancellation token (root).
    cancel_token: CancellationToken,
    /// Managed sessions by id.
    sessions: HashMap<SessionId, ManagedSession>,
    /// Whether the registry is accepting new sessions.
    accepting_new: bool,
    /// Weight lookups, shared with every session actor.
    weight_resolver: Arc<dyn WeightResolver>,
    /// Mailbox capacity for spawned session actors.
    session_channel_buffer: usize,
    /// Fixed balancer seed; `None` seeds each session from entropy.
    balance_seed: Option<u64>,
    /// Shared metrics.
    metrics: Arc<EngineMetrics>,
    /// Mailbox monitor.
    mailbox: MailboxMonitor,
}

impl SessionRegistryActor {
    /// Create a new registry actor (not started).
    fn new(
        config: &Config,
        receiver: mpsc::Receiver<RegistryMessage>,
        cancel_token: CancellationToken,
        weight_resolver: Arc<dyn WeightResolver>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        let mailbox = MailboxMonitor::new(ActorType::Registry, config.instance_id.clone());

        Self {
            instance_id: config.instance_id.clone(),
            receiver,
            cancel_token,
            sessions: HashMap::new(),
            accepting_new: true,
            weight_resolver,
            session_channel_buffer: config.session_channel_buffer,
            balance_seed: config.balance_seed,
            metrics,
            mailbox,
        }
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "rc.actor.registry", fields(instance_id = %self.instance_id))]
    async fn run(mut self) {
        info!(
            target: "rc.actor.registry",
            instance_id = %self.instance_id,
            "SessionRegistryActor started"
        );

        loop {
            // Check for terminated session actors
            self.check_session_health().await;

            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "rc.actor.registry",
                        instance_id = %self.instance_id,
                        "SessionRegistryActor received cancellation signal"
                    );
                    self.graceful_shutdown().await;
                    break;
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.mailbox.record_enqueue();
                            self.handle_message(message);
                            self.mailbox.record_dequeue();
                            self.metrics.record_message_processed();
                        }
                        None => {
                            info!(
                                target: "rc.actor.registry",
                                instance_id = %self.instance_id,
                                "SessionRegistryActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "rc.actor.registry",
            instance_id = %self.instance_id,
            sessions_remaining = self.sessions.len(),
            messages_processed = self.mailbox.messages_processed(),
            "SessionRegistryActor stopped"
        );
    }

    /// Handle a single message.
    fn handle_message(&mut self, message: RegistryMessage) {
        match message {
            RegistryMessage::CreateSession {
                session_id,
                seed,
                respond_to,
            } => {
                let result = self.create_session(session_id, seed);
                let _ = respond_to.send(result);
            }

            RegistryMessage::GetSession {
                session_id,
                respond_to,
            } => {
                let result = self.get_session(session_id);
                let _ = respond_to.send(result);
            }

            RegistryMessage::EvictSession {
                session_id,
                respond_to,
            } => {
                let result = self.evict_session(session_id);
                let _ = respond_to.send(result);
            }

            RegistryMessage::GetStatus { respond_to } => {
                let _ = respond_to.send(self.get_status());
            }

            RegistryMessage::Shutdown { respond_to } => {
                let result = self.initiate_shutdown();
                let _ = respond_to.send(result);
            }
        }
    }

    /// Create a new session actor.
    fn create_session(
        &mut self,
        session_id: SessionId,
        seed: SessionSeed,
    ) -> Result<(), RecruitError> {
        if !self.accepting_new {
            return Err(RecruitError::Draining);
        }

        if self.sessions.contains_key(&session_id) {
            return Err(RecruitError::Conflict(
                "A session is already tracked for this message".to_string(),
            ));
        }

        debug!(
            target: "rc.actor.registry",
            instance_id = %self.instance_id,
            session_id = %session_id,
            "Creating new session actor"
        );

        let session_token = self.cancel_token.child_token();
        let rng = match self.balance_seed {
            Some(fixed) => StdRng::seed_from_u64(fixed),
            None => StdRng::from_entropy(),
        };

        let (handle, task_handle) = SessionActor::spawn(
            session_id,
            seed,
            session_token,
            Arc::clone(&self.weight_resolver),
            rng,
            Arc::clone(&self.metrics),
            self.session_channel_buffer,
        );

        self.sessions.insert(
            session_id,
            ManagedSession {
                handle,
                task_handle,
            },
        );

        self.metrics.session_created();

        info!(
            target: "rc.actor.registry",
            instance_id = %self.instance_id,
            session_id = %session_id,
            total_sessions = self.sessions.len(),
            "Session actor created"
        );

        Ok(())
    }

    /// Get a handle to a tracked session.
    fn get_session(&self, session_id: SessionId) -> Result<SessionActorHandle, RecruitError> {
        self.sessions
            .get(&session_id)
            .map(|managed| managed.handle.clone())
            .ok_or(RecruitError::SessionNotFound(session_id))
    }

    /// Evict a session.
    ///
    /// Initiates removal but does not block waiting for the session actor
    /// task to finish; cleanup is spawned as a background task so the
    /// message loop stays responsive.
    fn evict_session(&mut self, session_id: SessionId) -> Result<(), RecruitError> {
        match self.sessions.remove(&session_id) {
            Some(managed) => {
                debug!(
                    target: "rc.actor.registry",
                    instance_id = %self.instance_id,
                    session_id = %session_id,
                    "Evicting session actor"
                );

                managed.handle.cancel();

                let instance_id = self.instance_id.clone();
                tokio::spawn(async move {
                    match tokio::time::timeout(Duration::from_secs(5), managed.task_handle).await {
                        Ok(Ok(())) => {
                            debug!(
                                target: "rc.actor.registry",
                                instance_id = %instance_id,
                                session_id = %session_id,
                                "Session actor task completed cleanly"
                            );
                        }
                        Ok(Err(e)) => {
                            warn!(
                                target: "rc.actor.registry",
                                instance_id = %instance_id,
                                session_id = %session_id,
                                error = ?e,
                                "Session actor task panicked during eviction"
                            );
                        }
                        Err(_) => {
                            warn!(
                                target: "rc.actor.registry",
                                instance_id = %instance_id,
                                session_id = %session_id,
                                "Session actor task cleanup timed out"
                            );
                        }
                    }
                });

                self.metrics.session_removed();

                info!(
                    target: "rc.actor.registry",
                    instance_id = %self.instance_id,
                    session_id = %session_id,
                    total_sessions = self.sessions.len(),
                    "Session evicted"
                );

                Ok(())
            }
            None => Err(RecruitError::SessionNotFound(session_id)),
        }
    }

    /// Get current registry status.
    fn get_status(&self) -> RegistryStatus {
        RegistryStatus {
            session_count: self.sessions.len(),
            is_draining: !self.accepting_new,
            mailbox_depth: self.mailbox.current_depth(),
        }
    }

    /// Initiate graceful shutdown.
    fn initiate_shutdown(&mut self) -> Result<(), RecruitError> {
        info!(
            target: "rc.actor.registry",
            instance_id = %self.instance_id,
            session_count = self.sessions.len(),
            "Initiating graceful shutdown"
        );

        self.accepting_new = false;
        self.cancel_token.cancel();

        Ok(())
    }

    /// Perform graceful shutdown.
    async fn graceful_shutdown(&mut self) {
        info!(
            target: "rc.actor.registry",
            instance_id = %self.instance_id,
            session_count = self.sessions.len(),
            "Performing graceful shutdown"
        );

        self.accepting_new = false;

        // Cancel all session actors (already done via the parent token,
        // but be explicit)
        for managed in self.sessions.values() {
            managed.handle.cancel();
        }

        for (session_id, managed) in self.sessions.drain() {
            match tokio::time::timeout(Duration::from_secs(5), managed.task_handle).await {
                Ok(Ok(())) => {
                    debug!(
                        target: "rc.actor.registry",
                        instance_id = %self.instance_id,
                        session_id = %session_id,
                        "Session actor completed cleanly"
                    );
                }
                Ok(Err(e)) => {
                    warn!(
                        target: "rc.actor.registry",
                        instance_id = %self.instance_id,
                        session_id = %session_id,
                        error = ?e,
                        "Session actor task panicked during shutdown"
                    );
                }
                Err(_) => {
                    warn!(
                        target: "rc.actor.registry",
                        instance_id = %self.instance_id,
                        session_id = %session_id,
                        "Session actor shutdown timed out"
                    );
                }
            }
        }

        info!(
            target: "rc.actor.registry",
            instance_id = %self.instance_id,
            "Graceful shutdown complete"
        );
    }

    /// Check health of managed session actors.
    async fn check_session_health(&mut self) {
        let mut finished = Vec::new();

        for (session_id, managed) in &self.sessions {
            if managed.task_handle.is_finished() {
                warn!(
                    target: "rc.actor.registry",
                    instance_id = %self.instance_id,
                    session_id = %session_id,
                    "Session actor task finished unexpectedly"
                );
                finished.push(*session_id);
            }
        }

        for session_id in finished {
            if let Some(managed) = self.sessions.remove(&session_id) {
                match managed.task_handle.await {
                    Ok(()) => {
                        info!(
                            target: "rc.actor.registry",
                            instance_id = %self.instance_id,
                            session_id = %session_id,
                            "Session actor exited cleanly"
                        );
                    }
                    Err(join_error) => {
                        if join_error.is_panic() {
                            error!(
                                target: "rc.actor.registry",
                                instance_id = %self.instance_id,
                                session_id = %session_id,
                                error = ?join_error,
                                "Session actor panicked"
                            );
                            self.metrics.record_panic(ActorType::Session);
                        }
                    }
                }

                self.metrics.session_removed();
            }
        }
    }
}
