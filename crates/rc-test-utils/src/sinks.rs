//! Recording sink fakes with failure injection.

use async_trait::async_trait;
use common::types::{ChannelId, SessionId, UserId};
use recruit_controller::sinks::{Announcement, BroadcastSink, RenderSink, SinkError};
use recruit_controller::trigger::TriggerKind;
use recruit_controller::view::SessionView;
use std::sync::Mutex;

/// Failure mode injected into [`RecordingRenderSink::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFailure {
    /// Report the backing message as gone (triggers eviction).
    MessageGone,
    /// Report a transient platform failure.
    Unavailable,
}

/// Render sink that records every applied view and cleared reaction.
#[derive(Debug, Default)]
pub struct RecordingRenderSink {
    views: Mutex<Vec<(SessionId, SessionView)>>,
    cleared: Mutex<Vec<(SessionId, UserId, TriggerKind)>>,
    apply_failure: Mutex<Option<RenderFailure>>,
}

impl RecordingRenderSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for subsequent `apply` calls; `None` restores
    /// normal recording.
    pub fn set_apply_failure(&self, failure: Option<RenderFailure>) {
        *self.apply_failure.lock().unwrap() = failure;
    }

    /// The most recently applied view for `session`.
    pub fn last_view(&self, session: SessionId) -> Option<SessionView> {
        self.views
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _)| *id == session)
            .map(|(_, view)| view.clone())
    }

    /// Total number of applied views across all sessions.
    pub fn view_count(&self) -> usize {
        self.views.lock().unwrap().len()
    }

    /// All cleared reactions, in order.
    pub fn cleared(&self) -> Vec<(SessionId, UserId, TriggerKind)> {
        self.cleared.lock().unwrap().clone()
    }
}

#[async_trait]
impl RenderSink for RecordingRenderSink {
    async fn apply(&self, session: SessionId, view: &SessionView) -> Result<(), SinkError> {
        match *self.apply_failure.lock().unwrap() {
            Some(RenderFailure::MessageGone) => return Err(SinkError::MessageGone),
            Some(RenderFailure::Unavailable) => {
                return Err(SinkError::Unavailable("injected failure".to_string()))
            }
            None => {}
        }
        self.views.lock().unwrap().push((session, view.clone()));
        Ok(())
    }

    async fn clear_reaction(
        &self,
        session: SessionId,
        user: UserId,
        kind: TriggerKind,
    ) -> Result<(), SinkError> {
        self.cleared.lock().unwrap().push((session, user, kind));
        Ok(())
    }
}

/// Broadcast sink that records every announcement.
#[derive(Debug, Default)]
pub struct RecordingBroadcastSink {
    announcements: Mutex<Vec<(ChannelId, Announcement)>>,
}

impl RecordingBroadcastSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All announcements posted so far, in order.
    pub fn announcements(&self) -> Vec<(ChannelId, Announcement)> {
        self.announcements.lock().unwrap().clone()
    }

    /// The most recent announcement, if any.
    pub fn last(&self) -> Option<(ChannelId, Announcement)> {
        self.announcements.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl BroadcastSink for RecordingBroadcastSink {
    async fn announce(
        &self,
        channel: ChannelId,
        announcement: Announcement,
    ) -> Result<(), SinkError> {
        self.announcements
            .lock()
            .unwrap()
            .push((channel, announcement));
        Ok(())
    }
}
