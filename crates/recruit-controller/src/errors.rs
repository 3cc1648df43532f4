//! Recruitment controller error types.
//!
//! Errors split into operator-facing rejections (validation, not-found,
//! already-closed) and internal failures. Internal details are logged
//! server-side; `user_message` produces the text safe to echo back to the
//! command issuer.

use common::types::SessionId;
use thiserror::Error;

/// Recruitment controller error type.
#[derive(Debug, Error)]
pub enum RecruitError {
    /// Malformed operator input (mention format, session id, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// No session is tracked under the given id.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// Participant not present in the roster.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    /// The session has been closed; mutating commands are refused.
    #[error("Session already closed: {0}")]
    SessionClosed(SessionId),

    /// Conflict (e.g. a session is already tracked under this id).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The registry is shutting down and refuses new sessions.
    #[error("Registry is draining")]
    Draining,

    /// Internal error (actor channel breakage and the like).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecruitError {
    /// Returns the rejection text safe to show the command issuer.
    ///
    /// Internal failures collapse to a generic message; the detail stays in
    /// the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RecruitError::Validation(msg) => msg.clone(),
            RecruitError::SessionNotFound(id) => {
                format!("No recruitment found for id {id}.")
            }
            RecruitError::ParticipantNotFound(who) => {
                format!("{who} is not on the roster.")
            }
            RecruitError::SessionClosed(_) => "This recruitment is already closed.".to_string(),
            RecruitError::Conflict(msg) => msg.clone(),
            RecruitError::Draining => "The controller is shutting down.".to_string(),
            RecruitError::Internal(_) => "An internal error occurred.".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_hide_internal_details() {
        let err = RecruitError::Internal("oneshot dropped at session 42".to_string());
        assert!(!err.user_message().contains("oneshot"));
        assert_eq!(err.user_message(), "An internal error occurred.");
    }

    #[test]
    fn test_user_message_carries_session_id() {
        let err = RecruitError::SessionNotFound(SessionId(123));
        assert!(err.user_message().contains("123"));
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(
            format!("{}", RecruitError::SessionClosed(SessionId(7))),
            "Session already closed: 7"
        );
        assert_eq!(
            format!("{}", RecruitError::Validation("bad mention".to_string())),
            "Validation error: bad mention"
        );
    }
}
