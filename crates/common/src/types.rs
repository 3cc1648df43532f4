//! Identifier newtypes for Scrim Herald components.
//!
//! All platform identifiers are snowflake-style `u64` values issued by the
//! chat platform. Newtypes keep a session id from being confused with the
//! user id that triggered it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a recruitment session.
///
/// This is the id of the message the session is attached to, and the only
/// handle operators ever see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UserId {
    /// Raw mention markup for this user, used as the display fallback when
    /// identity resolution is unavailable.
    #[must_use]
    pub fn raw_mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

/// Unique identifier for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a guild (server).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuildId(pub u64);

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_raw_value() {
        assert_eq!(SessionId(42).to_string(), "42");
        assert_eq!(UserId(7).to_string(), "7");
    }

    #[test]
    fn test_raw_mention_format() {
        assert_eq!(UserId(123_456).raw_mention(), "<@123456>");
    }

    #[test]
    fn test_ids_serialize_transparently_enough() {
        let id = SessionId(99);
        let json = serde_json::to_string(&id).unwrap();
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
