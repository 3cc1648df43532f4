//! Trigger vocabulary for reaction-driven events.
//!
//! The platform gateway translates raw reaction symbols into the closed
//! [`TriggerKind`] set before anything reaches the dispatcher, so handler
//! dispatch is an exhaustive match rather than string comparison.

use serde::{Deserialize, Serialize};

/// The closed set of reaction-driven trigger kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Toggle roster membership.
    Join,
    /// Reveal (and rebalance) the two teams.
    Confirm,
    /// Append a synthetic filler participant.
    Dummy,
    /// Summon current squad members to the channel.
    Notify,
    /// Broadcast a call for more players.
    Recruit,
}

impl TriggerKind {
    /// Whether the triggering reaction is consumed (cleared from the
    /// message) after handling instead of staying toggled.
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(
            self,
            TriggerKind::Dummy | TriggerKind::Notify | TriggerKind::Recruit
        )
    }

    /// Trigger kind as a string for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TriggerKind::Join => "join",
            TriggerKind::Confirm => "confirm",
            TriggerKind::Dummy => "dummy",
            TriggerKind::Notify => "notify",
            TriggerKind::Recruit => "recruit",
        }
    }
}

/// The reaction symbol configured for each trigger on one session's message.
///
/// `join` is always present; the others are absent when the platform
/// rejected the corresponding reaction at session creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerBindings {
    pub join: String,
    pub confirm: Option<String>,
    pub dummy: Option<String>,
    pub notify: Option<String>,
    pub recruit: Option<String>,
}

impl Default for TriggerBindings {
    fn default() -> Self {
        Self {
            join: "\u{1f44b}".to_string(),                 // 👋
            confirm: Some("\u{2694}\u{fe0f}".to_string()), // ⚔️
            dummy: Some("\u{2795}".to_string()),           // ➕
            notify: Some("\u{1f4e2}".to_string()),         // 📢
            recruit: Some("\u{267b}\u{fe0f}".to_string()), // ♻️
        }
    }
}

impl TriggerBindings {
    /// Map a raw reaction symbol to its configured trigger kind.
    #[must_use]
    pub fn kind_for(&self, symbol: &str) -> Option<TriggerKind> {
        if symbol == self.join {
            return Some(TriggerKind::Join);
        }
        let matches_opt = |binding: &Option<String>| binding.as_deref() == Some(symbol);
        if matches_opt(&self.confirm) {
            Some(TriggerKind::Confirm)
        } else if matches_opt(&self.dummy) {
            Some(TriggerKind::Dummy)
        } else if matches_opt(&self.notify) {
            Some(TriggerKind::Notify)
        } else if matches_opt(&self.recruit) {
            Some(TriggerKind::Recruit)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_consumed_kinds() {
        assert!(!TriggerKind::Join.is_consumed());
        assert!(!TriggerKind::Confirm.is_consumed());
        assert!(TriggerKind::Dummy.is_consumed());
        assert!(TriggerKind::Notify.is_consumed());
        assert!(TriggerKind::Recruit.is_consumed());
    }

    #[test]
    fn test_default_bindings_round_trip() {
        let bindings = TriggerBindings::default();
        assert_eq!(bindings.kind_for("\u{1f44b}"), Some(TriggerKind::Join));
        assert_eq!(
            bindings.kind_for("\u{2694}\u{fe0f}"),
            Some(TriggerKind::Confirm)
        );
        assert_eq!(bindings.kind_for("\u{2795}"), Some(TriggerKind::Dummy));
        assert_eq!(bindings.kind_for("\u{1f4e2}"), Some(TriggerKind::Notify));
        assert_eq!(
            bindings.kind_for("\u{267b}\u{fe0f}"),
            Some(TriggerKind::Recruit)
        );
        assert_eq!(bindings.kind_for("\u{1f389}"), None);
    }

    #[test]
    fn test_unbound_symbols_do_not_match() {
        let bindings = TriggerBindings {
            join: "+1".to_string(),
            confirm: None,
            dummy: None,
            notify: None,
            recruit: None,
        };
        assert_eq!(bindings.kind_for("+1"), Some(TriggerKind::Join));
        assert_eq!(bindings.kind_for("\u{2694}\u{fe0f}"), None);
    }
}
