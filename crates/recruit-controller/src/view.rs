//! View model derivation: committed session state to render-sink payload.
//!
//! Derivation is pure. Display mentions are resolved by the caller before
//! this step; the builder only arranges lines. Team membership is filtered
//! to the current main partition here, so a stale key can never surface in
//! a team line even if it lingers in the snapshot.

use crate::actors::messages::SessionSnapshot;
use crate::roster::{ParticipantEntry, ParticipantKey};
use common::types::UserId;
use serde::Serialize;
use std::collections::HashMap;

/// Renderable projection of one session, as handed to the render sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Free-text title from the initiating command.
    pub title: String,
    /// Operator-facing session handle, always rendered under the title.
    pub id_tag: String,
    /// Whether the session has been closed (render sinks mark the message
    /// accordingly).
    pub closed: bool,
    /// Numbered main-partition lines, join order.
    pub participant_lines: Vec<String>,
    /// Numbered reserve lines; numbering continues after the main
    /// partition.
    pub reserve_lines: Vec<String>,
    /// Team lines, present only once teams have been revealed.
    pub team_one_lines: Option<Vec<String>>,
    pub team_two_lines: Option<Vec<String>>,
}

/// Build the view for `snapshot` using resolved display mentions.
#[must_use]
pub fn build_view(snapshot: &SessionSnapshot, displays: &HashMap<UserId, String>) -> SessionView {
    let (main, reserve) = snapshot.partition();

    let participant_lines = numbered_lines(main, 1, displays);
    let reserve_lines = numbered_lines(reserve, main.len() + 1, displays);

    let (team_one_lines, team_two_lines) = if snapshot.teams_visible {
        (
            Some(team_lines(&snapshot.team_one, main, displays)),
            Some(team_lines(&snapshot.team_two, main, displays)),
        )
    } else {
        (None, None)
    };

    SessionView {
        title: snapshot.title.clone(),
        id_tag: format!("ID: {}", snapshot.session_id),
        closed: snapshot.disbanded,
        participant_lines,
        reserve_lines,
        team_one_lines,
        team_two_lines,
    }
}

fn display_for(entry: &ParticipantEntry, displays: &HashMap<UserId, String>) -> String {
    if entry.is_dummy {
        return entry.label.clone();
    }
    match entry.user_id {
        Some(user) => displays
            .get(&user)
            .cloned()
            .unwrap_or_else(|| user.raw_mention()),
        None => entry.label.clone(),
    }
}

fn numbered_lines(
    entries: &[ParticipantEntry],
    start_index: usize,
    displays: &HashMap<UserId, String>,
) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(offset, entry)| format!("{}. {}", start_index + offset, display_for(entry, displays)))
        .collect()
}

/// Team lines in assignment order, restricted to keys still present in the
/// main partition.
fn team_lines(
    keys: &[ParticipantKey],
    main: &[ParticipantEntry],
    displays: &HashMap<UserId, String>,
) -> Vec<String> {
    keys.iter()
        .filter_map(|key| main.iter().find(|entry| entry.key == *key))
        .map(|entry| display_for(entry, displays))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::trigger::TriggerBindings;
    use common::types::{ChannelId, GuildId, SessionId};

    fn base_snapshot() -> SessionSnapshot {
        SessionSnapshot {
            session_id: SessionId(900),
            guild_id: GuildId(1),
            channel_id: ChannelId(2),
            title: "friday scrim".to_string(),
            bindings: TriggerBindings::default(),
            entries: Vec::new(),
            team_one: Vec::new(),
            team_two: Vec::new(),
            teams_visible: false,
            disbanded: false,
            created_at: 0,
        }
    }

    fn displays(pairs: &[(u64, &str)]) -> HashMap<UserId, String> {
        pairs
            .iter()
            .map(|(id, name)| (UserId(*id), (*name).to_string()))
            .collect()
    }

    #[test]
    fn test_numbering_continues_into_reserve() {
        let mut snapshot = base_snapshot();
        snapshot.entries = (1..=13).map(|id| ParticipantEntry::user(UserId(id))).collect();

        let view = build_view(&snapshot, &HashMap::new());
        assert_eq!(view.participant_lines.len(), 12);
        assert_eq!(view.reserve_lines, vec!["13. <@13>".to_string()]);
        assert_eq!(view.participant_lines.first().unwrap(), "1. <@1>");
    }

    #[test]
    fn test_resolved_names_and_fallback() {
        let mut snapshot = base_snapshot();
        snapshot.entries = vec![
            ParticipantEntry::user(UserId(1)),
            ParticipantEntry::user(UserId(2)),
        ];

        let view = build_view(&snapshot, &displays(&[(1, "@alice")]));
        assert_eq!(view.participant_lines, vec!["1. @alice", "2. <@2>"]);
    }

    #[test]
    fn test_dummy_entries_use_their_label() {
        let mut snapshot = base_snapshot();
        snapshot.entries = vec![
            ParticipantEntry::user(UserId(1)),
            ParticipantEntry::dummy(2),
        ];

        let view = build_view(&snapshot, &HashMap::new());
        assert_eq!(view.participant_lines, vec!["1. <@1>", "2. Dummy2"]);
    }

    #[test]
    fn test_team_lines_hidden_until_visible() {
        let mut snapshot = base_snapshot();
        snapshot.entries = vec![ParticipantEntry::user(UserId(1))];
        let view = build_view(&snapshot, &HashMap::new());
        assert!(view.team_one_lines.is_none());
        assert!(view.team_two_lines.is_none());
    }

    #[test]
    fn test_team_lines_filtered_to_main_partition() {
        let mut snapshot = base_snapshot();
        snapshot.entries = vec![
            ParticipantEntry::user(UserId(1)),
            ParticipantEntry::user(UserId(2)),
        ];
        snapshot.teams_visible = true;
        snapshot.team_one = vec![
            ParticipantKey::User(UserId(1)),
            // Departed member whose key was never re-derived.
            ParticipantKey::User(UserId(99)),
        ];
        snapshot.team_two = vec![ParticipantKey::User(UserId(2))];

        let view = build_view(&snapshot, &HashMap::new());
        assert_eq!(view.team_one_lines.unwrap(), vec!["<@1>"]);
        assert_eq!(view.team_two_lines.unwrap(), vec!["<@2>"]);
    }

    #[test]
    fn test_id_tag_and_closed_flag() {
        let mut snapshot = base_snapshot();
        snapshot.disbanded = true;
        let view = build_view(&snapshot, &HashMap::new());
        assert_eq!(view.id_tag, "ID: 900");
        assert!(view.closed);
    }

    #[test]
    fn test_view_serializes() {
        let view = build_view(&base_snapshot(), &HashMap::new());
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"id_tag\":\"ID: 900\""));
    }
}
