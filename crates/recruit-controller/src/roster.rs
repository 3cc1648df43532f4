//! Ordered roster state for one recruitment session.
//!
//! The roster is append-only in join order; removal is the only operation
//! that shifts entries, and it preserves the relative order of survivors.
//! Team assignment is stored as two key lists (assignment order) that are
//! always disjoint and always reference entries in the main partition.

use common::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of roster slots eligible for team assignment. Entries beyond
/// this are the reserve: displayed, never assigned.
pub const SQUAD_CAPACITY: usize = 12;

/// Stable identity key for a roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantKey {
    /// A real platform user.
    User(UserId),
    /// A synthetic filler slot, numbered by the session's dummy counter.
    Dummy(u32),
}

impl fmt::Display for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantKey::User(id) => write!(f, "user:{id}"),
            ParticipantKey::Dummy(n) => write!(f, "dummy:{n}"),
        }
    }
}

/// One roster slot.
///
/// Created on a join or dummy trigger, removed on leave or admin removal,
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub key: ParticipantKey,
    pub user_id: Option<UserId>,
    pub label: String,
    pub is_dummy: bool,
}

impl ParticipantEntry {
    /// Entry for a real platform user. The display label is resolved at
    /// render time, not stored.
    #[must_use]
    pub fn user(user_id: UserId) -> Self {
        Self {
            key: ParticipantKey::User(user_id),
            user_id: Some(user_id),
            label: String::new(),
            is_dummy: false,
        }
    }

    /// Synthetic filler entry labeled with its counter ordinal.
    #[must_use]
    pub fn dummy(ordinal: u32) -> Self {
        Self {
            key: ParticipantKey::Dummy(ordinal),
            user_id: None,
            label: format!("Dummy{ordinal}"),
            is_dummy: true,
        }
    }
}

/// Real (non-dummy) user ids among `entries`, in order.
#[must_use]
pub fn real_user_ids(entries: &[ParticipantEntry]) -> Vec<UserId> {
    entries
        .iter()
        .filter(|entry| !entry.is_dummy)
        .filter_map(|entry| entry.user_id)
        .collect()
}

/// Ordered participant list plus team assignment for one session.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<ParticipantEntry>,
    team_one: Vec<ParticipantKey>,
    team_two: Vec<ParticipantKey>,
}

impl Roster {
    /// Append `entry` unless an entry with the same key already exists.
    ///
    /// Returns whether the roster changed.
    pub fn add(&mut self, entry: ParticipantEntry) -> bool {
        if self.entries.iter().any(|existing| existing.key == entry.key) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Remove the entry with the given key, if present.
    ///
    /// On removal the key is also stripped from both team lists so the
    /// team-membership invariant holds without a separate sweep. Survivors
    /// keep their relative order.
    pub fn remove(&mut self, key: &ParticipantKey) -> Option<ParticipantEntry> {
        let index = self.entries.iter().position(|entry| entry.key == *key)?;
        let removed = self.entries.remove(index);
        self.team_one.retain(|member| member != key);
        self.team_two.retain(|member| member != key);
        Some(removed)
    }

    /// Remove the entry backed by `user`, if present.
    pub fn remove_user(&mut self, user: UserId) -> Option<ParticipantEntry> {
        self.remove(&ParticipantKey::User(user))
    }

    /// Split the roster into (main, reserve) at `capacity`, both in join
    /// order. Pure; no mutation.
    #[must_use]
    pub fn partition(&self, capacity: usize) -> (&[ParticipantEntry], &[ParticipantEntry]) {
        self.entries.split_at(capacity.min(self.entries.len()))
    }

    /// Whether `user` currently holds a roster slot.
    #[must_use]
    pub fn contains_user(&self, user: UserId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.key == ParticipantKey::User(user))
    }

    #[must_use]
    pub fn entries(&self) -> &[ParticipantEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current team assignment, in assignment order.
    #[must_use]
    pub fn teams(&self) -> (&[ParticipantKey], &[ParticipantKey]) {
        (&self.team_one, &self.team_two)
    }

    /// Replace the team assignment wholesale (confirm trigger).
    pub fn set_teams(&mut self, team_one: Vec<ParticipantKey>, team_two: Vec<ParticipantKey>) {
        self.team_one = team_one;
        self.team_two = team_two;
    }

    /// Drop the team assignment (odd-count refusal).
    pub fn clear_teams(&mut self) {
        self.team_one.clear();
        self.team_two.clear();
    }

    /// Real user ids in the main partition, in join order.
    #[must_use]
    pub fn main_real_user_ids(&self) -> Vec<UserId> {
        let (main, _) = self.partition(SQUAD_CAPACITY);
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

    fn user_entry(id: u64) -> ParticipantEntry {
        ParticipantEntry::user(UserId(id))
    }

    #[test]
    fn test_add_is_idempotent_by_key() {
        let mut roster = Roster::default();
        assert!(roster.add(user_entry(1)));
        assert!(roster.add(user_entry(2)));
        assert!(!roster.add(user_entry(1)));

        assert_eq!(roster.len(), 2);
        let keys: Vec<_> = roster.entries().iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                ParticipantKey::User(UserId(1)),
                ParticipantKey::User(UserId(2))
            ]
        );
    }

    #[test]
    fn test_remove_preserves_survivor_order() {
        let mut roster = Roster::default();
        for id in 1..=4 {
            roster.add(user_entry(id));
        }
        let removed = roster.remove_user(UserId(2)).unwrap();
        assert_eq!(removed.key, ParticipantKey::User(UserId(2)));

        let keys: Vec<_> = roster.entries().iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                ParticipantKey::User(UserId(1)),
                ParticipantKey::User(UserId(3)),
                ParticipantKey::User(UserId(4)),
            ]
        );
    }

    #[test]
    fn test_remove_strips_key_from_both_teams() {
        let mut roster = Roster::default();
        for id in 1..=4 {
            roster.add(user_entry(id));
        }
        roster.set_teams(
            vec![
                ParticipantKey::User(UserId(1)),
                ParticipantKey::User(UserId(2)),
            ],
            vec![
                ParticipantKey::User(UserId(3)),
                ParticipantKey::User(UserId(4)),
            ],
        );

        roster.remove_user(UserId(2));
        roster.remove_user(UserId(3));

        let (one, two) = roster.teams();
        assert_eq!(one, &[ParticipantKey::User(UserId(1))]);
        assert_eq!(two, &[ParticipantKey::User(UserId(4))]);
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut roster = Roster::default();
        roster.add(user_entry(1));
        assert!(roster.remove_user(UserId(9)).is_none());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_partition_sizes_and_order() {
        let mut roster = Roster::default();
        for id in 1..=15 {
            roster.add(user_entry(id));
        }

        let (main, reserve) = roster.partition(SQUAD_CAPACITY);
        assert_eq!(main.len(), 12);
        assert_eq!(reserve.len(), 3);
        assert_eq!(main.first().unwrap().key, ParticipantKey::User(UserId(1)));
        assert_eq!(
            reserve.first().unwrap().key,
            ParticipantKey::User(UserId(13))
        );
    }

    #[test]
    fn test_partition_smaller_than_capacity() {
        let mut roster = Roster::default();
        for id in 1..=5 {
            roster.add(user_entry(id));
        }
        let (main, reserve) = roster.partition(SQUAD_CAPACITY);
        assert_eq!(main.len(), 5);
        assert!(reserve.is_empty());
    }

    #[test]
    fn test_real_user_ids_skip_dummies() {
        let mut roster = Roster::default();
        roster.add(user_entry(1));
        roster.add(ParticipantEntry::dummy(1));
        roster.add(user_entry(2));

        assert_eq!(roster.all_real_user_ids(), vec![UserId(1), UserId(2)]);
    }

    #[test]
    fn test_main_real_user_ids_exclude_reserve() {
        let mut roster = Roster::default();
        for id in 1..=14 {
            roster.add(user_entry(id));
        }
        let main_ids = roster.main_real_user_ids();
        assert_eq!(main_ids.len(), 12);
        assert!(!main_ids.contains(&UserId(13)));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ParticipantKey::User(UserId(5)).to_string(), "user:5");
        assert_eq!(ParticipantKey::Dummy(3).to_string(), "dummy:3");
    }

    #[test]
    fn test_dummy_entry_label() {
        let entry = ParticipantEntry::dummy(7);
        assert_eq!(entry.label, "Dummy7");
        assert!(entry.is_dummy);
        assert!(entry.user_id.is_none());
    }
}
