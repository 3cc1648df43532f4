//! Weighted two-team balancing.
//!
//! The split is a pure function of the weighted entries and the injected
//! random source: a fixed seed reproduces the same assignment, which is how
//! the tests pin outcomes. The randomness is deliberate fairness jitter for
//! equal-weight players, not an incidental artifact.

use crate::roster::{ParticipantEntry, ParticipantKey};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Skill/priority tier used only during balancing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum WeightTier {
    /// The default tier; dummies and unresolved identities land here.
    #[default]
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl WeightTier {
    /// Numeric weight accumulated during balancing.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            WeightTier::Tier1 => 1,
            WeightTier::Tier2 => 2,
            WeightTier::Tier3 => 3,
            WeightTier::Tier4 => 4,
        }
    }

    /// Tier for a raw numeric value; anything outside 1..=4 degrades to the
    /// default tier.
    #[must_use]
    pub const fn from_value(value: u32) -> Self {
        match value {
            2 => WeightTier::Tier2,
            3 => WeightTier::Tier3,
            4 => WeightTier::Tier4,
            _ => WeightTier::Tier1,
        }
    }
}

/// Transient pairing of a roster entry with its resolved weight.
///
/// Computed on demand at balance time, never stored on the session.
#[derive(Debug, Clone)]
pub struct WeightedParticipant {
    pub entry: ParticipantEntry,
    pub weight: WeightTier,
}

/// Split weighted entries into two teams of equal size and near-equal
/// accumulated weight.
///
/// Returns `None` when the entry count is odd: balancing is refused and the
/// caller clears any prior assignment. That is a defined no-op outcome, not
/// an error.
pub fn balance_teams<R: Rng>(
    entries: Vec<WeightedParticipant>,
    rng: &mut R,
) -> Option<(Vec<ParticipantKey>, Vec<ParticipantKey>)> {
    if entries.len() % 2 != 0 {
        return None;
    }

    // Descending by weight; equal weights ordered by a draw from the
    // injected random source so the same players do not always land on the
    // same side.
    let mut sorted: Vec<(u64, WeightedParticipant)> = entries
        .into_iter()
        .map(|item| (rng.gen::<u64>(), item))
        .collect();
    sorted.sort_by(|a, b| {
        b.1.weight
            .value()
            .cmp(&a.1.weight.value())
            .then_with(|| b.0.cmp(&a.0))
    });

    let mut team_one: Vec<WeightedParticipant> = Vec::new();
    let mut team_two: Vec<WeightedParticipant> = Vec::new();
    let mut weight_one: u32 = 0;
    let mut weight_two: u32 = 0;

    // Greedy assignment to the lighter team; ties favor team one.
    for (_, item) in sorted {
        if weight_one <= weight_two {
            weight_one += item.weight.value();
            team_one.push(item);
        } else {
            weight_two += item.weight.value();
            team_two.push(item);
        }
    }

    equalize_sizes(&mut team_one, &mut team_two);

    Some((into_keys(team_one), into_keys(team_two)))
}

/// Move the lowest-weight entry from the larger team to the smaller until
/// sizes match. Terminates at equal sizes for any even total; the empty
/// check is a guard against a drained larger team.
fn equalize_sizes(team_one: &mut Vec<WeightedParticipant>, team_two: &mut Vec<WeightedParticipant>) {
    while team_one.len() != team_two.len() {
        let (larger, smaller) = if team_one.len() > team_two.len() {
            (&mut *team_one, &mut *team_two)
        } else {
            (&mut *team_two, &mut *team_one)
        };

        let Some(lightest) = larger
            .iter()
            .enumerate()
            .min_by_key(|(_, item)| item.weight.value())
            .map(|(index, _)| index)
        else {
            break;
        };
        let moved = larger.remove(lightest);
        smaller.push(moved);
    }
}

fn into_keys(team: Vec<WeightedParticipant>) -> Vec<ParticipantKey> {
    team.into_iter().map(|item| item.entry.key).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::types::UserId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn weighted(id: u64, value: u32) -> WeightedParticipant {
        WeightedParticipant {
            entry: ParticipantEntry::user(UserId(id)),
            weight: WeightTier::from_value(value),
        }
    }

    fn team_weight(team: &[ParticipantKey], entries: &[WeightedParticipant]) -> u32 {
        team.iter()
            .map(|key| {
                entries
                    .iter()
                    .find(|item| item.entry.key == *key)
                    .map(|item| item.weight.value())
                    .unwrap()
            })
            .sum()
    }

    #[test]
    fn test_odd_count_is_refused() {
        let entries: Vec<_> = (1..=11).map(|id| weighted(id, 1)).collect();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(balance_teams(entries, &mut rng).is_none());
    }

    #[test]
    fn test_uniform_weights_split_six_six() {
        let entries: Vec<_> = (1..=12).map(|id| weighted(id, 1)).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let (one, two) = balance_teams(entries, &mut rng).unwrap();
        assert_eq!(one.len(), 6);
        assert_eq!(two.len(), 6);
    }

    #[test]
    fn test_teams_are_disjoint_and_cover_input() {
        let entries: Vec<_> = (1..=12).map(|id| weighted(id, (id % 4 + 1) as u32)).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let (one, two) = balance_teams(entries.clone(), &mut rng).unwrap();

        assert!(one.iter().all(|key| !two.contains(key)));
        assert_eq!(one.len() + two.len(), entries.len());
        for item in &entries {
            assert!(one.contains(&item.entry.key) || two.contains(&item.entry.key));
        }
    }

    #[test]
    fn test_skewed_weights_stay_balanced() {
        // Four heavy players and eight light ones. Equal sizes are forced;
        // the accumulated-weight gap must not exceed the largest possible
        // single-move imbalance.
        let mut entries: Vec<_> = (1..=4).map(|id| weighted(id, 4)).collect();
        entries.extend((5..=12).map(|id| weighted(id, 1)));

        let mut rng = StdRng::seed_from_u64(3);
        let (one, two) = balance_teams(entries.clone(), &mut rng).unwrap();

        assert_eq!(one.len(), 6);
        assert_eq!(two.len(), 6);

        let diff = team_weight(&one, &entries).abs_diff(team_weight(&two, &entries));
        assert!(diff <= 3, "weight difference {diff} exceeds bound");
    }

    #[test]
    fn test_fixed_seed_reproduces_assignment() {
        let entries: Vec<_> = (1..=10).map(|id| weighted(id, (id % 3 + 1) as u32)).collect();

        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let split_a = balance_teams(entries.clone(), &mut rng_a).unwrap();
        let split_b = balance_teams(entries, &mut rng_b).unwrap();

        assert_eq!(split_a, split_b);
    }

    #[test]
    fn test_two_entries_one_each() {
        let entries = vec![weighted(1, 4), weighted(2, 1)];
        let mut rng = StdRng::seed_from_u64(0);
        let (one, two) = balance_teams(entries, &mut rng).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_empty_teams() {
        let mut rng = StdRng::seed_from_u64(0);
        let (one, two) = balance_teams(Vec::new(), &mut rng).unwrap();
        assert!(one.is_empty());
        assert!(two.is_empty());
    }

    #[test]
    fn test_tier_from_value_degrades_out_of_range() {
        assert_eq!(WeightTier::from_value(0), WeightTier::Tier1);
        assert_eq!(WeightTier::from_value(4), WeightTier::Tier4);
        assert_eq!(WeightTier::from_value(99), WeightTier::Tier1);
    }
}
