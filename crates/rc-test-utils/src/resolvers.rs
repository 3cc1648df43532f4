//! Static resolver fakes backed by plain maps.

use async_trait::async_trait;
use common::types::UserId;
use recruit_controller::balance::WeightTier;
use recruit_controller::resolve::{IdentityResolver, WeightResolver};
use std::collections::HashMap;

/// Identity resolver that serves display mentions from a fixed map and
/// degrades to the raw mention for unknown users, exactly like a real
/// resolver facing a failed lookup.
#[derive(Debug, Default)]
pub struct StaticIdentityResolver {
    names: HashMap<UserId, String>,
}

impl StaticIdentityResolver {
    #[must_use]
    pub fn new(names: HashMap<UserId, String>) -> Self {
        Self { names }
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentityResolver {
    async fn display_mention(&self, user: UserId) -> String {
        self.names
            .get(&user)
            .cloned()
            .unwrap_or_else(|| user.raw_mention())
    }
}

/// Weight resolver that serves tiers from a fixed map; unknown users get
/// the default tier.
#[derive(Debug, Default)]
pub struct StaticWeightResolver {
    tiers: HashMap<UserId, WeightTier>,
}

impl StaticWeightResolver {
    #[must_use]
    pub fn new(tiers: HashMap<UserId, WeightTier>) -> Self {
        Self { tiers }
    }
}

#[async_trait]
impl WeightResolver for StaticWeightResolver {
    async fn weight_of(&self, user: UserId) -> WeightTier {
        self.tiers.get(&user).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_fallback_is_raw_mention() {
        let mut names = HashMap::new();
        names.insert(UserId(1), "@alice".to_string());
        let resolver = StaticIdentityResolver::new(names);

        assert_eq!(resolver.display_mention(UserId(1)).await, "@alice");
        assert_eq!(resolver.display_mention(UserId(2)).await, "<@2>");
    }

    #[tokio::test]
    async fn test_weight_fallback_is_default_tier() {
        let mut tiers = HashMap::new();
        tiers.insert(UserId(1), WeightTier::Tier3);
        let resolver = StaticWeightResolver::new(tiers);

        assert_eq!(resolver.weight_of(UserId(1)).await, WeightTier::Tier3);
        assert_eq!(resolver.weight_of(UserId(2)).await, WeightTier::Tier1);
    }
}
