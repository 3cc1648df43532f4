//! External identity and weight resolution interfaces.
//!
//! Both resolvers are infallible by contract: implementations swallow
//! lookup failures and degrade (raw mention, default tier) instead of
//! erroring, so a flaky platform can never fail a handler. Caching policy
//! lives inside implementations; the core never sees it.

use crate::balance::WeightTier;
use async_trait::async_trait;
use common::types::UserId;
use std::collections::HashMap;

/// Maps a participant to their balancing tier.
#[async_trait]
pub trait WeightResolver: Send + Sync {
    /// Resolve the weight tier for `user`, degrading to
    /// [`WeightTier::default`] when the lookup fails. Dummy entries never
    /// reach the resolver.
    async fn weight_of(&self, user: UserId) -> WeightTier;
}

/// Resolves display mentions for users.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve the display mention for `user`, degrading to
    /// [`UserId::raw_mention`] when the lookup fails.
    async fn display_mention(&self, user: UserId) -> String;

    /// Resolve a batch, preserving input order.
    async fn display_mentions(&self, users: &[UserId]) -> Vec<String> {
        let mut mentions = Vec::with_capacity(users.len());
        for user in users {
            mentions.push(self.display_mention(*user).await);
        }
        mentions
    }
}

/// Resolve a display map for `users`, deduplicating lookups.
pub async fn display_map(
    resolver: &dyn IdentityResolver,
    users: &[UserId],
) -> HashMap<UserId, String> {
    let mut map = HashMap::with_capacity(users.len());
    for user in users {
        if !map.contains_key(user) {
            map.insert(*user, resolver.display_mention(*user).await);
        }
    }
    map
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct UpperCaser;

    #[async_trait]
    impl IdentityResolver for UpperCaser {
        async fn display_mention(&self, user: UserId) -> String {
            format!("U{}", user.0)
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let resolver = UpperCaser;
        let mentions = resolver
            .display_mentions(&[UserId(3), UserId(1), UserId(2)])
            .await;
        assert_eq!(mentions, vec!["U3", "U1", "U2"]);
    }

    #[tokio::test]
    async fn test_display_map_dedupes() {
        let resolver = UpperCaser;
        let map = display_map(&resolver, &[UserId(1), UserId(1), UserId(2)]).await;
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&UserId(1)).unwrap(), "U1");
    }
}
