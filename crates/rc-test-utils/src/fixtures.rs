//! Pre-configured test data and the wired engine harness.

use crate::resolvers::{StaticIdentityResolver, StaticWeightResolver};
use crate::sinks::{RecordingBroadcastSink, RecordingRenderSink};
use common::types::{ChannelId, GuildId, SessionId, UserId};
use recruit_controller::actors::messages::SessionSeed;
use recruit_controller::actors::metrics::EngineMetrics;
use recruit_controller::actors::registry::SessionRegistryHandle;
use recruit_controller::balance::WeightTier;
use recruit_controller::config::Config;
use recruit_controller::dispatch::EventDispatcher;
use recruit_controller::trigger::TriggerBindings;
use std::collections::HashMap;
use std::sync::Arc;

/// Default guild id used by fixture seeds.
pub const TEST_GUILD: GuildId = GuildId(9000);

/// Default channel id used by fixture seeds.
pub const TEST_CHANNEL: ChannelId = ChannelId(9001);

/// A session seed with fixture defaults.
pub fn seed(title: &str, organizer: Option<UserId>) -> SessionSeed {
    SessionSeed {
        guild_id: TEST_GUILD,
        channel_id: TEST_CHANNEL,
        title: title.to_string(),
        bindings: TriggerBindings::default(),
        organizer,
    }
}

/// Fully wired engine with recording sinks and static resolvers.
///
/// Everything platform-shaped is a fake; the actors and dispatcher are the
/// real ones.
pub struct TestEngine {
    pub dispatcher: EventDispatcher,
    pub registry: SessionRegistryHandle,
    pub render: Arc<RecordingRenderSink>,
    pub broadcast: Arc<RecordingBroadcastSink>,
    pub metrics: Arc<EngineMetrics>,
}

impl TestEngine {
    /// Start building an engine; defaults to uniform weights, raw-mention
    /// identity fallback and a fixed balance seed for reproducible splits.
    #[must_use]
    pub fn builder() -> TestEngineBuilder {
        TestEngineBuilder::default()
    }

    /// Open a session with fixture defaults and render the initial view.
    pub async fn open(&self, session_id: SessionId, title: &str, organizer: Option<UserId>) {
        self.dispatcher
            .open_session(session_id, seed(title, organizer))
            .await
            .expect("open_session failed");
    }

    /// Tear down the actor tree.
    pub fn shutdown(&self) {
        self.registry.cancel();
    }
}

/// Builder for [`TestEngine`].
#[derive(Default)]
pub struct TestEngineBuilder {
    names: HashMap<UserId, String>,
    tiers: HashMap<UserId, WeightTier>,
    balance_seed: Option<u64>,
}

impl TestEngineBuilder {
    /// Register a resolvable display name.
    #[must_use]
    pub fn with_name(mut self, user: UserId, name: &str) -> Self {
        self.names.insert(user, name.to_string());
        self
    }

    /// Register a weight tier.
    #[must_use]
    pub fn with_tier(mut self, user: UserId, tier: WeightTier) -> Self {
        self.tiers.insert(user, tier);
        self
    }

    /// Override the balancer seed (defaults to 0 for determinism).
    #[must_use]
    pub fn with_balance_seed(mut self, seed: u64) -> Self {
        self.balance_seed = Some(seed);
        self
    }

    /// Wire everything up and spawn the registry actor.
    #[must_use]
    pub fn build(self) -> TestEngine {
        let config = Config {
            balance_seed: Some(self.balance_seed.unwrap_or(0)),
            ..Config::default()
        };

        let metrics = EngineMetrics::new();
        let weights = Arc::new(StaticWeightResolver::new(self.tiers));
        let registry = SessionRegistryHandle::new(&config, weights, Arc::clone(&metrics));

        let identity = Arc::new(StaticIdentityResolver::new(self.names));
        let render = Arc::new(RecordingRenderSink::new());
        let broadcast = Arc::new(RecordingBroadcastSink::new());

        let render_sink: Arc<dyn recruit_controller::sinks::RenderSink> = render.clone();
        let broadcast_sink: Arc<dyn recruit_controller::sinks::BroadcastSink> =
            broadcast.clone();
        let dispatcher = EventDispatcher::new(registry.clone(), identity, render_sink, broadcast_sink);

        TestEngine {
            dispatcher,
            registry,
            render,
            broadcast,
            metrics,
        }
    }
}
