//! # RC Test Utilities
//!
//! Shared test utilities for the Scrim Herald recruitment controller.
//!
//! This crate provides fake implementations of the platform seams and a
//! pre-wired engine harness for isolated testing without any real chat
//! platform behind it.
//!
//! ## Modules
//!
//! - `resolvers` - Static identity and weight resolvers backed by maps
//! - `sinks` - Recording render/broadcast sinks with failure injection
//! - `fixtures` - Session seeds and the [`fixtures::TestEngine`] harness
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rc_test_utils::fixtures::TestEngine;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let engine = TestEngine::builder()
//!         .with_name(UserId(1), "@alice")
//!         .with_tier(UserId(1), WeightTier::Tier4)
//!         .build();
//!
//!     engine.open(SessionId(100), "friday scrim", Some(UserId(1))).await;
//!     // Drive reactions through engine.dispatcher ...
//! }
//! ```

pub mod fixtures;
pub mod resolvers;
pub mod sinks;

pub use fixtures::{TestEngine, TestEngineBuilder};
pub use resolvers::{StaticIdentityResolver, StaticWeightResolver};
pub use sinks::{RecordingBroadcastSink, RecordingRenderSink, RenderFailure};

/// Initialize test tracing output once per process.
///
/// Respects `RUST_LOG`; defaults to warnings only so test output stays
/// readable.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}
