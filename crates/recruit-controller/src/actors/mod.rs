//! Actor model implementation.
//!
//! Two-level hierarchy:
//!
//! ```text
//! SessionRegistryActor (singleton per controller instance)
//! └── supervises N SessionActors
//!     └── SessionActor (one per tracked session)
//!         └── owns the roster, team assignment and lifecycle flags
//! ```
//!
//! A session actor's mailbox is the per-session exclusive section: exactly
//! one mutation of a given session is in flight at a time, while distinct
//! sessions proceed without blocking each other.

pub mod messages;
pub mod metrics;
pub mod registry;
pub mod session;

pub use messages::{
    CloseReport, PassiveOutcome, RegistryStatus, SessionSeed, SessionSnapshot,
};
pub use metrics::{ActorType, EngineMetrics, MailboxMonitor};
pub use registry::SessionRegistryHandle;
pub use session::SessionActorHandle;
