//! Recruitment Controller Library
//!
//! Core engine for Scrim Herald: reaction-driven group-formation sessions
//! attached to messages on an external chat platform. Users join by
//! reacting, an organizer reveals two weight-balanced teams, and the
//! session can be closed.
//!
//! # Architecture
//!
//! The engine uses a two-level actor hierarchy:
//!
//! ```text
//! SessionRegistryActor (singleton per controller instance)
//! └── supervises N SessionActors
//!     └── SessionActor (one per tracked session)
//!         └── owns roster, team assignment, lifecycle flags
//! ```
//!
//! The [`dispatch::EventDispatcher`] sits in front of the actors: the
//! platform gateway feeds it typed [`dispatch::ReactionEvent`]s and
//! [`dispatch::AdminCommand`]s, and it performs all platform side effects
//! (identity resolution, message rendering, channel broadcasts) after the
//! owning actor has committed the mutation.
//!
//! # Key Design Decisions
//!
//! - **One actor per session**: the mailbox serializes mutations of a
//!   session; distinct sessions never block each other.
//! - **Side effects outside the exclusive section**: renders always
//!   re-derive from the latest committed snapshot, never from state
//!   captured earlier in a handler.
//! - **Seedable balancing**: the team balancer's tie-break randomness is
//!   injected, so a fixed seed reproduces identical splits.
//! - **No durability**: a restart discards all sessions; previously
//!   tracked messages are frozen at their last rendered state.
//!
//! # Modules
//!
//! - [`actors`] - Registry and session actors
//! - [`balance`] - Weighted two-team balancing
//! - [`command`] - Typed parsing for the operator command surface
//! - [`config`] - Controller configuration from environment
//! - [`dispatch`] - Trigger routing and post-commit side effects
//! - [`errors`] - Error types with operator-facing messages
//! - [`resolve`] - Identity and weight resolver interfaces
//! - [`roster`] - Ordered participant list and partitioning
//! - [`sinks`] - Render and broadcast sink interfaces
//! - [`trigger`] - Closed trigger vocabulary
//! - [`view`] - View model derivation for the render sink

pub mod actors;
pub mod balance;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod resolve;
pub mod roster;
pub mod sinks;
pub mod trigger;
pub mod view;
