//! subtext-core
//!
//! Core building blocks for the subtext generation broker: an
//! in-memory task store with queue-like claim semantics, TTL garbage
//! collection of delivered results, and the lifecycle orchestrator
//! that drives two-phase requests and the bounded grounding retry.
//!
//! - **domain**: ids, task records, requests, repository facts, payloads
//! - **store**: the shared task store and its TTL eviction policy
//! - **orchestrator**: enqueue / poll / claim / report lifecycle logic
//! - **prompts**: instruction building for each domain and phase
//! - **clock**: time source seam (system / fixed)

pub mod clock;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod store;

pub use error::SubtextError;
