//! Intent resolution for the monitoring assistant.
//!
//! Turns one raw utterance into a structured [`vigil_core::Intent`] through
//! two tiers: a generative tier that asks the configured language backend to
//! classify the query, and a deterministic pattern tier that always succeeds.
//! A [`ConversationContext`] then fills in what the utterance left implicit.

mod context;
mod error;
mod patterns;
mod resolver;

pub use context::ConversationContext;
pub use error::ResolveError;
pub use resolver::IntentResolver;
