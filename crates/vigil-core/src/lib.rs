//! Core types, configuration, and errors shared across the Vigil crates.
//!
//! Vigil is a conversational assistant for a monitoring backend: it turns
//! free-form operator questions into structured intents, correlates incident
//! records against a target service, and summarizes the result.

pub mod config;
pub mod error;
pub mod timeframe;
pub mod types;

pub use config::VigilConfig;
pub use error::{Result, VigilError};
pub use timeframe::{TimeUnit, Timeframe, TimeframeError};
pub use types::{
    EntityRef, HealthStatus, IncidentRecord, IncidentStatus, Intent, IntentCategory, MetricBundle,
    MetricInsights, Relevance, ServiceEntity,
};
