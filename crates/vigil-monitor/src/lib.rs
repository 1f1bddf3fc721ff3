//! Monitoring-backend access.
//!
//! [`HealthDataProvider`] is the seam between the assistant and whatever
//! system actually holds the data; [`HttpHealthProvider`] implements it
//! against a v2-style REST API, and tests substitute their own.

mod http;
mod insights;
mod provider;

pub use http::HttpHealthProvider;
pub use insights::analyze_metrics;
pub use provider::{HealthDataProvider, ProviderError};
