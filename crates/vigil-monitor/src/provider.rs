use async_trait::async_trait;
use thiserror::Error;

use vigil_core::{IncidentRecord, MetricBundle, ServiceEntity, Timeframe};

/// Errors from the monitoring backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("monitoring backend is not configured (missing base URL or token)")]
    NotConfigured,
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Http(String),
    #[error("backend returned status {0}")]
    Status(u16),
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

/// Read access to service health data.
#[async_trait]
pub trait HealthDataProvider: Send + Sync {
    /// Look up the entity id for a service name. `Ok(None)` means the
    /// backend knows no such service, which is not an error.
    async fn resolve_service_id(&self, service_name: &str)
        -> Result<Option<String>, ProviderError>;

    /// List monitored services, up to `limit`.
    async fn list_services(&self, limit: usize) -> Result<Vec<ServiceEntity>, ProviderError>;

    /// Fetch incident records for a service over a timeframe. The query is
    /// precise when `entity_id` is known and degrades to a name search
    /// otherwise; either way the caller still correlates the result.
    async fn fetch_problems(
        &self,
        entity_id: Option<&str>,
        service_name: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<IncidentRecord>, ProviderError>;

    /// Fetch key metrics for a service entity over a timeframe.
    async fn fetch_metrics(
        &self,
        entity_id: &str,
        timeframe: Timeframe,
    ) -> Result<MetricBundle, ProviderError>;
}
