//! REST implementation of [`HealthDataProvider`].
//!
//! Talks to a v2-style monitoring API: `/api/v2/entities` for service
//! lookups, `/api/v2/problems` for incidents, `/api/v2/metrics/query` for
//! metric datapoints. Wire structs mirror the API's camelCase JSON and are
//! converted into the core model at the boundary.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use vigil_core::config::MonitorConfig;
use vigil_core::{
    EntityRef, IncidentRecord, IncidentStatus, MetricBundle, ServiceEntity, Timeframe,
};

use crate::provider::{HealthDataProvider, ProviderError};

const METRIC_ERROR_COUNT: &str = "builtin:service.errors.total.count";
const METRIC_RESPONSE_TIME: &str = "builtin:service.response.time";
const METRIC_REQUEST_COUNT: &str = "builtin:service.requestCount.total";
const METRIC_FAILURE_RATE: &str = "builtin:service.errors.total.rate";

pub struct HttpHealthProvider {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    page_size: u32,
}

impl HttpHealthProvider {
    pub fn new(cfg: &MonitorConfig) -> Result<Self, ProviderError> {
        if cfg.base_url.is_empty() || cfg.api_token.is_empty() {
            return Err(ProviderError::NotConfigured);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_token: cfg.api_token.clone(),
            page_size: cfg.page_size,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Api-Token {}", self.api_token))
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        Ok(resp.json().await?)
    }
}

/// Selector for problem queries: precise by entity id when known, name
/// containment otherwise.
fn problem_selector(entity_id: Option<&str>, service_name: &str) -> String {
    match entity_id {
        Some(id) => format!(r#"type("SERVICE"),entityId("{id}")"#),
        None => format!(r#"type("SERVICE"),entityName.contains("{service_name}")"#),
    }
}

/// Absolute `from`/`to` instants for metric queries, anchored at `now`.
/// The metrics endpoint gets explicit UTC timestamps rather than relative
/// `now-` expressions so both ends of the window are pinned.
fn metrics_window(timeframe: Timeframe, now: chrono::DateTime<Utc>) -> (String, String) {
    let (from, to) = timeframe.range(now);
    (
        from.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        to.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    )
}

#[async_trait]
impl HealthDataProvider for HttpHealthProvider {
    async fn resolve_service_id(
        &self,
        service_name: &str,
    ) -> Result<Option<String>, ProviderError> {
        info!(service = service_name, "Resolving service entity id");
        let page: EntitiesPage = self
            .get_json(
                "/api/v2/entities",
                &[
                    (
                        "entitySelector",
                        format!(r#"type(SERVICE),entityName.contains("{service_name}")"#),
                    ),
                    ("pageSize", "1".to_string()),
                ],
            )
            .await?;

        match page.entities.into_iter().next() {
            Some(entity) => {
                debug!(entity_id = %entity.entity_id, "Service resolved");
                Ok(Some(entity.entity_id))
            }
            None => {
                warn!(service = service_name, "No matching service entity");
                Ok(None)
            }
        }
    }

    async fn list_services(&self, limit: usize) -> Result<Vec<ServiceEntity>, ProviderError> {
        info!(limit, "Listing services");
        let page: EntitiesPage = self
            .get_json(
                "/api/v2/entities",
                &[
                    ("entitySelector", "type(SERVICE)".to_string()),
                    ("pageSize", limit.to_string()),
                    ("fields", "+properties.serviceType".to_string()),
                ],
            )
            .await?;
        Ok(page.entities.into_iter().map(ServiceEntity::from).collect())
    }

    async fn fetch_problems(
        &self,
        entity_id: Option<&str>,
        service_name: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<IncidentRecord>, ProviderError> {
        info!(service = service_name, entity_id, timeframe = %timeframe, "Fetching problems");
        let page: ProblemsPage = self
            .get_json(
                "/api/v2/problems",
                &[
                    ("pageSize", self.page_size.to_string()),
                    ("from", format!("now-{timeframe}")),
                    ("entitySelector", problem_selector(entity_id, service_name)),
                    (
                        "fields",
                        "+impactedEntities,+affectedEntities,+rootCauseEntity".to_string(),
                    ),
                ],
            )
            .await?;

        debug!(count = page.problems.len(), "Problems fetched");
        Ok(page.problems.into_iter().map(IncidentRecord::from).collect())
    }

    async fn fetch_metrics(
        &self,
        entity_id: &str,
        timeframe: Timeframe,
    ) -> Result<MetricBundle, ProviderError> {
        info!(entity_id, timeframe = %timeframe, "Fetching metrics");
        let selector = [
            METRIC_ERROR_COUNT,
            METRIC_RESPONSE_TIME,
            METRIC_REQUEST_COUNT,
            METRIC_FAILURE_RATE,
        ]
        .join(",");

        let (from, to) = metrics_window(timeframe, Utc::now());
        let page: MetricsPage = self
            .get_json(
                "/api/v2/metrics/query",
                &[
                    ("metricSelector", selector),
                    ("resolution", "Inf".to_string()),
                    ("from", from),
                    ("to", to),
                    ("entitySelector", format!("entityId({entity_id})")),
                ],
            )
            .await?;

        Ok(bundle_from_page(page))
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct EntitiesPage {
    #[serde(default)]
    entities: Vec<EntityWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityWire {
    entity_id: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    properties: EntityProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityProperties {
    #[serde(default)]
    service_type: Option<String>,
}

impl From<EntityWire> for ServiceEntity {
    fn from(wire: EntityWire) -> Self {
        ServiceEntity {
            entity_id: wire.entity_id,
            display_name: wire.display_name,
            service_type: wire.properties.service_type.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProblemsPage {
    #[serde(default)]
    problems: Vec<ProblemWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemWire {
    problem_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    display_name: Option<String>,
    status: IncidentStatus,
    #[serde(default)]
    severity_level: String,
    #[serde(default)]
    impacted_entities: Vec<EntityRefWire>,
    #[serde(default)]
    affected_entities: Vec<EntityRefWire>,
    #[serde(default)]
    root_cause_entity: Option<EntityRefWire>,
}

/// The API nests the id one level down: `{"entityId": {"id": "..."}, "name": "..."}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityRefWire {
    #[serde(default)]
    entity_id: Option<EntityIdWire>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntityIdWire {
    #[serde(default)]
    id: Option<String>,
}

impl From<EntityRefWire> for EntityRef {
    fn from(wire: EntityRefWire) -> Self {
        EntityRef {
            entity_id: wire.entity_id.and_then(|e| e.id),
            name: wire.name,
        }
    }
}

impl From<ProblemWire> for IncidentRecord {
    fn from(wire: ProblemWire) -> Self {
        IncidentRecord {
            id: wire.problem_id,
            title: wire.title,
            display_name: wire.display_name,
            status: wire.status,
            severity: wire.severity_level,
            impacted_entities: wire.impacted_entities.into_iter().map(Into::into).collect(),
            affected_entities: wire.affected_entities.into_iter().map(Into::into).collect(),
            root_cause_entity: wire.root_cause_entity.map(Into::into),
            relevance: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetricsPage {
    #[serde(default)]
    result: Vec<MetricSeriesWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetricSeriesWire {
    metric_id: String,
    #[serde(default)]
    data: Vec<MetricDataWire>,
}

#[derive(Debug, Deserialize)]
struct MetricDataWire {
    #[serde(default)]
    values: Vec<Option<f64>>,
}

/// Collapse a metrics response into a bundle, taking the first datapoint of
/// each series. Failure rate arrives as a fraction and is reported as a
/// percentage.
fn bundle_from_page(page: MetricsPage) -> MetricBundle {
    let mut bundle = MetricBundle::default();

    for series in page.result {
        let value = series
            .data
            .iter()
            .flat_map(|d| d.values.iter())
            .find_map(|v| *v);
        let Some(value) = value else { continue };

        match series.metric_id.as_str() {
            METRIC_ERROR_COUNT => bundle.error_count = Some(value as i64),
            METRIC_RESPONSE_TIME => bundle.response_time_ms = Some((value * 100.0).round() / 100.0),
            METRIC_REQUEST_COUNT => bundle.request_count = Some(value as i64),
            METRIC_FAILURE_RATE => {
                bundle.failure_rate = Some((value * 100.0 * 100.0).round() / 100.0)
            }
            _ => {}
        }
    }

    bundle
}
