//! Shared data model: intents, incident records, metrics.

use serde::{Deserialize, Serialize};

use crate::timeframe::Timeframe;

// =============================================================================
// Intents
// =============================================================================

/// What the user wants from a single utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    CheckHealth,
    ListServices,
    ServiceDetails,
    MetricsAnalysis,
    CompareServices,
    Troubleshoot,
    GeneralQuestion,
}

impl IntentCategory {
    /// Tie-break precedence for keyword scoring, highest first.
    ///
    /// `GeneralQuestion` is absent on purpose: it is only the all-zero-score
    /// fallback and never competes in a tie.
    pub const PRECEDENCE: [IntentCategory; 6] = [
        IntentCategory::CheckHealth,
        IntentCategory::ListServices,
        IntentCategory::ServiceDetails,
        IntentCategory::MetricsAnalysis,
        IntentCategory::CompareServices,
        IntentCategory::Troubleshoot,
    ];

    /// Wire name used in the generative-backend JSON contract.
    pub fn wire_name(self) -> &'static str {
        match self {
            IntentCategory::CheckHealth => "check_health",
            IntentCategory::ListServices => "list_services",
            IntentCategory::ServiceDetails => "service_details",
            IntentCategory::MetricsAnalysis => "metrics_analysis",
            IntentCategory::CompareServices => "compare_services",
            IntentCategory::Troubleshoot => "troubleshoot",
            IntentCategory::GeneralQuestion => "general_question",
        }
    }

    /// Inverse of [`wire_name`](Self::wire_name). Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "check_health" => Some(IntentCategory::CheckHealth),
            "list_services" => Some(IntentCategory::ListServices),
            "service_details" => Some(IntentCategory::ServiceDetails),
            "metrics_analysis" => Some(IntentCategory::MetricsAnalysis),
            "compare_services" => Some(IntentCategory::CompareServices),
            "troubleshoot" => Some(IntentCategory::Troubleshoot),
            "general_question" => Some(IntentCategory::GeneralQuestion),
            _ => None,
        }
    }
}

/// A resolved interpretation of one user utterance.
///
/// Created fresh per turn by the intent resolver and immutable afterwards.
/// `timeframe` is `None` when the user gave no time window at all; an
/// explicit window (even the default-valued "2h") is always `Some`, so
/// context carry-over can tell the two apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub category: IntentCategory,
    pub service_name: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub is_followup: bool,
    pub raw_query: String,
    pub extra_context: String,
}

impl Intent {
    pub fn new(category: IntentCategory, raw_query: impl Into<String>) -> Self {
        Self {
            category,
            service_name: None,
            timeframe: None,
            is_followup: false,
            raw_query: raw_query.into(),
            extra_context: String::new(),
        }
    }

    /// The window to act on: the resolved one, or the system default.
    pub fn effective_timeframe(&self) -> Timeframe {
        self.timeframe.unwrap_or(Timeframe::DEFAULT)
    }
}

// =============================================================================
// Incidents
// =============================================================================

/// Lifecycle state of an incident as reported by the monitoring backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IncidentStatus {
    Open,
    Resolved,
    #[serde(other)]
    Unknown,
}

/// How an incident relates to the target service.
///
/// Assigned exactly once, by the correlation pass that accepted the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    RootCause,
    DirectlyImpacted,
    IndirectlyAffected,
    NameMatch,
    TitleMatch,
    EntityMatch,
}

/// A reference to a monitored entity. Either field may be missing in raw
/// backend payloads; correlation skips refs it cannot use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_id: Option<String>,
    pub name: Option<String>,
}

impl EntityRef {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            entity_id: Some(id.into()),
            name: None,
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            entity_id: None,
            name: Some(name.into()),
        }
    }
}

/// One incident record from the monitoring backend.
///
/// Everything except `relevance` is read-only input; `relevance` is set by
/// the correlator when the record is accepted into the matched set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub id: String,
    pub title: String,
    pub display_name: Option<String>,
    pub status: IncidentStatus,
    pub severity: String,
    pub impacted_entities: Vec<EntityRef>,
    pub affected_entities: Vec<EntityRef>,
    pub root_cause_entity: Option<EntityRef>,
    pub relevance: Option<Relevance>,
}

impl IncidentRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            display_name: None,
            status: IncidentStatus::Open,
            severity: String::new(),
            impacted_entities: Vec::new(),
            affected_entities: Vec::new(),
            root_cause_entity: None,
            relevance: None,
        }
    }
}

// =============================================================================
// Services & metrics
// =============================================================================

/// A monitored service entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntity {
    pub entity_id: String,
    pub display_name: String,
    pub service_type: String,
}

/// Key service metrics over one timeframe. A `None` field means the backend
/// returned no datapoint for that metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricBundle {
    pub error_count: Option<i64>,
    pub response_time_ms: Option<f64>,
    pub request_count: Option<i64>,
    pub failure_rate: Option<f64>,
}

/// Coarse health classification derived from metric thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }
}

/// Threshold-derived observations about a metric bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricInsights {
    pub status: HealthStatus,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- IntentCategory wire names ----

    #[test]
    fn test_wire_name_round_trip() {
        for cat in [
            IntentCategory::CheckHealth,
            IntentCategory::ListServices,
            IntentCategory::ServiceDetails,
            IntentCategory::MetricsAnalysis,
            IntentCategory::CompareServices,
            IntentCategory::Troubleshoot,
            IntentCategory::GeneralQuestion,
        ] {
            assert_eq!(IntentCategory::from_wire(cat.wire_name()), Some(cat));
        }
    }

    #[test]
    fn test_from_wire_unknown() {
        assert_eq!(IntentCategory::from_wire("restart_service"), None);
        assert_eq!(IntentCategory::from_wire(""), None);
    }

    #[test]
    fn test_precedence_has_no_general_question() {
        assert!(!IntentCategory::PRECEDENCE.contains(&IntentCategory::GeneralQuestion));
        assert_eq!(IntentCategory::PRECEDENCE[0], IntentCategory::CheckHealth);
        assert_eq!(
            IntentCategory::PRECEDENCE[5],
            IntentCategory::Troubleshoot
        );
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&IntentCategory::CheckHealth).unwrap();
        assert_eq!(json, "\"check_health\"");
        let cat: IntentCategory = serde_json::from_str("\"metrics_analysis\"").unwrap();
        assert_eq!(cat, IntentCategory::MetricsAnalysis);
    }

    // ---- Intent ----

    #[test]
    fn test_intent_new_defaults() {
        let intent = Intent::new(IntentCategory::CheckHealth, "check payment-api");
        assert!(intent.service_name.is_none());
        assert!(intent.timeframe.is_none());
        assert!(!intent.is_followup);
        assert_eq!(intent.raw_query, "check payment-api");
    }

    #[test]
    fn test_effective_timeframe_defaults_to_two_hours() {
        let intent = Intent::new(IntentCategory::CheckHealth, "q");
        assert_eq!(intent.effective_timeframe().to_string(), "2h");
    }

    #[test]
    fn test_effective_timeframe_uses_explicit() {
        let mut intent = Intent::new(IntentCategory::CheckHealth, "q");
        intent.timeframe = Some("30m".parse().unwrap());
        assert_eq!(intent.effective_timeframe().to_string(), "30m");
    }

    // ---- IncidentStatus serde ----

    #[test]
    fn test_status_deserialize_known() {
        let s: IncidentStatus = serde_json::from_str("\"OPEN\"").unwrap();
        assert_eq!(s, IncidentStatus::Open);
        let s: IncidentStatus = serde_json::from_str("\"RESOLVED\"").unwrap();
        assert_eq!(s, IncidentStatus::Resolved);
    }

    #[test]
    fn test_status_deserialize_unknown_variant() {
        let s: IncidentStatus = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(s, IncidentStatus::Unknown);
    }

    // ---- Relevance serde ----

    #[test]
    fn test_relevance_serde() {
        let json = serde_json::to_string(&Relevance::RootCause).unwrap();
        assert_eq!(json, "\"root_cause\"");
        let r: Relevance = serde_json::from_str("\"directly_impacted\"").unwrap();
        assert_eq!(r, Relevance::DirectlyImpacted);
    }

    // ---- IncidentRecord ----

    #[test]
    fn test_incident_record_new_untagged() {
        let rec = IncidentRecord::new("P-1", "High failure rate");
        assert!(rec.relevance.is_none());
        assert_eq!(rec.status, IncidentStatus::Open);
        assert!(rec.impacted_entities.is_empty());
    }

    // ---- EntityRef ----

    #[test]
    fn test_entity_ref_constructors() {
        let e = EntityRef::with_id("SERVICE-123");
        assert_eq!(e.entity_id.as_deref(), Some("SERVICE-123"));
        assert!(e.name.is_none());

        let e = EntityRef::with_name("payment-api");
        assert_eq!(e.name.as_deref(), Some("payment-api"));
        assert!(e.entity_id.is_none());
    }

    // ---- MetricBundle ----

    #[test]
    fn test_metric_bundle_default_all_absent() {
        let m = MetricBundle::default();
        assert!(m.error_count.is_none());
        assert!(m.response_time_ms.is_none());
        assert!(m.request_count.is_none());
        assert!(m.failure_rate.is_none());
    }

    #[test]
    fn test_health_status_as_str() {
        assert_eq!(HealthStatus::Healthy.as_str(), "healthy");
        assert_eq!(HealthStatus::Warning.as_str(), "warning");
        assert_eq!(HealthStatus::Critical.as_str(), "critical");
    }
}
