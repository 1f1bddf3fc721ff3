//! Response composition.
//!
//! Every answer has a deterministic template; when a language backend is
//! enabled the analysis and general answers are upgraded to generated prose,
//! with the template as the fallback for any backend failure.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use vigil_core::{IncidentRecord, IntentCategory, MetricBundle, MetricInsights, ServiceEntity};
use vigil_correlate::ProblemBuckets;
use vigil_llm::LanguageBackend;

const ANALYSIS_SYSTEM_PROMPT: &str = "You are a service-monitoring expert and helpful assistant. \
Your role is to analyze service metrics and problems, then provide clear, \
actionable insights in a conversational tone. Be concise but thorough. \
Focus on what's important and provide recommendations when issues are detected.";

const GENERAL_SYSTEM_PROMPT: &str = "You are a helpful service-monitoring assistant.";

/// Services shown per type group in a listing.
const LIST_GROUP_LIMIT: usize = 10;

pub struct ResponseGenerator {
    backend: Arc<dyn LanguageBackend>,
}

impl ResponseGenerator {
    pub fn new(backend: Arc<dyn LanguageBackend>) -> Self {
        Self { backend }
    }

    /// Compose the health analysis for one service.
    pub async fn service_analysis(
        &self,
        service_name: &str,
        metrics: &MetricBundle,
        buckets: &ProblemBuckets,
        insights: &MetricInsights,
        timeframe: &str,
    ) -> String {
        if self.backend.is_enabled() {
            let context = build_analysis_context(service_name, metrics, buckets, insights, timeframe);
            let user_prompt = format!(
                "Analyze this service data and provide a summary:\n\n{context}\n\n\
                 Provide a clear, professional analysis that includes:\n\
                 1. Overall health status\n\
                 2. Key metrics summary\n\
                 3. Any concerns or issues\n\
                 4. Actionable recommendations (if applicable)\n\n\
                 Keep it concise but informative."
            );
            match self.backend.generate(ANALYSIS_SYSTEM_PROMPT, &user_prompt).await {
                Ok(text) => return text.trim().to_string(),
                Err(e) => {
                    warn!(backend = self.backend.name(), error = %e, "Analysis generation failed, using template");
                }
            }
        }
        fallback_analysis(service_name, metrics, buckets, insights)
    }

    /// Answer a general question, generated when possible.
    pub async fn general_answer(&self, query: &str) -> String {
        if self.backend.is_enabled() {
            let prompt = format!(
                "User asked: {query}\n\n\
                 This is a service-monitoring assistant. The user seems to have a general \
                 question. Provide a helpful, brief response. If their question is unclear, \
                 politely ask for clarification and give examples of what they can ask about."
            );
            match self.backend.generate(GENERAL_SYSTEM_PROMPT, &prompt).await {
                Ok(text) => return text.trim().to_string(),
                Err(e) => {
                    warn!(backend = self.backend.name(), error = %e, "General answer generation failed, using template");
                }
            }
        }
        unclear_query_text().to_string()
    }
}

// =============================================================================
// Deterministic templates
// =============================================================================

/// Template analysis used when no backend answer is available.
pub fn fallback_analysis(
    service_name: &str,
    metrics: &MetricBundle,
    buckets: &ProblemBuckets,
    insights: &MetricInsights,
) -> String {
    let mut parts = vec![
        format!("**Service Analysis: {service_name}**"),
        String::new(),
        format!("**Status:** {}", insights.status.as_str().to_uppercase()),
        String::new(),
        "**Metrics:**".to_string(),
        format!("- Error Count: {}", fmt_count(metrics.error_count)),
        format!("- Response Time: {}", fmt_ms(metrics.response_time_ms)),
        format!("- Request Count: {}", fmt_count(metrics.request_count)),
        format!("- Failure Rate: {}", fmt_pct(metrics.failure_rate)),
    ];

    parts.push(String::new());
    if buckets.is_empty() {
        parts.push("**No major problems detected.**".to_string());
    } else {
        parts.push(format!("**Problems Found:** {}", buckets.total()));
        for (label, records) in bucket_sections(buckets) {
            if records.is_empty() {
                continue;
            }
            parts.push(format!("\n**{label}** ({}):", records.len()));
            for record in records.iter().take(3) {
                parts.push(format!("- {}", record.title));
            }
            if records.len() > 3 {
                parts.push(format!("  ... and {} more", records.len() - 3));
            }
        }
    }

    if !insights.recommendations.is_empty() {
        parts.push(String::new());
        parts.push("**Recommendations:**".to_string());
        for rec in &insights.recommendations {
            parts.push(format!("- {rec}"));
        }
    }

    parts.join("\n")
}

/// Group services by type and render the listing.
pub fn service_list(services: &[ServiceEntity]) -> String {
    if services.is_empty() {
        return "No services found in your monitoring environment.".to_string();
    }

    let mut by_type: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for service in services {
        let service_type = if service.service_type.is_empty() {
            "Unknown"
        } else {
            &service.service_type
        };
        by_type.entry(service_type).or_default().push(&service.display_name);
    }

    let mut parts = vec![format!(
        "I found **{}** services in your environment:\n",
        services.len()
    )];

    for (service_type, mut names) in by_type {
        names.sort_unstable();
        parts.push(format!("\n**{service_type}** ({} services):", names.len()));
        for name in names.iter().take(LIST_GROUP_LIMIT) {
            parts.push(format!("- {name}"));
        }
        if names.len() > LIST_GROUP_LIMIT {
            parts.push(format!("  ... and {} more", names.len() - LIST_GROUP_LIMIT));
        }
    }

    parts.push("\nAsk me to check any of these services!".to_string());
    parts.join("\n")
}

pub fn help_text() -> &'static str {
    "I can help you with several things:\n\n\
     **Check Service Health**\n\
     - \"How is ordercontroller doing?\"\n\
     - \"Check issues with payment-api\"\n\
     - \"Any problems with checkout-service in the last hour?\"\n\n\
     **List Services**\n\
     - \"Show me all services\"\n\
     - \"What services are available?\"\n\n\
     **Analyze Performance**\n\
     - \"What's the performance of auth-service?\"\n\
     - \"Show metrics for user-service\"\n\n\
     Just ask naturally, I understand conversational queries."
}

pub fn unclear_query_text() -> &'static str {
    "I'm not quite sure what you're asking. Here are some things I can help with:\n\n\
     - Check service health: 'How is ordercontroller?'\n\
     - List services: 'Show all services'\n\
     - Analyze metrics: 'Performance of payment-api'\n\n\
     What would you like to know?"
}

/// Message for categories that are recognized but not implemented yet.
pub fn unsupported(category: IntentCategory) -> String {
    format!(
        "I understand you want to {}, but that feature is still being developed.\n\n\
         For now, I can:\n\
         - Check service health\n\
         - List all services\n\
         - Analyze metrics\n\n\
         What would you like to try?",
        category.wire_name().replace('_', " ")
    )
}

/// Severity buckets in presentation order, most urgent first.
fn bucket_sections(buckets: &ProblemBuckets) -> [(&'static str, &[IncidentRecord]); 4] {
    [
        ("Critical", buckets.critical.as_slice()),
        ("Important", buckets.important.as_slice()),
        ("Related", buckets.related.as_slice()),
        ("Resolved", buckets.resolved.as_slice()),
    ]
}

/// Context block handed to the backend for analysis generation.
fn build_analysis_context(
    service_name: &str,
    metrics: &MetricBundle,
    buckets: &ProblemBuckets,
    insights: &MetricInsights,
    timeframe: &str,
) -> String {
    let mut parts = vec![
        format!("Service: {service_name}"),
        format!("Time Period: {timeframe}"),
        String::new(),
        "Metrics:".to_string(),
        format!("- Error Count: {}", fmt_count(metrics.error_count)),
        format!("- Response Time: {}", fmt_ms(metrics.response_time_ms)),
        format!("- Request Count: {}", fmt_count(metrics.request_count)),
        format!("- Failure Rate: {}", fmt_pct(metrics.failure_rate)),
        String::new(),
        format!(
            "Problems Detected: {} (critical: {}, important: {}, related: {}, resolved: {})",
            buckets.total(),
            buckets.critical.len(),
            buckets.important.len(),
            buckets.related.len(),
            buckets.resolved.len()
        ),
    ];

    if !buckets.is_empty() {
        parts.push("Problem Details:".to_string());
        let mut index = 0;
        for (label, records) in bucket_sections(buckets) {
            for record in records.iter().take(3) {
                index += 1;
                parts.push(format!(
                    "  {index}. [{label}] {} ({:?})",
                    record.title, record.status
                ));
            }
        }
    }

    if !insights.concerns.is_empty() {
        parts.push(String::new());
        parts.push("Concerns:".to_string());
        for concern in &insights.concerns {
            parts.push(format!("- {concern}"));
        }
    }

    parts.join("\n")
}

fn fmt_count(value: Option<i64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn fmt_ms(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v} ms"))
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v}%"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::HealthStatus;
    use vigil_llm::NoopBackend;

    fn insights(status: HealthStatus) -> MetricInsights {
        MetricInsights {
            status,
            concerns: vec![],
            recommendations: vec!["Continue monitoring.".to_string()],
        }
    }

    // ---- Fallback analysis ----

    #[test]
    fn test_fallback_analysis_includes_status_and_metrics() {
        let metrics = MetricBundle {
            error_count: Some(12),
            response_time_ms: Some(450.5),
            request_count: None,
            failure_rate: Some(0.8),
        };
        let text = fallback_analysis(
            "payment-api",
            &metrics,
            &ProblemBuckets::default(),
            &insights(HealthStatus::Healthy),
        );
        assert!(text.contains("**Service Analysis: payment-api**"));
        assert!(text.contains("**Status:** HEALTHY"));
        assert!(text.contains("- Error Count: 12"));
        assert!(text.contains("- Response Time: 450.5 ms"));
        assert!(text.contains("- Request Count: N/A"));
        assert!(text.contains("- Failure Rate: 0.8%"));
        assert!(text.contains("**No major problems detected.**"));
        assert!(text.contains("- Continue monitoring."));
    }

    #[test]
    fn test_fallback_analysis_caps_each_bucket_at_three() {
        let buckets = ProblemBuckets {
            related: (0..5)
                .map(|i| IncidentRecord::new(format!("P-{i}"), format!("Problem {i}")))
                .collect(),
            ..Default::default()
        };
        let text = fallback_analysis(
            "payment-api",
            &MetricBundle::default(),
            &buckets,
            &insights(HealthStatus::Critical),
        );
        assert!(text.contains("**Problems Found:** 5"));
        assert!(text.contains("**Related** (5):"));
        assert!(text.contains("- Problem 2"));
        assert!(!text.contains("- Problem 3"));
        assert!(text.contains("... and 2 more"));
    }

    #[test]
    fn test_fallback_analysis_renders_severity_buckets() {
        let buckets = ProblemBuckets {
            critical: vec![IncidentRecord::new("P-1", "Failure rate increase")],
            resolved: vec![IncidentRecord::new("P-2", "CPU saturation")],
            ..Default::default()
        };
        let text = fallback_analysis(
            "payment-api",
            &MetricBundle::default(),
            &buckets,
            &insights(HealthStatus::Critical),
        );
        assert!(text.contains("**Problems Found:** 2"));
        assert!(text.contains("**Critical** (1):"));
        assert!(text.contains("- Failure rate increase"));
        assert!(text.contains("**Resolved** (1):"));
        assert!(text.contains("- CPU saturation"));
        assert!(!text.contains("**Important**"));
    }

    #[test]
    fn test_analysis_context_reports_bucket_counts() {
        let buckets = ProblemBuckets {
            critical: vec![IncidentRecord::new("P-1", "Failure rate increase")],
            related: vec![IncidentRecord::new("P-2", "Slow disk on host")],
            ..Default::default()
        };
        let text = build_analysis_context(
            "payment-api",
            &MetricBundle::default(),
            &buckets,
            &insights(HealthStatus::Critical),
            "Last 2 hours",
        );
        assert!(text.contains(
            "Problems Detected: 2 (critical: 1, important: 0, related: 1, resolved: 0)"
        ));
        assert!(text.contains("1. [Critical] Failure rate increase"));
        assert!(text.contains("2. [Related] Slow disk on host"));
    }

    // ---- Service listing ----

    #[test]
    fn test_service_list_groups_by_type() {
        let services = vec![
            ServiceEntity {
                entity_id: "S-1".into(),
                display_name: "payment-api".into(),
                service_type: "WEB_SERVICE".into(),
            },
            ServiceEntity {
                entity_id: "S-2".into(),
                display_name: "warehouse-db".into(),
                service_type: "DATABASE".into(),
            },
            ServiceEntity {
                entity_id: "S-3".into(),
                display_name: "checkout".into(),
                service_type: "WEB_SERVICE".into(),
            },
        ];
        let text = service_list(&services);
        assert!(text.contains("I found **3** services"));
        assert!(text.contains("**WEB_SERVICE** (2 services):"));
        assert!(text.contains("**DATABASE** (1 services):"));
        assert!(text.contains("- checkout"));
        assert!(text.contains("- warehouse-db"));
    }

    #[test]
    fn test_service_list_unknown_type_and_overflow() {
        let mut services: Vec<ServiceEntity> = (0..12)
            .map(|i| ServiceEntity {
                entity_id: format!("S-{i}"),
                display_name: format!("svc-{i:02}"),
                service_type: String::new(),
            })
            .collect();
        services.sort_by(|a, b| a.display_name.cmp(&b.display_name));

        let text = service_list(&services);
        assert!(text.contains("**Unknown** (12 services):"));
        assert!(text.contains("... and 2 more"));
    }

    #[test]
    fn test_service_list_empty() {
        assert!(service_list(&[]).contains("No services found"));
    }

    // ---- Unsupported categories ----

    #[test]
    fn test_unsupported_names_the_category() {
        let text = unsupported(IntentCategory::CompareServices);
        assert!(text.contains("compare services"));
        assert!(text.contains("still being developed"));
    }

    // ---- Generator with disabled backend ----

    #[tokio::test]
    async fn test_disabled_backend_uses_fallback_analysis() {
        let gen = ResponseGenerator::new(Arc::new(NoopBackend));
        let text = gen
            .service_analysis(
                "payment-api",
                &MetricBundle::default(),
                &ProblemBuckets::default(),
                &insights(HealthStatus::Healthy),
                "Last 2 hours",
            )
            .await;
        assert!(text.contains("**Service Analysis: payment-api**"));
    }

    #[tokio::test]
    async fn test_disabled_backend_uses_unclear_text() {
        let gen = ResponseGenerator::new(Arc::new(NoopBackend));
        let text = gen.general_answer("what is the meaning of life").await;
        assert!(text.contains("not quite sure"));
    }
}
