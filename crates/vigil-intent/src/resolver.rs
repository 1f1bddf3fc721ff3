//! Two-tier intent resolver.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use vigil_core::{Intent, IntentCategory};
use vigil_llm::LanguageBackend;

use crate::error::ResolveError;
use crate::patterns;

const SYSTEM_PROMPT: &str = r#"You are an intent classifier for a service-monitoring assistant.
Your job is to extract structured information from user queries.

Available intent types:
- check_health: User wants to check service health, issues, problems, errors
- list_services: User wants to see all available services
- service_details: User wants detailed info about a specific service
- metrics_analysis: User wants to analyze performance metrics
- compare_services: User wants to compare multiple services
- troubleshoot: User wants help diagnosing an issue
- general_question: General question about monitoring or the system

Extract:
1. intent_type: One of the above types
2. service_name: The service name mentioned (if any)
3. timeframe: Time period like "2h", "30m", "7d" (if any)
4. additional_context: Any other relevant information

Respond ONLY with valid JSON in this exact format:
{
  "intent_type": "check_health",
  "service_name": "ordercontroller",
  "timeframe": "2h",
  "additional_context": ""
}

If no service name is mentioned, use null for service_name.
If no timeframe is mentioned, use null for timeframe."#;

/// JSON contract returned by the generative tier.
#[derive(Debug, Deserialize)]
struct IntentWire {
    intent_type: String,
    #[serde(default)]
    service_name: Option<String>,
    #[serde(default)]
    timeframe: Option<String>,
    #[serde(default)]
    additional_context: String,
}

/// Resolves raw queries into [`Intent`]s.
///
/// Tries the generative tier first (when a backend is enabled), bounded by a
/// wall-clock timeout; anything short of a valid reply falls through to the
/// deterministic pattern tier, which always produces an intent.
pub struct IntentResolver {
    backend: Arc<dyn LanguageBackend>,
    timeout: Duration,
}

impl IntentResolver {
    pub fn new(backend: Arc<dyn LanguageBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn resolve(&self, query: &str) -> Result<Intent, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::EmptyQuery);
        }

        if self.backend.is_enabled() {
            if let Some(intent) = self.resolve_generative(query).await {
                debug!(category = ?intent.category, "Intent resolved by generative tier");
                return Ok(intent);
            }
        }

        let intent = self.resolve_patterns(query);
        debug!(category = ?intent.category, "Intent resolved by pattern tier");
        Ok(intent)
    }

    async fn resolve_generative(&self, query: &str) -> Option<Intent> {
        let user_prompt = format!("User query: {query}");
        let call = self.backend.generate(SYSTEM_PROMPT, &user_prompt);

        let reply = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(backend = self.backend.name(), error = %e, "Generative tier failed, falling back to patterns");
                return None;
            }
            Err(_) => {
                warn!(backend = self.backend.name(), "Generative tier timed out, falling back to patterns");
                return None;
            }
        };

        let wire: IntentWire = match serde_json::from_str(strip_code_fences(&reply)) {
            Ok(wire) => wire,
            Err(e) => {
                warn!(error = %e, "Generative reply was not valid intent JSON, falling back to patterns");
                return None;
            }
        };

        let Some(category) = IntentCategory::from_wire(&wire.intent_type) else {
            warn!(
                intent_type = %wire.intent_type,
                "Generative reply named an unknown category, falling back to patterns"
            );
            return None;
        };
        let mut intent = Intent::new(category, query);
        intent.service_name = wire.service_name.filter(|s| !s.is_empty());
        intent.timeframe = wire.timeframe.and_then(|s| s.parse().ok());
        intent.extra_context = wire.additional_context;
        Some(intent)
    }

    fn resolve_patterns(&self, query: &str) -> Intent {
        let lower = query.to_lowercase();
        let mut intent = Intent::new(patterns::detect_category(&lower), query);
        intent.service_name = patterns::extract_service_name(&lower);
        intent.timeframe = patterns::extract_timeframe(&lower);
        intent
    }
}

/// Strip a markdown code fence (with optional `json` tag) around a reply.
fn strip_code_fences(reply: &str) -> &str {
    let reply = reply.trim();
    let Some(rest) = reply.strip_prefix("```") else {
        return reply;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use vigil_llm::{BackendError, NoopBackend};

    struct CannedBackend {
        reply: Result<String, BackendError>,
    }

    impl CannedBackend {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
            })
        }

        fn err() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(BackendError::Status(500)),
            })
        }
    }

    #[async_trait]
    impl LanguageBackend for CannedBackend {
        async fn generate(&self, _: &str, _: &str) -> Result<String, BackendError> {
            match &self.reply {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(BackendError::Status(500)),
            }
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl LanguageBackend for SlowBackend {
        async fn generate(&self, _: &str, _: &str) -> Result<String, BackendError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn resolver(backend: Arc<dyn LanguageBackend>) -> IntentResolver {
        IntentResolver::new(backend, Duration::from_millis(50))
    }

    // ---- Fence stripping ----

    #[test]
    fn test_strip_plain_text() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_strip_bare_fence() {
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    // ---- Resolution ----

    #[tokio::test]
    async fn test_empty_query_is_an_error() {
        let r = resolver(Arc::new(NoopBackend));
        assert_eq!(r.resolve("   ").await.unwrap_err(), ResolveError::EmptyQuery);
    }

    #[tokio::test]
    async fn test_generative_tier_parses_wire_json() {
        let r = resolver(CannedBackend::ok(
            r#"```json
{"intent_type": "metrics_analysis", "service_name": "payment-api", "timeframe": "4h", "additional_context": "focus on errors"}
```"#,
        ));
        let intent = r.resolve("how is payment-api doing").await.unwrap();
        assert_eq!(intent.category, IntentCategory::MetricsAnalysis);
        assert_eq!(intent.service_name.as_deref(), Some("payment-api"));
        assert_eq!(intent.timeframe.map(|t| t.to_string()).as_deref(), Some("4h"));
        assert_eq!(intent.extra_context, "focus on errors");
    }

    #[tokio::test]
    async fn test_generative_null_fields_stay_absent() {
        let r = resolver(CannedBackend::ok(
            r#"{"intent_type": "check_health", "service_name": null, "timeframe": null}"#,
        ));
        let intent = r.resolve("anything broken?").await.unwrap();
        assert_eq!(intent.category, IntentCategory::CheckHealth);
        assert!(intent.service_name.is_none());
        assert!(intent.timeframe.is_none());
    }

    #[tokio::test]
    async fn test_unknown_wire_category_falls_back_to_patterns() {
        // A category outside the contract discards the whole generative
        // reply; the pattern tier decides instead.
        let r = resolver(CannedBackend::ok(
            r#"{"intent_type": "restart_service", "service_name": "payment-api"}"#,
        ));
        let intent = r.resolve("show all services").await.unwrap();
        assert_eq!(intent.category, IntentCategory::ListServices);
        assert!(intent.service_name.is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_falls_back_to_patterns() {
        let r = resolver(CannedBackend::ok("I think the user wants a health check."));
        let intent = r.resolve("any errors in payment-api").await.unwrap();
        assert_eq!(intent.category, IntentCategory::CheckHealth);
        assert_eq!(intent.service_name.as_deref(), Some("payment-api"));
    }

    #[tokio::test]
    async fn test_backend_error_falls_back_to_patterns() {
        let r = resolver(CannedBackend::err());
        let intent = r.resolve("show all services").await.unwrap();
        assert_eq!(intent.category, IntentCategory::ListServices);
    }

    #[tokio::test]
    async fn test_backend_timeout_falls_back_to_patterns() {
        let r = resolver(Arc::new(SlowBackend));
        let intent = r.resolve("why is checkout-api slow").await.unwrap();
        assert_eq!(intent.category, IntentCategory::Troubleshoot);
        assert_eq!(intent.service_name.as_deref(), Some("checkout-api"));
    }

    #[tokio::test]
    async fn test_disabled_backend_goes_straight_to_patterns() {
        let r = resolver(Arc::new(NoopBackend));
        let intent = r.resolve("metrics for payment-api in the last 3 days").await.unwrap();
        assert_eq!(intent.category, IntentCategory::MetricsAnalysis);
        assert_eq!(intent.service_name.as_deref(), Some("payment-api"));
        assert_eq!(intent.timeframe.map(|t| t.to_string()).as_deref(), Some("3d"));
    }

    #[tokio::test]
    async fn test_pattern_tier_leaves_timeframe_absent() {
        let r = resolver(Arc::new(NoopBackend));
        let intent = r.resolve("check payment-api health").await.unwrap();
        assert!(intent.timeframe.is_none());
    }
}
