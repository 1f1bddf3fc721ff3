//! Chat engine: resolves intent, routes to a handler, composes the reply.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use vigil_core::config::{ChatConfig, LlmConfig};
use vigil_core::{Intent, IntentCategory};
use vigil_intent::{IntentResolver, ResolveError};
use vigil_llm::LanguageBackend;
use vigil_monitor::{analyze_metrics, HealthDataProvider};

use crate::error::ChatError;
use crate::response::{self, ResponseGenerator};
use crate::session::{Role, Session};

/// Maximum accepted message length in characters.
const MAX_MESSAGE_LENGTH: usize = 2000;

/// Coordinates one conversation turn end to end.
pub struct ChatEngine {
    resolver: IntentResolver,
    provider: Arc<dyn HealthDataProvider>,
    responder: ResponseGenerator,
    config: ChatConfig,
}

impl ChatEngine {
    pub fn new(
        backend: Arc<dyn LanguageBackend>,
        provider: Arc<dyn HealthDataProvider>,
        llm_config: &LlmConfig,
        config: ChatConfig,
    ) -> Self {
        let resolver = IntentResolver::new(
            backend.clone(),
            Duration::from_secs(llm_config.request_timeout_secs),
        );
        Self {
            resolver,
            provider,
            responder: ResponseGenerator::new(backend),
            config,
        }
    }

    pub fn new_session(&self) -> Session {
        Session::new(self.config.max_history)
    }

    /// Handle one user message and return the assistant's reply.
    pub async fn handle_message(
        &self,
        session: &mut Session,
        message: &str,
    ) -> Result<String, ChatError> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ChatError::MessageTooLong(MAX_MESSAGE_LENGTH));
        }

        if trimmed.eq_ignore_ascii_case("clear history") {
            session.clear();
            return Ok("History cleared. What would you like to look at next?".to_string());
        }

        session.push(Role::User, trimmed);

        let mut intent = match self.resolver.resolve(trimmed).await {
            Ok(intent) => intent,
            Err(ResolveError::EmptyQuery) => return Err(ChatError::EmptyMessage),
        };
        session.context.apply(&mut intent);
        session.context.update(&intent);
        info!(category = ?intent.category, service = ?intent.service_name, followup = intent.is_followup, "Handling intent");

        let reply = match intent.category {
            IntentCategory::CheckHealth
            | IntentCategory::ServiceDetails
            | IntentCategory::MetricsAnalysis => self.handle_service_analysis(session, &intent).await,
            IntentCategory::ListServices => self.handle_list_services().await,
            IntentCategory::GeneralQuestion => self.handle_general_question(&intent).await,
            IntentCategory::CompareServices | IntentCategory::Troubleshoot => {
                response::unsupported(intent.category)
            }
        };

        session.push(Role::Assistant, reply.clone());
        Ok(reply)
    }

    async fn handle_service_analysis(&self, session: &Session, intent: &Intent) -> String {
        let Some(service_name) = intent.service_name.as_deref() else {
            return prompt_for_service(&session.recent_services());
        };
        let timeframe = intent.effective_timeframe();

        let entity_id = match self.provider.resolve_service_id(service_name).await {
            Ok(id) => id,
            Err(e) => {
                error!(service = service_name, error = %e, "Service lookup failed");
                return connection_trouble_text();
            }
        };

        let Some(entity_id) = entity_id else {
            return self.unknown_service_reply(service_name).await;
        };

        let problems = match self
            .provider
            .fetch_problems(Some(&entity_id), service_name, timeframe)
            .await
        {
            Ok(records) => vigil_correlate::correlate(records, Some(&entity_id), service_name),
            Err(e) => {
                error!(service = service_name, error = %e, "Problem fetch failed");
                Vec::new()
            }
        };
        let buckets = vigil_correlate::categorize(problems);

        let metrics = match self.provider.fetch_metrics(&entity_id, timeframe).await {
            Ok(bundle) => bundle,
            Err(e) => {
                error!(service = service_name, error = %e, "Metric fetch failed");
                Default::default()
            }
        };

        let insights = analyze_metrics(&metrics);
        self.responder
            .service_analysis(
                service_name,
                &metrics,
                &buckets,
                &insights,
                &timeframe.humanize(),
            )
            .await
    }

    /// Suggest close names when the backend knows no such service.
    async fn unknown_service_reply(&self, service_name: &str) -> String {
        let similar = match self.provider.list_services(100).await {
            Ok(services) => find_similar(service_name, &services),
            Err(_) => Vec::new(),
        };

        if similar.is_empty() {
            format!(
                "I couldn't find a service called '{service_name}'.\n\n\
                 Try 'show all services' to see what's available, or check the spelling."
            )
        } else {
            let suggestions: Vec<String> =
                similar.iter().take(3).map(|s| format!("- {s}")).collect();
            format!(
                "I couldn't find a service called '{service_name}'.\n\n\
                 Did you mean one of these?\n{}",
                suggestions.join("\n")
            )
        }
    }

    async fn handle_list_services(&self) -> String {
        match self.provider.list_services(self.config.list_limit).await {
            Ok(services) => response::service_list(&services),
            Err(e) => {
                error!(error = %e, "Service listing failed");
                connection_trouble_text()
            }
        }
    }

    async fn handle_general_question(&self, intent: &Intent) -> String {
        let query = intent.raw_query.to_lowercase();
        let wants_help = ["help", "what can you do", "how do i", "commands"]
            .iter()
            .any(|phrase| query.contains(phrase));
        if wants_help {
            return response::help_text().to_string();
        }
        self.responder.general_answer(&intent.raw_query).await
    }
}

fn prompt_for_service(recent: &[String]) -> String {
    if recent.is_empty() {
        "I'd be happy to check a service for you! Please tell me which service to analyze.\n\n\
         For example: 'Check ordercontroller' or 'How is payment-api doing?'"
            .to_string()
    } else {
        format!(
            "I'd be happy to check a service for you! Which service would you like me to analyze?\n\n\
             Recently mentioned: {}\n\n\
             Or you can say 'show all services' to see the full list.",
            recent.join(", ")
        )
    }
}

fn connection_trouble_text() -> String {
    "I couldn't reach the monitoring backend. Please check the connection settings and try again."
        .to_string()
}

/// Names similar to the requested one: containment either way, or any dash
/// segment of the request appearing in the candidate.
fn find_similar(service_name: &str, services: &[vigil_core::ServiceEntity]) -> Vec<String> {
    let target = service_name.to_lowercase();
    let mut similar = Vec::new();

    for service in services {
        let name = service.display_name.to_lowercase();
        if name.is_empty() {
            continue;
        }
        let direct = name.contains(&target) || target.contains(&name);
        let partial = target
            .split('-')
            .any(|part| !part.is_empty() && name.contains(part));
        if direct || partial {
            similar.push(service.display_name.clone());
        }
    }

    similar.truncate(5);
    similar
}
