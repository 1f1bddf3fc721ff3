//! Per-conversation state.

use chrono::{DateTime, Utc};

use vigil_intent::ConversationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One exchange entry in the conversation history.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// State carried across turns of one conversation: the context used for
/// carry-over plus a bounded message history.
pub struct Session {
    pub context: ConversationContext,
    history: Vec<ChatTurn>,
    max_history: usize,
}

impl Session {
    pub fn new(max_history: usize) -> Self {
        Self {
            context: ConversationContext::new(),
            history: Vec::new(),
            max_history,
        }
    }

    /// Append a turn, discarding the oldest once the bound is reached.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(ChatTurn {
            role,
            content: content.into(),
            at: Utc::now(),
        });
        if self.history.len() > self.max_history {
            let excess = self.history.len() - self.max_history;
            self.history.drain(..excess);
        }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Drop history and context, as for an explicit "clear history".
    pub fn clear(&mut self) {
        self.history.clear();
        self.context.reset();
    }

    /// Service-like words from recent user turns, most recent first. Used to
    /// suggest candidates when a query names no service.
    pub fn recent_services(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for turn in self.history.iter().rev().take(10) {
            if turn.role != Role::User {
                continue;
            }
            for word in turn.content.to_lowercase().split_whitespace() {
                let word = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '_');
                let looks_like_service = ["api", "service", "controller"]
                    .iter()
                    .any(|suffix| word.contains(suffix) && word != *suffix);
                if looks_like_service && !seen.contains(&word.to_string()) {
                    seen.push(word.to_string());
                }
            }
        }
        seen.truncate(3);
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut s = Session::new(3);
        for i in 0..5 {
            s.push(Role::User, format!("message {i}"));
        }
        assert_eq!(s.history().len(), 3);
        assert_eq!(s.history()[0].content, "message 2");
        assert_eq!(s.history()[2].content, "message 4");
    }

    #[test]
    fn test_clear_empties_history() {
        let mut s = Session::new(10);
        s.push(Role::User, "check payment-api");
        s.clear();
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_recent_services_picks_service_like_words() {
        let mut s = Session::new(10);
        s.push(Role::User, "how is payment-api doing?");
        s.push(Role::Assistant, "payment-api looks healthy");
        s.push(Role::User, "and the ordercontroller?");

        let recent = s.recent_services();
        assert_eq!(recent, vec!["ordercontroller", "payment-api"]);
    }

    #[test]
    fn test_recent_services_ignores_bare_keywords() {
        let mut s = Session::new(10);
        s.push(Role::User, "which service should I check?");
        assert!(s.recent_services().is_empty());
    }
}
