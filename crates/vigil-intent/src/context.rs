//! Conversation context carry-over.

use vigil_core::{Intent, IntentCategory, Timeframe};

/// What the previous turns established, used to complete terse follow-ups.
///
/// Carry-over is asymmetric on purpose. The service only carries when the new
/// turn repeats the previous category ("check payment-api" then "check
/// errors" stays on payment-api; a topic change does not). The timeframe
/// carries whenever the new turn names none: `Intent.timeframe` stays `None`
/// for such turns, so an explicit "2h" from the user is never mistaken for an
/// omission and never overridden.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    last_service: Option<String>,
    last_category: Option<IntentCategory>,
    last_timeframe: Timeframe,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self {
            last_service: None,
            last_category: None,
            last_timeframe: Timeframe::DEFAULT,
        }
    }
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill gaps in a freshly resolved intent from prior turns.
    pub fn apply(&self, intent: &mut Intent) {
        if intent.service_name.is_none()
            && self.last_category == Some(intent.category)
        {
            if let Some(service) = &self.last_service {
                intent.service_name = Some(service.clone());
                intent.is_followup = true;
            }
        }

        if intent.timeframe.is_none() {
            intent.timeframe = Some(self.last_timeframe);
        }
    }

    /// Record what this turn established. Absent fields leave the previous
    /// values in place.
    pub fn update(&mut self, intent: &Intent) {
        if let Some(service) = &intent.service_name {
            self.last_service = Some(service.clone());
        }
        self.last_category = Some(intent.category);
        if let Some(tf) = intent.timeframe {
            self.last_timeframe = tf;
        }
    }

    /// Forget everything, e.g. on "clear history".
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn last_service(&self) -> Option<&str> {
        self.last_service.as_deref()
    }
}
