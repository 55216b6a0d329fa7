use serde::{Deserialize, Serialize};

/// Canned reply chosen by the intent router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotResponse {
    pub message: String,
    /// Quick-reply choices offered to the customer; empty when there are none
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Hand the conversation over to a human agent
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub escalate: bool,
}

impl BotResponse {
    pub fn with_options(message: impl Into<String>, options: &[&str]) -> Self {
        Self {
            message: message.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            escalate: false,
        }
    }

    pub fn escalation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            options: Vec::new(),
            escalate: true,
        }
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}
