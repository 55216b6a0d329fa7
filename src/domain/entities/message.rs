use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message within a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    /// Older ticket blobs spell the customer side as "user"
    #[serde(alias = "user")]
    Customer,
    Bot,
    Agent,
}

impl MessageSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSender::Customer => "customer",
            MessageSender::Bot => "bot",
            MessageSender::Agent => "agent",
        }
    }
}

impl std::fmt::Display for MessageSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One utterance within a ticket; never mutated once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub ticket_id: String,
    pub sender: MessageSender,
    pub sender_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        ticket_id: impl Into<String>,
        sender: MessageSender,
        sender_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            // v7 ids sort in generation order
            id: Uuid::now_v7().to_string(),
            ticket_id: ticket_id.into(),
            sender,
            sender_name: sender_name.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn from_customer(
        ticket_id: impl Into<String>,
        customer_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(ticket_id, MessageSender::Customer, customer_name, content)
    }

    pub fn from_bot(
        ticket_id: impl Into<String>,
        bot_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(ticket_id, MessageSender::Bot, bot_name, content)
    }

    pub fn from_agent(
        ticket_id: impl Into<String>,
        agent_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(ticket_id, MessageSender::Agent, agent_name, content)
    }

    /// Validate message content before it is appended
    pub fn validate_content(content: &str) -> Result<(), String> {
        if content.trim().is_empty() {
            return Err("Message content cannot be empty".to_string());
        }
        Ok(())
    }
}
