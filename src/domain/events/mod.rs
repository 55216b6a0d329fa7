use crate::domain::entities::{MessageSender, Priority, TicketStatus};
use chrono::{DateTime, Utc};

/// Changes published by the conversation store after they are persisted
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    TicketCreated {
        ticket_id: String,
        customer_id: String,
        timestamp: DateTime<Utc>,
    },
    MessageAppended {
        ticket_id: String,
        message_id: String,
        sender: MessageSender,
        timestamp: DateTime<Utc>,
    },
    TicketUpdated {
        ticket_id: String,
        status: TicketStatus,
        priority: Priority,
        version: u64,
        timestamp: DateTime<Utc>,
    },
}

impl StoreEvent {
    pub fn ticket_id(&self) -> &str {
        match self {
            StoreEvent::TicketCreated { ticket_id, .. }
            | StoreEvent::MessageAppended { ticket_id, .. }
            | StoreEvent::TicketUpdated { ticket_id, .. } => ticket_id,
        }
    }
}
