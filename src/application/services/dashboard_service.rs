use crate::application::services::conversation_store::ConversationStore;
use crate::domain::entities::{Message, Priority, Ticket, TicketStatus, TicketUpdate, User};
use crate::domain::errors::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Replies an agent can drop into the reply box with one click
pub const CANNED_REPLIES: [&str; 5] = [
    "Thank you for contacting KRUX Finance. How can I help you today?",
    "I'll need to check your application details. Please hold on for a moment.",
    "Your application is currently under review. We'll update you within 24 hours.",
    "Could you please provide your Application ID for faster assistance?",
    "I've escalated your request to our senior team. They'll contact you shortly.",
];

/// Queue filter. An empty query matches every ticket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketFilter {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl TicketFilter {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Name, id and message text match case-insensitively; phone numbers match as typed
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != ticket.priority) {
            return false;
        }

        let query = self.query.trim();
        if query.is_empty() {
            return true;
        }
        let lowered = query.to_lowercase();

        ticket.customer_name.to_lowercase().contains(&lowered)
            || ticket.id.to_lowercase().contains(&lowered)
            || ticket.customer_phone.contains(query)
            || ticket
                .messages
                .iter()
                .any(|m| m.content.to_lowercase().contains(&lowered))
    }
}

/// One row of the agent's ticket queue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketSummary {
    pub id: String,
    pub customer_name: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub preview: String,
    pub updated: String,
    pub assigned_agent: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub escalated: usize,
    pub urgent: usize,
}

/// One-click actions from the ticket side panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    Resolve,
    Escalate,
    MarkUrgent,
}

impl QuickAction {
    fn as_update(self) -> TicketUpdate {
        match self {
            QuickAction::Resolve => TicketUpdate::status(TicketStatus::Resolved),
            QuickAction::Escalate => TicketUpdate::status(TicketStatus::Escalated),
            QuickAction::MarkUrgent => TicketUpdate::priority(Priority::Urgent),
        }
    }
}

/// Relative age label: "Just now", "5m ago", "3h ago", "2d ago"
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}

#[derive(Clone)]
pub struct SupportDashboardService {
    store: Arc<ConversationStore>,
}

impl SupportDashboardService {
    pub fn new(store: Arc<ConversationStore>) -> Self {
        Self { store }
    }

    pub fn canned_replies(&self) -> &'static [&'static str] {
        &CANNED_REPLIES
    }

    pub async fn queue(&self, filter: &TicketFilter) -> Vec<Ticket> {
        self.store
            .list_tickets()
            .await
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect()
    }

    pub async fn summaries(&self, filter: &TicketFilter, now: DateTime<Utc>) -> Vec<TicketSummary> {
        let active = self.store.active_ticket_id().await;

        self.queue(filter)
            .await
            .into_iter()
            .map(|t| TicketSummary {
                preview: t
                    .last_message()
                    .map(|m| m.content.clone())
                    .unwrap_or_else(|| "No messages yet".to_string()),
                updated: time_ago(t.updated_at, now),
                is_active: active.as_deref() == Some(t.id.as_str()),
                id: t.id,
                customer_name: t.customer_name,
                priority: t.priority,
                status: t.status,
                assigned_agent: t.assigned_agent,
            })
            .collect()
    }

    pub async fn stats(&self) -> QueueStats {
        let tickets = self.store.list_tickets().await;
        let count = |status: TicketStatus| tickets.iter().filter(|t| t.status == status).count();

        QueueStats {
            total: tickets.len(),
            open: count(TicketStatus::Open),
            in_progress: count(TicketStatus::InProgress),
            resolved: count(TicketStatus::Resolved),
            escalated: count(TicketStatus::Escalated),
            urgent: tickets
                .iter()
                .filter(|t| t.priority == Priority::Urgent)
                .count(),
        }
    }

    /// Select a ticket for viewing and replying
    pub async fn open_ticket(&self, ticket_id: &str) -> DomainResult<Ticket> {
        let ticket = self
            .store
            .get_ticket_by_id(ticket_id)
            .await
            .ok_or_else(|| DomainError::NotFound(format!("Ticket {} not found", ticket_id)))?;
        self.store.set_active_ticket(Some(ticket.id.clone())).await;
        Ok(ticket)
    }

    pub async fn close_ticket(&self) {
        self.store.set_active_ticket(None).await;
    }

    pub async fn active_ticket(&self) -> Option<Ticket> {
        self.store.active_ticket().await
    }

    /// Post an agent reply. The ticket moves to in-progress and is assigned to
    /// the replying agent unless someone already owns it. Nothing is saved when
    /// the ticket cannot move to in-progress.
    #[tracing::instrument(skip(self, agent, text), fields(agent_id = %agent.id))]
    pub async fn reply(&self, agent: &User, ticket_id: &str, text: &str) -> DomainResult<Ticket> {
        if !agent.is_agent() {
            return Err(DomainError::Forbidden(
                "Only agents can reply to tickets".to_string(),
            ));
        }

        let text = text.trim();
        Message::validate_content(text).map_err(DomainError::ValidationError)?;

        let message = Message::from_agent(ticket_id, &agent.name, text);
        self.store
            .add_message_with_update(ticket_id, message, |ticket| {
                let update = TicketUpdate::status(TicketStatus::InProgress);
                match ticket.assigned_agent {
                    Some(_) => update,
                    None => update.with_assigned_agent(&agent.name),
                }
            })
            .await
    }

    pub async fn update_status(&self, ticket_id: &str, status: TicketStatus) -> DomainResult<Ticket> {
        self.store
            .update_ticket(ticket_id, TicketUpdate::status(status))
            .await
    }

    pub async fn update_priority(&self, ticket_id: &str, priority: Priority) -> DomainResult<Ticket> {
        self.store
            .update_ticket(ticket_id, TicketUpdate::priority(priority))
            .await
    }

    /// Replace the agent-private notes wholesale
    pub async fn save_notes(&self, ticket_id: &str, notes: &str) -> DomainResult<Ticket> {
        self.store
            .update_ticket(ticket_id, TicketUpdate::notes(notes))
            .await
    }

    pub async fn apply_quick_action(
        &self,
        ticket_id: &str,
        action: QuickAction,
    ) -> DomainResult<Ticket> {
        tracing::info!("Applying {:?} to ticket {}", action, ticket_id);
        self.store.update_ticket(ticket_id, action.as_update()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now, now), "Just now");
        assert_eq!(time_ago(now - Duration::seconds(59), now), "Just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
    }

    #[test]
    fn test_quick_actions_map_to_updates() {
        assert_eq!(
            QuickAction::Resolve.as_update().status,
            Some(TicketStatus::Resolved)
        );
        assert_eq!(
            QuickAction::MarkUrgent.as_update().priority,
            Some(Priority::Urgent)
        );
        assert_eq!(QuickAction::Escalate.as_update().priority, None);
    }
}
