use super::message::Message;
use super::user::User;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Escalated,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Escalated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Escalated => "escalated",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "in-progress" | "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            "escalated" => Ok(TicketStatus::Escalated),
            other => Err(format!("Unknown ticket status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

pub const DEFAULT_CATEGORY: &str = "General Inquiry";

/// A customer's support case.
///
/// `id`, `customer_id` and `created_at` never change after creation. The customer
/// name and phone are a snapshot taken when the ticket is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub version: u64,
}

impl Ticket {
    /// Open a fresh ticket for `customer` with the default triage values
    pub fn open_for(id: impl Into<String>, customer: &User) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone().unwrap_or_default(),
            status: TicketStatus::Open,
            priority: Priority::Medium,
            category: DEFAULT_CATEGORY.to_string(),
            assigned_agent: None,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
            notes: None,
            version: 0,
        }
    }

    /// Non-resolved tickets receive the customer's inbound messages
    pub fn is_open(&self) -> bool {
        self.status != TicketStatus::Resolved
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub(crate) fn append_message(&mut self, message: Message, now: DateTime<Utc>) {
        self.messages.push(message);
        self.touch(now);
    }

    pub(crate) fn apply_update(&mut self, update: TicketUpdate, now: DateTime<Utc>) {
        let TicketUpdate {
            status,
            priority,
            category,
            assigned_agent,
            notes,
            customer_name,
            customer_phone,
            expected_version: _,
        } = update;

        if let Some(status) = status {
            self.status = status;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(agent) = assigned_agent {
            self.assigned_agent = Some(agent);
        }
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        if let Some(name) = customer_name {
            self.customer_name = name;
        }
        if let Some(phone) = customer_phone {
            self.customer_phone = phone;
        }

        self.touch(now);
    }

    // updated_at must strictly increase even when the clock has not moved
    fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.updated_at + Duration::microseconds(1);
        self.updated_at = if now > self.updated_at { now } else { floor };
        self.version += 1;
    }
}

/// Partial update of a ticket's mutable fields.
///
/// Immutable fields have no slot here; a serialized partial naming `id`,
/// `createdAt` or `customerId` fails to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TicketUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    /// Optimistic check: reject the update unless the ticket is still at this version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
}

impl TicketUpdate {
    pub fn status(status: TicketStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Default::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
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

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_assigned_agent(mut self, agent: impl Into<String>) -> Self {
        self.assigned_agent = Some(agent.into());
        self
    }

    pub fn expecting_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::user::UserRole;

    fn customer() -> User {
        User {
            id: "c1".to_string(),
            name: "Rahul Sharma".to_string(),
            role: UserRole::Customer,
            phone: Some("+919876543210".to_string()),
            username: None,
        }
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!("in-progress".parse::<TicketStatus>(), Ok(TicketStatus::InProgress));
        assert!("closed".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_open_for_snapshots_customer() {
        let ticket = Ticket::open_for("TKT-1", &customer());
        assert_eq!(ticket.customer_phone, "+919876543210");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, Priority::Medium);
        assert_eq!(ticket.category, DEFAULT_CATEGORY);
        assert!(ticket.is_open());
    }

    #[test]
    fn test_touch_is_strictly_increasing_with_frozen_clock() {
        let mut ticket = Ticket::open_for("TKT-1", &customer());
        let frozen = ticket.updated_at;
        ticket.apply_update(TicketUpdate::priority(Priority::High), frozen);
        let first = ticket.updated_at;
        ticket.apply_update(TicketUpdate::priority(Priority::Low), frozen);
        assert!(first > frozen);
        assert!(ticket.updated_at > first);
        assert_eq!(ticket.version, 2);
    }

    #[test]
    fn test_update_rejects_immutable_fields_when_deserialized() {
        let result = serde_json::from_str::<TicketUpdate>(r#"{"id":"TKT-9","status":"resolved"}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<TicketUpdate>(r#"{"customerId":"c2"}"#);
        assert!(result.is_err());

        let update: TicketUpdate = serde_json::from_str(r#"{"status":"escalated"}"#).unwrap();
        assert_eq!(update.status, Some(TicketStatus::Escalated));
    }
}
