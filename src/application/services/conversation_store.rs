use crate::domain::entities::{Message, Ticket, TicketStatus, TicketUpdate};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::StoreEvent;
use crate::domain::ports::event_bus::EventBus;
use crate::domain::ports::key_value_store::KeyValueStore;
use crate::domain::ports::time_service::TimeService;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Single source of truth for tickets and their messages.
///
/// The whole collection is written back under `tickets_key` after every
/// mutation. Writers hold the write lock across that write, so mutations are
/// serialized and a failed write is rolled back before anyone can observe it.
pub struct ConversationStore {
    kv: Arc<dyn KeyValueStore>,
    tickets_key: String,
    tickets: RwLock<Vec<Ticket>>,
    active_ticket_id: RwLock<Option<String>>,
    event_bus: Option<Arc<dyn EventBus>>,
    time: Option<Arc<dyn TimeService>>,
}

impl ConversationStore {
    /// Hydrate from the blob stored under `tickets_key`.
    ///
    /// A missing, unreadable or corrupt blob yields an empty store.
    pub async fn open(kv: Arc<dyn KeyValueStore>, tickets_key: impl Into<String>) -> Self {
        let tickets_key = tickets_key.into();
        let tickets = load_tickets(kv.as_ref(), &tickets_key).await;

        Self {
            kv,
            tickets_key,
            tickets: RwLock::new(tickets),
            active_ticket_id: RwLock::new(None),
            event_bus: None,
            time: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<dyn EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Stamp `updatedAt` from `time` instead of the system clock
    pub fn with_time_service(mut self, time: Arc<dyn TimeService>) -> Self {
        self.time = Some(time);
        self
    }

    #[tracing::instrument(skip(self, ticket), fields(ticket_id = %ticket.id))]
    pub async fn create_ticket(&self, ticket: Ticket) -> DomainResult<Ticket> {
        let mut tickets = self.tickets.write().await;
        self.insert_locked(&mut tickets, ticket).await
    }

    /// Return the customer's non-resolved ticket, or insert `candidate` if there is none.
    ///
    /// The boolean is `true` when `candidate` was inserted.
    #[tracing::instrument(skip(self, candidate), fields(customer_id = %candidate.customer_id))]
    pub async fn find_or_create_open_ticket(
        &self,
        candidate: Ticket,
    ) -> DomainResult<(Ticket, bool)> {
        let mut tickets = self.tickets.write().await;

        if let Some(existing) = tickets
            .iter()
            .find(|t| t.customer_id == candidate.customer_id && t.is_open())
        {
            tracing::debug!("Resuming open ticket {}", existing.id);
            return Ok((existing.clone(), false));
        }

        let created = self.insert_locked(&mut tickets, candidate).await?;
        Ok((created, true))
    }

    #[tracing::instrument(skip(self, message), fields(message_id = %message.id))]
    pub async fn add_message(&self, ticket_id: &str, message: Message) -> DomainResult<Ticket> {
        check_message_target(ticket_id, &message)?;

        let mut tickets = self.tickets.write().await;
        let index = position(&tickets, ticket_id)?;
        check_new_message(&tickets[index], &message)?;

        let previous = tickets[index].clone();
        let event = appended_event(&message);
        let sender = message.sender;

        tickets[index].append_message(message, self.now());

        if let Err(e) = self.persist(&tickets).await {
            tickets[index] = previous;
            return Err(e);
        }

        metrics::counter!("kruxdesk_messages_appended_total", "sender" => sender.as_str())
            .increment(1);
        self.publish(event);

        Ok(tickets[index].clone())
    }

    /// Append `message` and apply the update derived from the ticket, as one mutation.
    ///
    /// Both changes are checked before either is made; a rejected update or a
    /// failed write leaves the ticket untouched.
    #[tracing::instrument(skip(self, message, update), fields(message_id = %message.id))]
    pub async fn add_message_with_update<F>(
        &self,
        ticket_id: &str,
        message: Message,
        update: F,
    ) -> DomainResult<Ticket>
    where
        F: FnOnce(&Ticket) -> TicketUpdate + Send,
    {
        check_message_target(ticket_id, &message)?;

        let mut tickets = self.tickets.write().await;
        let index = position(&tickets, ticket_id)?;
        check_new_message(&tickets[index], &message)?;

        let update = update(&tickets[index]);
        check_update(&tickets, index, &update)?;

        let previous = tickets[index].clone();
        let event = appended_event(&message);
        let sender = message.sender;

        let now = self.now();
        tickets[index].append_message(message, now);
        tickets[index].apply_update(update, now);

        if let Err(e) = self.persist(&tickets).await {
            tickets[index] = previous;
            return Err(e);
        }

        metrics::counter!("kruxdesk_messages_appended_total", "sender" => sender.as_str())
            .increment(1);
        self.publish(event);
        let updated = tickets[index].clone();
        self.publish_update(&updated);

        Ok(updated)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_ticket(&self, ticket_id: &str, update: TicketUpdate) -> DomainResult<Ticket> {
        let mut tickets = self.tickets.write().await;
        let index = position(&tickets, ticket_id)?;
        check_update(&tickets, index, &update)?;

        let previous = tickets[index].clone();
        tickets[index].apply_update(update, self.now());

        if let Err(e) = self.persist(&tickets).await {
            tickets[index] = previous;
            return Err(e);
        }

        let updated = tickets[index].clone();
        self.publish_update(&updated);

        Ok(updated)
    }

    /// Point the agent view at a ticket. Not persisted and not validated.
    pub async fn set_active_ticket(&self, ticket_id: Option<String>) {
        *self.active_ticket_id.write().await = ticket_id;
    }

    pub async fn active_ticket_id(&self) -> Option<String> {
        self.active_ticket_id.read().await.clone()
    }

    /// The active ticket; a pointer to a missing ticket resolves to `None`
    pub async fn active_ticket(&self) -> Option<Ticket> {
        let id = self.active_ticket_id().await?;
        self.get_ticket_by_id(&id).await
    }

    pub async fn get_ticket_by_id(&self, ticket_id: &str) -> Option<Ticket> {
        self.tickets
            .read()
            .await
            .iter()
            .find(|t| t.id == ticket_id)
            .cloned()
    }

    /// Snapshot of every ticket in creation order
    pub async fn list_tickets(&self) -> Vec<Ticket> {
        self.tickets.read().await.clone()
    }

    pub async fn find_open_ticket_for_customer(&self, customer_id: &str) -> Option<Ticket> {
        self.tickets
            .read()
            .await
            .iter()
            .find(|t| t.customer_id == customer_id && t.is_open())
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.tickets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tickets.read().await.is_empty()
    }

    async fn insert_locked(&self, tickets: &mut Vec<Ticket>, ticket: Ticket) -> DomainResult<Ticket> {
        if ticket.id.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Ticket id cannot be empty".to_string(),
            ));
        }

        if tickets.iter().any(|t| t.id == ticket.id) {
            return Err(DomainError::Conflict(format!(
                "Ticket {} already exists",
                ticket.id
            )));
        }

        if ticket.is_open() {
            if let Some(open) = tickets
                .iter()
                .find(|t| t.customer_id == ticket.customer_id && t.is_open())
            {
                return Err(DomainError::Conflict(format!(
                    "Customer {} already has open ticket {}",
                    ticket.customer_id, open.id
                )));
            }
        }

        tickets.push(ticket);

        if let Err(e) = self.persist(tickets).await {
            tickets.pop();
            return Err(e);
        }

        let created = tickets[tickets.len() - 1].clone();
        tracing::info!(
            "Created ticket {} for customer {}",
            created.id,
            created.customer_id
        );
        metrics::counter!("kruxdesk_tickets_created_total").increment(1);
        self.publish(StoreEvent::TicketCreated {
            ticket_id: created.id.clone(),
            customer_id: created.customer_id.clone(),
            timestamp: created.created_at,
        });

        Ok(created)
    }

    async fn persist(&self, tickets: &[Ticket]) -> DomainResult<()> {
        let result = match serde_json::to_string(tickets) {
            Ok(blob) => self.kv.set(&self.tickets_key, &blob).await,
            Err(e) => Err(DomainError::from(e)),
        };

        if let Err(e) = &result {
            tracing::error!("Failed to persist tickets under {}: {}", self.tickets_key, e);
            metrics::counter!("kruxdesk_store_persist_failures_total").increment(1);
        }

        result
    }

    fn publish_update(&self, updated: &Ticket) {
        tracing::debug!(
            "Ticket {} now {} / {} (version {})",
            updated.id,
            updated.status,
            updated.priority,
            updated.version
        );
        self.publish(StoreEvent::TicketUpdated {
            ticket_id: updated.id.clone(),
            status: updated.status,
            priority: updated.priority,
            version: updated.version,
            timestamp: updated.updated_at,
        });
    }

    fn now(&self) -> DateTime<Utc> {
        match &self.time {
            Some(time) => time.now(),
            None => Utc::now(),
        }
    }

    fn publish(&self, event: StoreEvent) {
        if let Some(bus) = &self.event_bus {
            if let Err(e) = bus.publish(event) {
                tracing::warn!("Failed to publish store event: {}", e);
            }
        }
    }
}

fn check_message_target(ticket_id: &str, message: &Message) -> DomainResult<()> {
    if message.ticket_id != ticket_id {
        return Err(DomainError::ValidationError(format!(
            "Message {} belongs to ticket {}, not {}",
            message.id, message.ticket_id, ticket_id
        )));
    }
    Message::validate_content(&message.content).map_err(DomainError::ValidationError)
}

fn check_new_message(ticket: &Ticket, message: &Message) -> DomainResult<()> {
    if ticket.messages.iter().any(|m| m.id == message.id) {
        return Err(DomainError::Conflict(format!(
            "Message {} already exists in ticket {}",
            message.id, ticket.id
        )));
    }
    Ok(())
}

/// Version check, and no re-opening a ticket while the customer has another open one
fn check_update(tickets: &[Ticket], index: usize, update: &TicketUpdate) -> DomainResult<()> {
    let ticket = &tickets[index];

    if let Some(expected) = update.expected_version {
        if ticket.version != expected {
            return Err(DomainError::Conflict(format!(
                "Ticket {} is at version {}, expected {}",
                ticket.id, ticket.version, expected
            )));
        }
    }

    let reopening =
        !ticket.is_open() && update.status.is_some_and(|s| s != TicketStatus::Resolved);
    if reopening {
        if let Some(open) = tickets
            .iter()
            .find(|t| t.customer_id == ticket.customer_id && t.is_open())
        {
            return Err(DomainError::Conflict(format!(
                "Customer {} already has open ticket {}",
                ticket.customer_id, open.id
            )));
        }
    }

    Ok(())
}

fn appended_event(message: &Message) -> StoreEvent {
    StoreEvent::MessageAppended {
        ticket_id: message.ticket_id.clone(),
        message_id: message.id.clone(),
        sender: message.sender,
        timestamp: message.timestamp,
    }
}

fn position(tickets: &[Ticket], ticket_id: &str) -> DomainResult<usize> {
    tickets
        .iter()
        .position(|t| t.id == ticket_id)
        .ok_or_else(|| DomainError::NotFound(format!("Ticket {} not found", ticket_id)))
}

async fn load_tickets(kv: &dyn KeyValueStore, key: &str) -> Vec<Ticket> {
    let blob = match kv.get(key).await {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            tracing::debug!("No persisted tickets under {}, starting empty", key);
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!("Could not read persisted tickets under {}: {}", key, e);
            return Vec::new();
        }
    };

    let loaded: Vec<Ticket> = match serde_json::from_str(&blob) {
        Ok(tickets) => tickets,
        Err(e) => {
            tracing::warn!("Discarding corrupt ticket blob under {}: {}", key, e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let tickets: Vec<Ticket> = loaded
        .into_iter()
        .filter(|t| {
            let first = seen.insert(t.id.clone());
            if !first {
                tracing::warn!("Dropping duplicate ticket {} from persisted blob", t.id);
            }
            first
        })
        .collect();

    tracing::info!("Loaded {} tickets from {}", tickets.len(), key);
    tickets
}
