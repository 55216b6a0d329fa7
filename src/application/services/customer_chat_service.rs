use crate::application::services::conversation_store::ConversationStore;
use crate::config::Config;
use crate::domain::entities::{BotResponse, Message, Ticket, TicketStatus, TicketUpdate, User};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::time_service::TimeService;
use crate::domain::services::intent_router::{greeting_response, Intent, IntentRouter};
use crate::domain::services::ticket_ids::TicketIdGenerator;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Names and pacing used by the customer-facing bot
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub bot_name: String,
    pub agent_display_name: String,
    pub welcome_delay: Duration,
    pub typing_delay: Duration,
    pub typing_jitter: Duration,
    pub escalation_delay: Duration,
}

impl ChatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bot_name: config.bot_name.clone(),
            agent_display_name: config.agent_display_name.clone(),
            welcome_delay: config.welcome_delay(),
            typing_delay: config.typing_delay(),
            typing_jitter: config.typing_jitter(),
            escalation_delay: config.escalation_delay(),
        }
    }

    /// Simulated typing time: the base delay plus a uniform jitter
    fn typing_pause(&self) -> Duration {
        let jitter_ms = self.typing_jitter.as_millis() as u64;
        let extra = rand::thread_rng().gen_range(0..=jitter_ms);
        self.typing_delay + Duration::from_millis(extra)
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            bot_name: "KRUX Bot".to_string(),
            agent_display_name: "Support Agent".to_string(),
            welcome_delay: Duration::from_millis(500),
            typing_delay: Duration::from_millis(1000),
            typing_jitter: Duration::from_millis(1000),
            escalation_delay: Duration::from_millis(1500),
        }
    }
}

/// What happened to a customer message
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// The bot answered; its options are now the session's quick replies
    Answered {
        intent: Intent,
        response: BotResponse,
    },
    /// The bot handed over to an agent. `agent_joined` is false when the session
    /// closed before the agent greeting was due.
    Escalated {
        response: BotResponse,
        agent_joined: bool,
    },
    /// The session closed while the bot was typing; nothing was answered
    Cancelled,
}

#[derive(Clone)]
pub struct CustomerChatService {
    store: Arc<ConversationStore>,
    router: Arc<IntentRouter>,
    time: Arc<dyn TimeService>,
    ticket_ids: Arc<TicketIdGenerator>,
    settings: ChatSettings,
}

impl CustomerChatService {
    pub fn new(
        store: Arc<ConversationStore>,
        router: Arc<IntentRouter>,
        time: Arc<dyn TimeService>,
        ticket_ids: Arc<TicketIdGenerator>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            store,
            router,
            time,
            ticket_ids,
            settings,
        }
    }

    /// Attach `customer` to their open ticket, opening one if they have none.
    ///
    /// A ticket with no messages yet is greeted by the bot after the welcome
    /// delay. A welcome that cannot be saved is logged and the session is still
    /// returned; the next session on the same ticket tries again.
    #[tracing::instrument(skip(self, customer), fields(customer_id = %customer.id))]
    pub async fn open_session(&self, customer: &User) -> DomainResult<ChatSession> {
        if !customer.is_customer() {
            return Err(DomainError::Forbidden(
                "Only customers can open a chat session".to_string(),
            ));
        }

        let candidate = Ticket::open_for(self.ticket_ids.next_id(), customer);
        let (ticket, created) = self.store.find_or_create_open_ticket(candidate).await?;

        let session = ChatSession {
            ticket_id: ticket.id.clone(),
            customer: customer.clone(),
            created_ticket: created,
            store: self.store.clone(),
            router: self.router.clone(),
            time: self.time.clone(),
            settings: self.settings.clone(),
            cancel: CancellationToken::new(),
            quick_replies: RwLock::new(Vec::new()),
        };

        if created {
            tracing::info!("Customer opened ticket {}", session.ticket_id);
        } else {
            tracing::info!("Customer resumed ticket {}", session.ticket_id);
        }

        // A resumed ticket that never got its welcome gets it now
        if ticket.messages.is_empty() {
            if let Err(e) = session.send_welcome().await {
                tracing::warn!(
                    "Welcome message for ticket {} not sent: {}",
                    session.ticket_id,
                    e
                );
            }
        }

        Ok(session)
    }
}

/// A customer's live conversation with the bot.
///
/// Every delay the bot takes is raced against the session's cancellation
/// token; closing or dropping the session stops pending replies before they
/// reach the store.
pub struct ChatSession {
    ticket_id: String,
    customer: User,
    created_ticket: bool,
    store: Arc<ConversationStore>,
    router: Arc<IntentRouter>,
    time: Arc<dyn TimeService>,
    settings: ChatSettings,
    cancel: CancellationToken,
    quick_replies: RwLock<Vec<String>>,
}

impl ChatSession {
    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    pub fn customer(&self) -> &User {
        &self.customer
    }

    /// Whether opening this session created the ticket
    pub fn created_ticket(&self) -> bool {
        self.created_ticket
    }

    pub async fn ticket(&self) -> DomainResult<Ticket> {
        self.store
            .get_ticket_by_id(&self.ticket_id)
            .await
            .ok_or_else(|| DomainError::NotFound(format!("Ticket {} not found", self.ticket_id)))
    }

    pub async fn quick_replies(&self) -> Vec<String> {
        self.quick_replies.read().await.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!("Closing chat session for ticket {}", self.ticket_id);
            self.cancel.cancel();
        }
    }

    /// Post a customer message and wait for the bot's answer.
    #[tracing::instrument(skip(self, text), fields(ticket_id = %self.ticket_id))]
    pub async fn send_message(&self, text: &str) -> DomainResult<ReplyOutcome> {
        if self.is_closed() {
            return Err(DomainError::Conflict(format!(
                "Chat session for ticket {} is closed",
                self.ticket_id
            )));
        }

        let text = text.trim();
        Message::validate_content(text).map_err(DomainError::ValidationError)?;

        let inbound = Message::from_customer(&self.ticket_id, &self.customer.name, text);
        self.store.add_message(&self.ticket_id, inbound).await?;
        self.quick_replies.write().await.clear();

        if !self.pause(self.settings.typing_pause()).await {
            return Ok(ReplyOutcome::Cancelled);
        }

        let (intent, response) = self.router.route(text);
        let response = response.clone();
        tracing::debug!("Routed customer message to {}", intent);

        let reply = Message::from_bot(&self.ticket_id, &self.settings.bot_name, &response.message);

        if !response.escalate {
            self.store.add_message(&self.ticket_id, reply).await?;
            *self.quick_replies.write().await = response.options.clone();
            return Ok(ReplyOutcome::Answered { intent, response });
        }

        tracing::info!("Escalating ticket {} to a human agent", self.ticket_id);
        metrics::counter!("kruxdesk_escalations_total").increment(1);
        self.acknowledge_escalation(reply).await?;

        if !self.pause(self.settings.escalation_delay).await {
            return Ok(ReplyOutcome::Escalated {
                response,
                agent_joined: false,
            });
        }

        let greeting = Message::from_agent(
            &self.ticket_id,
            &self.settings.agent_display_name,
            format!(
                "Hello {}! I'm here to help you. What would you like to know about our loan services?",
                self.customer.name
            ),
        );
        self.store.add_message(&self.ticket_id, greeting).await?;

        Ok(ReplyOutcome::Escalated {
            response,
            agent_joined: true,
        })
    }

    /// Post the bot's hand-over message and mark the ticket escalated.
    ///
    /// A resolved ticket whose customer has since opened another one keeps its
    /// status; the acknowledgement is still posted.
    async fn acknowledge_escalation(&self, reply: Message) -> DomainResult<()> {
        let escalated = self
            .store
            .add_message_with_update(&self.ticket_id, reply.clone(), |_| {
                TicketUpdate::status(TicketStatus::Escalated)
            })
            .await;

        match escalated {
            Ok(_) => Ok(()),
            Err(DomainError::Conflict(reason)) => {
                tracing::warn!(
                    "Ticket {} left as is on escalation: {}",
                    self.ticket_id,
                    reason
                );
                self.store.add_message(&self.ticket_id, reply).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn send_welcome(&self) -> DomainResult<()> {
        if !self.pause(self.settings.welcome_delay).await {
            return Ok(());
        }

        let welcome = greeting_response();
        let message = Message::from_bot(&self.ticket_id, &self.settings.bot_name, &welcome.message);
        self.store.add_message(&self.ticket_id, message).await?;
        *self.quick_replies.write().await = welcome.options;
        Ok(())
    }

    /// Wait for `duration` unless the session closes first; true when the wait completed
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = self.time.sleep(duration) => !self.cancel.is_cancelled(),
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
