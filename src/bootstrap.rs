use crate::application::services::*;
use crate::config::Config;
use crate::domain::ports::event_bus::EventBus;
use crate::domain::ports::key_value_store::KeyValueStore;
use crate::domain::ports::time_service::TimeService;
use crate::domain::services::intent_router::IntentRouter;
use crate::domain::services::ticket_ids::TicketIdGenerator;
use crate::infrastructure::runtime::TokioTimeService;
use crate::infrastructure::storage::LocalFileStore;
use crate::LocalEventBus;
use std::sync::Arc;

/// Everything a customer or agent surface needs, wired together
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<ConversationStore>,
    pub event_bus: Arc<LocalEventBus>,
    pub sessions: SessionService,
    pub chat: CustomerChatService,
    pub dashboard: SupportDashboardService,
}

/// Wire the services over the file-backed store configured in `config`
pub async fn build_app_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.data_dir)?;
    let kv = Arc::new(LocalFileStore::new(&config.data_dir)) as Arc<dyn KeyValueStore>;
    tracing::info!("Key-value store rooted at {}", config.data_dir.display());

    Ok(build_app_state_with(config, kv, Arc::new(TokioTimeService::new())).await)
}

/// Wire the services over an arbitrary key-value store and clock
pub async fn build_app_state_with(
    config: &Config,
    kv: Arc<dyn KeyValueStore>,
    time: Arc<dyn TimeService>,
) -> AppState {
    let event_bus = Arc::new(LocalEventBus::new(config.event_bus_capacity));
    tracing::info!(
        "Event bus initialized with capacity {}",
        config.event_bus_capacity
    );

    let store = Arc::new(
        ConversationStore::open(kv.clone(), config.tickets_key.clone())
            .await
            .with_event_bus(event_bus.clone() as Arc<dyn EventBus>)
            .with_time_service(time.clone()),
    );
    tracing::info!("Conversation store hydrated with {} tickets", store.len().await);

    let loaded = store.list_tickets().await;
    let ticket_ids = TicketIdGenerator::seeded_from(loaded.iter().map(|t| t.id.as_str()));

    let sessions = SessionService::new(
        kv,
        config.session_key.clone(),
        IdentityDirectory::with_demo_accounts(),
    );

    let chat = CustomerChatService::new(
        store.clone(),
        Arc::new(IntentRouter::default()),
        time,
        Arc::new(ticket_ids),
        ChatSettings::from_config(config),
    );
    tracing::info!("Customer chat service initialized");

    let dashboard = SupportDashboardService::new(store.clone());
    tracing::info!("Support dashboard service initialized");

    AppState {
        config: config.clone(),
        store,
        event_bus,
        sessions,
        chat,
        dashboard,
    }
}
