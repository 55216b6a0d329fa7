use anyhow::Context;
use kruxdesk::bootstrap;
use kruxdesk::config::Config;
use kruxdesk::infrastructure::observability;
use kruxdesk::TicketFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing and metrics
    observability::init(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize observability: {}", e))?;
    tracing::info!("Configuration loaded");

    // Hydrate the store and wire services
    let state = bootstrap::build_app_state(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build application state: {}", e))?;

    match state.sessions.current_user().await {
        Some(user) => tracing::info!("Active session: {} ({})", user.name, user.role),
        None => tracing::info!("No active session"),
    }

    let stats = state.dashboard.stats().await;
    tracing::info!(
        total = stats.total,
        open = stats.open,
        in_progress = stats.in_progress,
        escalated = stats.escalated,
        resolved = stats.resolved,
        urgent = stats.urgent,
        "Ticket queue loaded"
    );

    for summary in state
        .dashboard
        .summaries(&TicketFilter::default(), chrono::Utc::now())
        .await
    {
        tracing::info!(
            "{} [{} / {}] {} - {} ({})",
            summary.id,
            summary.status,
            summary.priority,
            summary.customer_name,
            summary.preview.lines().next().unwrap_or_default(),
            summary.updated
        );
    }

    Ok(())
}
