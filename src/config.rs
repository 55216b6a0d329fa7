use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub tickets_key: String,
    pub session_key: String,
    pub bot_name: String,
    pub agent_display_name: String,
    pub welcome_delay_ms: u64,
    pub typing_delay_ms: u64,
    pub typing_jitter_ms: u64,
    pub escalation_delay_ms: u64,
    pub event_bus_capacity: usize,
    pub service_name: String,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let tickets_key = env::var("TICKETS_KEY").unwrap_or_else(|_| "krux_tickets".to_string());

        let session_key = env::var("SESSION_KEY").unwrap_or_else(|_| "krux_user".to_string());

        let bot_name = env::var("BOT_NAME").unwrap_or_else(|_| "KRUX Bot".to_string());

        let agent_display_name =
            env::var("AGENT_DISPLAY_NAME").unwrap_or_else(|_| "Support Agent".to_string());

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "kruxdesk".to_string());

        let metrics_port = match env::var("METRICS_PORT") {
            Ok(port) => Some(port.parse().map_err(|_| ConfigError::InvalidPort)?),
            Err(_) => None,
        };

        Ok(Config {
            data_dir: PathBuf::from(data_dir),
            tickets_key,
            session_key,
            bot_name,
            agent_display_name,
            welcome_delay_ms: parse_var("WELCOME_DELAY_MS", 500)?,
            typing_delay_ms: parse_var("TYPING_DELAY_MS", 1000)?,
            typing_jitter_ms: parse_var("TYPING_JITTER_MS", 1000)?,
            escalation_delay_ms: parse_var("ESCALATION_DELAY_MS", 1500)?,
            event_bus_capacity: parse_var("EVENT_BUS_CAPACITY", 1000)?,
            service_name,
            metrics_port,
        })
    }

    pub fn welcome_delay(&self) -> Duration {
        Duration::from_millis(self.welcome_delay_ms)
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    pub fn typing_jitter(&self) -> Duration {
        Duration::from_millis(self.typing_jitter_ms)
    }

    pub fn escalation_delay(&self) -> Duration {
        Duration::from_millis(self.escalation_delay_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("{0} must be a non-negative integer")]
    InvalidNumber(&'static str),
}
