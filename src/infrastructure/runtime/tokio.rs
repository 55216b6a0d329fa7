use crate::domain::ports::time_service::TimeService;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct TokioTimeService;

impl TokioTimeService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeService for TokioTimeService {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
