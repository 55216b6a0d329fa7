#![allow(dead_code)]
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kruxdesk::domain::ports::time_service::TimeService;
use std::sync::Mutex;
use std::time::Duration;

/// Sleeps return immediately; every requested delay is recorded
#[derive(Default)]
pub struct InstantTime {
    requested: Mutex<Vec<Duration>>,
}

impl InstantTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl TimeService for InstantTime {
    async fn sleep(&self, duration: Duration) {
        self.requested.lock().unwrap().push(duration);
    }
}

/// Sleeps never finish, so only cancellation can end a pause
#[derive(Default)]
pub struct StalledTime;

#[async_trait]
impl TimeService for StalledTime {
    async fn sleep(&self, _duration: Duration) {
        futures::future::pending::<()>().await;
    }
}

/// The first `instant` sleeps return immediately, later ones never finish
pub struct StallAfter {
    remaining: Mutex<usize>,
}

impl StallAfter {
    pub fn new(instant: usize) -> Self {
        Self {
            remaining: Mutex::new(instant),
        }
    }
}

#[async_trait]
impl TimeService for StallAfter {
    async fn sleep(&self, _duration: Duration) {
        let stall = {
            let mut remaining = self.remaining.lock().unwrap();
            if *remaining == 0 {
                true
            } else {
                *remaining -= 1;
                false
            }
        };
        if stall {
            futures::future::pending::<()>().await;
        }
    }
}

/// Sleeps return immediately and the clock reads a fixed instant
pub struct FrozenTime {
    at: DateTime<Utc>,
}

impl FrozenTime {
    pub fn at(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

#[async_trait]
impl TimeService for FrozenTime {
    async fn sleep(&self, _duration: Duration) {}

    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
