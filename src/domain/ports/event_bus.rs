use crate::domain::errors::DomainResult;
use crate::domain::events::StoreEvent;
use futures::Stream;
use std::pin::Pin;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StoreEvent, String>> + Send>>;

pub trait EventBus: Send + Sync {
    /// Publish an event to all subscribers
    fn publish(&self, event: StoreEvent) -> DomainResult<()>;

    /// Subscribe to events
    /// Returns a stream of events, abstracting away underlying transport errors
    fn subscribe(&self) -> EventStream;
}
