pub mod event_bus;
pub mod key_value_store;
pub mod time_service;
