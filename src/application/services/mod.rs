pub mod conversation_store;
pub mod customer_chat_service;
pub mod dashboard_service;
pub mod session_service;

pub use conversation_store::*;
pub use customer_chat_service::*;
pub use dashboard_service::*;
pub use session_service::*;
