pub mod intent_router;
pub mod ticket_ids;

pub use intent_router::*;
pub use ticket_ids::*;
