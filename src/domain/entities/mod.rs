pub mod bot_response;
pub mod message;
pub mod ticket;
pub mod user;

pub use bot_response::*;
pub use message::*;
pub use ticket::*;
pub use user::*;
