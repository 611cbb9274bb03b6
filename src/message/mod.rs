// Public API - what other modules can use
pub use handlers::{list_messages, post_message, requester_from};
pub use models::{MessageKind, MessageModel, NewMessage, BROADCAST_TARGET};
pub use service::MessageService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
pub mod visibility;
