// Public API - what other modules can use
pub use handlers::{heartbeat, list_participants, register_participant};
pub use models::ParticipantModel;
pub use service::ParticipantService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
