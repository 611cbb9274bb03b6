// Library crate for the chat room server
// This file exposes the public API for the binary and integration tests

pub mod clock;
pub mod config;
pub mod message;
pub mod participant;
pub mod presence;
pub mod shared;

use axum::{routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use message::{MessageKind, MessageModel, MessageService, NewMessage, BROADCAST_TARGET};
pub use participant::{ParticipantModel, ParticipantService};
pub use presence::{start_reaper_task, sweep_inactive_participants, ReaperConfig, SweepReport};
pub use shared::{AppError, AppState};

/// Builds the HTTP router over the given state
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/participants",
            post(participant::register_participant).get(participant::list_participants),
        )
        .route(
            "/messages",
            post(message::post_message).get(message::list_messages),
        )
        .route("/status", post(participant::heartbeat))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
