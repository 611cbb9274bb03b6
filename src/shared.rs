use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::message::repository::{InMemoryMessageRepository, MessageRepository};
use crate::participant::repository::{InMemoryParticipantRepository, ParticipantRepository};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub participant_repository: Arc<dyn ParticipantRepository + Send + Sync>,
    pub message_repository: Arc<dyn MessageRepository + Send + Sync>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        participant_repository: Arc<dyn ParticipantRepository + Send + Sync>,
        message_repository: Arc<dyn MessageRepository + Send + Sync>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            participant_repository,
            message_repository,
            clock,
        }
    }

    /// State backed by in-memory stores and the system clock
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryParticipantRepository::new()),
            Arc::new(InMemoryMessageRepository::new()),
            Arc::new(SystemClock),
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Participant already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid participant: {0}")]
    InvalidParticipant(String),

    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageFailure(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AlreadyExists(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidMessage(msg) | AppError::InvalidParticipant(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
            AppError::StorageFailure(msg) => {
                tracing::error!(error = %msg, "Storage failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
