use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::MessageModel,
    service::MessageService,
    types::{MessagesQuery, PostMessageRequest},
};
use crate::shared::{AppError, AppState};

/// Header carrying the caller's claimed identity
pub const USER_HEADER: &str = "user";

/// Reads the claimed identity from the `User` header, if any
pub fn requester_from(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|name| !name.is_empty())
}

fn message_service(state: &AppState) -> MessageService {
    MessageService::new(
        Arc::clone(&state.participant_repository),
        Arc::clone(&state.message_repository),
        Arc::clone(&state.clock),
    )
}

/// HTTP handler for posting a chat message
///
/// POST /messages
/// Sender comes from the `User` header. Returns 201, or 422 when the message is
/// malformed or the sender is not in the room.
#[instrument(name = "post_message", skip(state, headers, request))]
pub async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PostMessageRequest>,
) -> Result<StatusCode, AppError> {
    let sender = requester_from(&headers).unwrap_or_default();
    info!(sender = %sender, "Posting message");

    message_service(&state).post(sender, request).await?;

    Ok(StatusCode::CREATED)
}

/// HTTP handler for reading the messages visible to the caller
///
/// GET /messages?limit=N
/// Returns the last N visible messages (all of them without a valid limit)
#[instrument(name = "list_messages", skip(state, headers))]
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageModel>>, AppError> {
    let requester = requester_from(&headers);
    let messages = message_service(&state)
        .query(requester, query.parsed_limit())
        .await?;

    info!(count = messages.len(), "Messages listed");

    Ok(Json(messages))
}
