use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::ParticipantService,
    types::{ParticipantResponse, RegisterParticipantRequest},
};
use crate::message::requester_from;
use crate::shared::{AppError, AppState};

fn participant_service(state: &AppState) -> ParticipantService {
    ParticipantService::new(
        Arc::clone(&state.participant_repository),
        Arc::clone(&state.message_repository),
        Arc::clone(&state.clock),
    )
}

/// HTTP handler for joining the room
///
/// POST /participants
/// Returns 201, 409 when the name is taken, 422 when it is blank
#[instrument(name = "register_participant", skip(state))]
pub async fn register_participant(
    State(state): State<AppState>,
    Json(request): Json<RegisterParticipantRequest>,
) -> Result<StatusCode, AppError> {
    participant_service(&state).register(&request.name).await?;

    info!(name = %request.name, "Participant registered");

    Ok(StatusCode::CREATED)
}

/// HTTP handler for listing everyone currently in the room
///
/// GET /participants
#[instrument(name = "list_participants", skip(state))]
pub async fn list_participants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantResponse>>, AppError> {
    let participants = participant_service(&state).list().await?;

    info!(count = participants.len(), "Participants listed");

    Ok(Json(
        participants
            .into_iter()
            .map(ParticipantResponse::from)
            .collect(),
    ))
}

/// HTTP handler for the participant heartbeat
///
/// POST /status
/// Identity comes from the `User` header. Returns 200, or 404 when the caller is not in the room.
#[instrument(name = "heartbeat", skip(state, headers))]
pub async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let name = requester_from(&headers)
        .ok_or_else(|| AppError::NotFound("missing User header".to_string()))?;

    participant_service(&state).heartbeat(name).await?;

    Ok(StatusCode::OK)
}
