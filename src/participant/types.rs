use serde::{Deserialize, Serialize};

use super::models::ParticipantModel;

/// Request payload for joining the room
#[derive(Debug, Deserialize)]
pub struct RegisterParticipantRequest {
    pub name: String,
}

/// Participant as listed to clients; `lastStatus` is epoch milliseconds
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ParticipantResponse {
    pub name: String,
    #[serde(rename = "lastStatus")]
    pub last_status: i64,
}

impl From<ParticipantModel> for ParticipantResponse {
    fn from(model: ParticipantModel) -> Self {
        Self {
            name: model.name,
            last_status: model.last_status.timestamp_millis(),
        }
    }
}
