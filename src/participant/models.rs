use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the participants table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ParticipantModel {
    pub name: String,               // Claimed identity, unique and case-sensitive
    pub last_status: DateTime<Utc>, // Last heartbeat, or registration time
}

impl ParticipantModel {
    /// Creates a participant that was last seen at `now`
    pub fn new(name: String, now: DateTime<Utc>) -> Self {
        Self {
            name,
            last_status: now,
        }
    }

    /// A participant is stale when last seen strictly before the cutoff
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_status < cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_participant_uses_given_time() {
        let now = Utc::now();
        let participant = ParticipantModel::new("maria".to_string(), now);

        assert_eq!(participant.name, "maria");
        assert_eq!(participant.last_status, now);
    }

    #[test]
    fn test_staleness_is_strict() {
        let now = Utc::now();
        let participant = ParticipantModel::new("joao".to_string(), now);

        assert!(!participant.is_stale(now));
        assert!(participant.is_stale(now + Duration::milliseconds(1)));
        assert!(!participant.is_stale(now - Duration::seconds(1)));
    }
}
