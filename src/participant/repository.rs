use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use super::models::ParticipantModel;
use crate::shared::AppError;

/// Result of attempting to register a participant
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterResult {
    /// The name was free and the participant is now present
    Registered(ParticipantModel),
    /// A participant with exactly this name is already present
    AlreadyExists,
}

/// Trait for participant registry operations
#[async_trait]
pub trait ParticipantRepository {
    /// Atomically checks the name is free and inserts the participant.
    /// Concurrent attempts with the same name see exactly one `Registered`.
    async fn try_register(&self, participant: &ParticipantModel)
        -> Result<RegisterResult, AppError>;

    async fn get(&self, name: &str) -> Result<Option<ParticipantModel>, AppError>;
    async fn list(&self) -> Result<Vec<ParticipantModel>, AppError>;

    /// Sets `last_status` for a present participant. Returns false if absent.
    async fn touch(&self, name: &str, at: DateTime<Utc>) -> Result<bool, AppError>;

    /// Removes the participant if present; removing an absent name is a no-op
    async fn evict(&self, name: &str) -> Result<(), AppError>;

    /// Removes the participant only if it is still stale at `cutoff`.
    /// Returns whether a participant was removed.
    async fn evict_if_stale(&self, name: &str, cutoff: DateTime<Utc>) -> Result<bool, AppError>;

    async fn is_active(&self, name: &str) -> Result<bool, AppError> {
        Ok(self.get(name).await?.is_some())
    }
}

/// In-memory implementation of ParticipantRepository for development and testing
///
/// Participants are keyed by name, so uniqueness and presence checks are
/// hash lookups made under the same lock as the insert.
pub struct InMemoryParticipantRepository {
    participants: Mutex<HashMap<String, ParticipantModel>>,
}

impl Default for InMemoryParticipantRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryParticipantRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            participants: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated participants
    pub fn with_participants(participants: Vec<ParticipantModel>) -> Self {
        let map = participants
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();

        Self {
            participants: Mutex::new(map),
        }
    }

    /// Returns the current number of participants in the repository
    pub fn participant_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ParticipantModel>> {
        self.participants.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryParticipantRepository {
    #[instrument(skip(self, participant), fields(name = %participant.name))]
    async fn try_register(
        &self,
        participant: &ParticipantModel,
    ) -> Result<RegisterResult, AppError> {
        let mut participants = self.lock();
        if participants.contains_key(&participant.name) {
            debug!("Participant name already taken in memory");
            return Ok(RegisterResult::AlreadyExists);
        }
        participants.insert(participant.name.clone(), participant.clone());

        debug!("Participant registered in memory");
        Ok(RegisterResult::Registered(participant.clone()))
    }

    #[instrument(skip(self))]
    async fn get(&self, name: &str) -> Result<Option<ParticipantModel>, AppError> {
        Ok(self.lock().get(name).cloned())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<ParticipantModel>, AppError> {
        let participants = self.lock();
        debug!(count = participants.len(), "Listing participants in memory");
        Ok(participants.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn touch(&self, name: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let mut participants = self.lock();
        match participants.get_mut(name) {
            Some(participant) => {
                participant.last_status = at;
                debug!("Participant heartbeat recorded in memory");
                Ok(true)
            }
            None => {
                debug!("Heartbeat for unknown participant");
                Ok(false)
            }
        }
    }

    #[instrument(skip(self))]
    async fn evict(&self, name: &str) -> Result<(), AppError> {
        if self.lock().remove(name).is_some() {
            info!("Participant evicted from memory");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn evict_if_stale(&self, name: &str, cutoff: DateTime<Utc>) -> Result<bool, AppError> {
        let mut participants = self.lock();
        match participants.get(name) {
            Some(participant) if participant.is_stale(cutoff) => {
                participants.remove(name);
                info!("Stale participant evicted from memory");
                Ok(true)
            }
            Some(_) => {
                debug!("Participant refreshed since scan, keeping");
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

/// PostgreSQL implementation of the participant registry
///
/// Uniqueness is enforced by the primary key on `participants.name`.
pub struct PostgresParticipantRepository {
    pool: PgPool,
}

impl PostgresParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PostgresParticipantRepository {
    #[instrument(skip(self, participant), fields(name = %participant.name))]
    async fn try_register(
        &self,
        participant: &ParticipantModel,
    ) -> Result<RegisterResult, AppError> {
        let result = sqlx::query(
            "INSERT INTO participants (name, last_status) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(&participant.name)
        .bind(participant.last_status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to register participant in database");
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            debug!("Participant name already taken in database");
            return Ok(RegisterResult::AlreadyExists);
        }

        Ok(RegisterResult::Registered(participant.clone()))
    }

    #[instrument(skip(self))]
    async fn get(&self, name: &str) -> Result<Option<ParticipantModel>, AppError> {
        let participant = sqlx::query_as::<_, ParticipantModel>(
            "SELECT name, last_status FROM participants WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch participant from database");
            AppError::from(e)
        })?;

        Ok(participant)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<ParticipantModel>, AppError> {
        let participants =
            sqlx::query_as::<_, ParticipantModel>("SELECT name, last_status FROM participants")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Failed to list participants from database");
                    AppError::from(e)
                })?;

        Ok(participants)
    }

    #[instrument(skip(self))]
    async fn touch(&self, name: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE participants SET last_status = $2 WHERE name = $1")
            .bind(name)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to record heartbeat in database");
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn evict(&self, name: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM participants WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to evict participant from database");
                AppError::from(e)
            })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn evict_if_stale(&self, name: &str, cutoff: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM participants WHERE name = $1 AND last_status < $2")
            .bind(name)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to evict stale participant from database");
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
