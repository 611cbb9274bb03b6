use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::ParticipantModel,
    repository::{ParticipantRepository, RegisterResult},
};
use crate::{
    clock::Clock,
    message::{models::MessageModel, repository::MessageRepository},
    shared::AppError,
};

/// Service for the participant registry
pub struct ParticipantService {
    participants: Arc<dyn ParticipantRepository + Send + Sync>,
    messages: Arc<dyn MessageRepository + Send + Sync>,
    clock: Arc<dyn Clock>,
}

impl ParticipantService {
    pub fn new(
        participants: Arc<dyn ParticipantRepository + Send + Sync>,
        messages: Arc<dyn MessageRepository + Send + Sync>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            participants,
            messages,
            clock,
        }
    }

    /// Adds a participant to the room and announces the join.
    ///
    /// Registration and the join message are two separate steps: if the
    /// announcement fails the participant stays registered.
    #[instrument(skip(self))]
    pub async fn register(&self, name: &str) -> Result<ParticipantModel, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidParticipant("name is required".to_string()));
        }

        let now = self.clock.now();
        let candidate = ParticipantModel::new(name.to_string(), now);

        let participant = match self.participants.try_register(&candidate).await? {
            RegisterResult::Registered(participant) => participant,
            RegisterResult::AlreadyExists => {
                info!("Registration rejected, name already in the room");
                return Err(AppError::AlreadyExists(name.to_string()));
            }
        };

        if let Err(e) = self.messages.append(&MessageModel::joined(name, now)).await {
            warn!(error = %e, "Participant registered but join message was not stored");
            return Err(e);
        }

        info!("Participant joined the room");
        Ok(participant)
    }

    /// Refreshes the participant's last-seen time
    #[instrument(skip(self))]
    pub async fn heartbeat(&self, name: &str) -> Result<(), AppError> {
        if self.participants.touch(name, self.clock.now()).await? {
            debug!("Heartbeat recorded");
            Ok(())
        } else {
            debug!("Heartbeat from participant not in the room");
            Err(AppError::NotFound(format!("participant '{}'", name)))
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ParticipantModel>, AppError> {
        self.participants.list().await
    }

    #[instrument(skip(self))]
    pub async fn is_active(&self, name: &str) -> Result<bool, AppError> {
        self.participants.is_active(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::message::models::{MessageKind, BROADCAST_TARGET, JOINED_TEXT};
    use crate::message::repository::InMemoryMessageRepository;
    use crate::participant::repository::InMemoryParticipantRepository;
    use crate::shared::test_utils::{test_epoch, FailingMessageRepository};
    use chrono::Duration;

    struct Fixture {
        service: Arc<ParticipantService>,
        participants: Arc<InMemoryParticipantRepository>,
        messages: Arc<InMemoryMessageRepository>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let participants = Arc::new(InMemoryParticipantRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let clock = Arc::new(ManualClock::new(test_epoch()));
        let service = Arc::new(ParticipantService::new(
            participants.clone(),
            messages.clone(),
            clock.clone(),
        ));
        Fixture {
            service,
            participants,
            messages,
            clock,
        }
    }

    #[tokio::test]
    async fn test_register_announces_join() {
        let fixture = fixture();

        let participant = fixture.service.register("ana").await.unwrap();
        assert_eq!(participant.last_status, test_epoch());

        let log = fixture.messages.list_all().await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].from, "ana");
        assert_eq!(log[0].to, BROADCAST_TARGET);
        assert_eq!(log[0].text, JOINED_TEXT);
        assert_eq!(log[0].kind, MessageKind::Status);
        assert_eq!(log[0].time, "12:00:00");
    }

    #[tokio::test]
    async fn test_register_duplicate_reports_conflict_without_join_message() {
        let fixture = fixture();

        fixture.service.register("ana").await.unwrap();
        let result = fixture.service.register("ana").await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
        assert_eq!(fixture.messages.message_count(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_blank_name() {
        let fixture = fixture();

        for name in ["", "   "] {
            let result = fixture.service.register(name).await;
            assert!(matches!(result, Err(AppError::InvalidParticipant(_))));
        }
        assert_eq!(fixture.participants.participant_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_registration_yields_one_winner() {
        let fixture = fixture();

        let attempts = (0..16).map(|_| {
            let service = Arc::clone(&fixture.service);
            tokio::spawn(async move { service.register("same").await })
        });
        let results = futures::future::join_all(attempts).await;

        let mut successes = 0;
        for result in results {
            match result.unwrap() {
                Ok(_) => successes += 1,
                Err(AppError::AlreadyExists(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(fixture.messages.message_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registration_of_distinct_names() {
        let fixture = fixture();

        let attempts = (0..16).map(|i| {
            let service = Arc::clone(&fixture.service);
            tokio::spawn(async move { service.register(&format!("user-{i}")).await })
        });
        let results = futures::future::join_all(attempts).await;

        for result in results {
            assert!(result.unwrap().is_ok());
        }
        assert_eq!(fixture.participants.participant_count(), 16);
        assert_eq!(fixture.messages.message_count(), 16);
    }

    #[tokio::test]
    async fn test_heartbeat_refreshes_last_status() {
        let fixture = fixture();
        fixture.service.register("ana").await.unwrap();

        fixture.clock.advance(Duration::seconds(7));
        fixture.service.heartbeat("ana").await.unwrap();

        let participant = fixture.participants.get("ana").await.unwrap().unwrap();
        assert_eq!(participant.last_status, test_epoch() + Duration::seconds(7));
    }

    #[tokio::test]
    async fn test_heartbeat_unknown_participant() {
        let fixture = fixture();

        let result = fixture.service.heartbeat("ghost").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_join_message_leaves_participant_registered() {
        let participants = Arc::new(InMemoryParticipantRepository::new());
        let service = ParticipantService::new(
            participants.clone(),
            Arc::new(FailingMessageRepository),
            Arc::new(ManualClock::new(test_epoch())),
        );

        let result = service.register("ana").await;

        assert!(matches!(result, Err(AppError::StorageFailure(_))));
        assert!(participants.is_active("ana").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_and_is_active() {
        let fixture = fixture();
        fixture.service.register("ana").await.unwrap();
        fixture.service.register("bia").await.unwrap();

        assert_eq!(fixture.service.list().await.unwrap().len(), 2);
        assert!(fixture.service.is_active("bia").await.unwrap());
        assert!(!fixture.service.is_active("caio").await.unwrap());
    }
}
