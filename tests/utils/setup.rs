use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use roomchat::{
    build_router,
    message::repository::InMemoryMessageRepository,
    participant::repository::{InMemoryParticipantRepository, ParticipantRepository},
    AppState, ManualClock, ParticipantModel, ReaperConfig,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    pub participants: Arc<InMemoryParticipantRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub clock: Arc<ManualClock>,
    pub reaper: ReaperConfig,
}

pub struct TestSetupBuilder {
    participants: Vec<String>,
    start: DateTime<Utc>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            participants: vec![],
            start: Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap(),
        }
    }

    /// Participants already in the room (seen at the start time, no join messages)
    pub fn with_participants(mut self, names: Vec<&str>) -> Self {
        self.participants = names.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub async fn build(self) -> TestSetup {
        let participants = Arc::new(InMemoryParticipantRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let clock = Arc::new(ManualClock::new(self.start));

        for name in &self.participants {
            participants
                .try_register(&ParticipantModel::new(name.clone(), self.start))
                .await
                .unwrap();
        }

        let state = AppState::new(participants.clone(), messages.clone(), clock.clone());

        TestSetup {
            state,
            participants,
            messages,
            clock,
            reaper: ReaperConfig::default(),
        }
    }
}

impl TestSetup {
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }
}
