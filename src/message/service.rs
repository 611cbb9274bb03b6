use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{MessageKind, MessageModel, NewMessage},
    repository::MessageRepository,
    types::PostMessageRequest,
    visibility::{filter_visible, trailing_window},
};
use crate::{clock::Clock, participant::repository::ParticipantRepository, shared::AppError};

/// Service for the message log: validated appends and filtered, windowed reads
pub struct MessageService {
    participants: Arc<dyn ParticipantRepository + Send + Sync>,
    messages: Arc<dyn MessageRepository + Send + Sync>,
    clock: Arc<dyn Clock>,
}

impl MessageService {
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

    /// Validates and appends a message of any kind to the end of the log
    #[instrument(skip(self, message), fields(from = %message.from, kind = %message.kind))]
    pub async fn append(&self, message: NewMessage) -> Result<MessageModel, AppError> {
        let message = message.validate(self.clock.now())?;
        self.store(message).await
    }

    /// Posts a chat message on behalf of `sender`.
    ///
    /// Structural validation runs first, then the sender must be an active
    /// participant. Clients cannot post status messages.
    #[instrument(skip(self, request))]
    pub async fn post(
        &self,
        sender: &str,
        request: PostMessageRequest,
    ) -> Result<MessageModel, AppError> {
        let message = NewMessage {
            from: sender.to_string(),
            to: request.to,
            text: request.text,
            kind: request.kind,
        }
        .validate(self.clock.now())?;

        if message.kind == MessageKind::Status {
            return Err(AppError::InvalidMessage(
                "status messages are reserved for the system".to_string(),
            ));
        }

        if !self.participants.is_active(sender).await? {
            warn!("Message from inactive participant rejected");
            return Err(AppError::InvalidMessage(format!(
                "'{}' is not an active participant",
                sender
            )));
        }

        let message = self.store(message).await?;

        info!(to = %message.to, kind = %message.kind, "Message posted");
        Ok(message)
    }

    async fn store(&self, message: MessageModel) -> Result<MessageModel, AppError> {
        self.messages.append(&message).await?;

        debug!("Message appended");
        Ok(message)
    }

    /// The most recent `limit` messages visible to `requester`, oldest first
    #[instrument(skip(self))]
    pub async fn query(
        &self,
        requester: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<MessageModel>, AppError> {
        let log = self.messages.list_all().await?;
        let total = log.len();

        let visible = filter_visible(log, requester);
        let visible_count = visible.len();
        let window = trailing_window(visible, limit);

        debug!(
            total,
            visible = visible_count,
            returned = window.len(),
            "Messages queried"
        );
        Ok(window)
    }
}
