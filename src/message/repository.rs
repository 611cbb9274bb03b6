use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::MessageModel;
use crate::shared::AppError;

/// Trait for the append-only message log
#[async_trait]
pub trait MessageRepository {
    /// Appends to the end of the log
    async fn append(&self, message: &MessageModel) -> Result<(), AppError>;

    /// The whole log in insertion order
    async fn list_all(&self) -> Result<Vec<MessageModel>, AppError>;
}

/// In-memory implementation of MessageRepository for development and testing
pub struct InMemoryMessageRepository {
    messages: RwLock<Vec<MessageModel>>,
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageRepository {
    /// Creates a new empty in-memory log
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Creates an in-memory log with pre-populated messages
    pub fn with_messages(messages: Vec<MessageModel>) -> Self {
        Self {
            messages: RwLock::new(messages),
        }
    }

    /// Returns the current number of messages in the log
    pub fn message_count(&self) -> usize {
        self.messages.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    #[instrument(skip(self, message), fields(from = %message.from, kind = %message.kind))]
    async fn append(&self, message: &MessageModel) -> Result<(), AppError> {
        let mut messages = self.messages.write().unwrap_or_else(|e| e.into_inner());
        messages.push(message.clone());

        debug!(position = messages.len(), "Message appended in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<MessageModel>, AppError> {
        let messages = self.messages.read().unwrap_or_else(|e| e.into_inner());
        Ok(messages.clone())
    }
}

/// PostgreSQL implementation of the message log; `id` is the insertion order
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    #[instrument(skip(self, message), fields(from = %message.from, kind = %message.kind))]
    async fn append(&self, message: &MessageModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO messages (sender, recipient, text, kind, time) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&message.from)
        .bind(&message.to)
        .bind(&message.text)
        .bind(message.kind.as_str())
        .bind(&message.time)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to append message to database");
            AppError::from(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<MessageModel>, AppError> {
        let rows =
            sqlx::query("SELECT sender, recipient, text, kind, time FROM messages ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Failed to read messages from database");
                    AppError::from(e)
                })?;

        rows.into_iter()
            .map(|row| -> Result<MessageModel, AppError> {
                let kind: String = row.get("kind");
                Ok(MessageModel {
                    from: row.get("sender"),
                    to: row.get("recipient"),
                    text: row.get("text"),
                    kind: kind.parse().map_err(|_| {
                        AppError::StorageFailure(format!("corrupt message kind '{}'", kind))
                    })?,
                    time: row.get("time"),
                })
            })
            .collect()
    }
}
