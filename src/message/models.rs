use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clock::format_time;
use crate::shared::AppError;

/// Reserved recipient meaning "everyone in the room"
pub const BROADCAST_TARGET: &str = "Todos";

/// Text of the status message emitted when a participant joins
pub const JOINED_TEXT: &str = "entra na sala...";

/// Text of the status message emitted when a participant is evicted
pub const LEFT_TEXT: &str = "sai da sala...";

/// Kinds of chat events kept in the log
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Public chat message
    Message,
    /// Visible only to sender and recipient
    PrivateMessage,
    /// System join/leave notice
    Status,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::PrivateMessage => "private_message",
            MessageKind::Status => "status",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(MessageKind::Message),
            "private_message" => Ok(MessageKind::PrivateMessage),
            "status" => Ok(MessageKind::Status),
            other => Err(AppError::InvalidMessage(format!(
                "unrecognized message type '{}'",
                other
            ))),
        }
    }
}

/// A chat event as stored in the append-only log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageModel {
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String, // HH:MM:SS, presentation only
}

impl MessageModel {
    /// Status message announcing that `name` entered the room
    pub fn joined(name: &str, at: DateTime<Utc>) -> Self {
        Self::status(name, JOINED_TEXT, at)
    }

    /// Status message announcing that `name` left the room
    pub fn left(name: &str, at: DateTime<Utc>) -> Self {
        Self::status(name, LEFT_TEXT, at)
    }

    fn status(name: &str, text: &str, at: DateTime<Utc>) -> Self {
        Self {
            from: name.to_string(),
            to: BROADCAST_TARGET.to_string(),
            text: text.to_string(),
            kind: MessageKind::Status,
            time: format_time(at),
        }
    }

    pub fn is_private(&self) -> bool {
        self.kind == MessageKind::PrivateMessage
    }
}

/// Unvalidated message as handed to the store; `kind` is still free text
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub from: String,
    pub to: String,
    pub text: String,
    pub kind: String,
}

impl NewMessage {
    pub fn new(from: &str, to: &str, text: &str, kind: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            text: text.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Checks the required fields and the message type, stamping the result with `at`
    pub fn validate(self, at: DateTime<Utc>) -> Result<MessageModel, AppError> {
        require_non_empty("from", &self.from)?;
        require_non_empty("to", &self.to)?;
        require_non_empty("text", &self.text)?;
        let kind: MessageKind = self.kind.parse()?;

        if kind == MessageKind::PrivateMessage && self.to == BROADCAST_TARGET {
            return Err(AppError::InvalidMessage(
                "private messages need a named recipient".to_string(),
            ));
        }

        Ok(MessageModel {
            from: self.from,
            to: self.to,
            text: self.text,
            kind,
            time: format_time(at),
        })
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::InvalidMessage(format!("'{}' is required", field)));
    }
    Ok(())
}
