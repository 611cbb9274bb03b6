//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use roomchat::{MessageKind, MessageModel, BROADCAST_TARGET};

use roomchat::message::models::{JOINED_TEXT, LEFT_TEXT};

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessagesAssertion {
    messages: Vec<MessageModel>,
}

impl MessagesAssertion {
    pub fn of(messages: Vec<MessageModel>) -> Self {
        Self { messages }
    }

    /// Assert the message texts, in order
    pub fn has_texts(self, expected: &[&str]) -> Self {
        let texts: Vec<&str> = self.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, expected, "unexpected message texts");
        self
    }

    /// Assert exactly one join notice for `name`
    pub fn has_join_for(self, name: &str) -> Self {
        assert_eq!(self.status_count(name, JOINED_TEXT), 1, "{} should have joined once", name);
        self
    }

    /// Assert exactly one departure notice for `name`
    pub fn has_departure_for(self, name: &str) -> Self {
        assert_eq!(self.status_count(name, LEFT_TEXT), 1, "{} should have left once", name);
        self
    }

    pub fn has_no_departure_for(self, name: &str) -> Self {
        assert_eq!(self.status_count(name, LEFT_TEXT), 0, "{} should not have left", name);
        self
    }

    /// Assert no private message that `viewer` is not part of
    pub fn hides_foreign_private_messages(self, viewer: &str) -> Self {
        for message in &self.messages {
            if message.kind == MessageKind::PrivateMessage {
                assert!(
                    message.from == viewer || message.to == viewer,
                    "{} saw a private message between {} and {}",
                    viewer,
                    message.from,
                    message.to
                );
            }
        }
        self
    }

    fn status_count(&self, name: &str, text: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| {
                m.kind == MessageKind::Status
                    && m.from == name
                    && m.to == BROADCAST_TARGET
                    && m.text == text
            })
            .count()
    }
}
