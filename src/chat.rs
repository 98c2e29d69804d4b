//! Append-only chat attached to a match.
//!
//! The referee writes its announcements under the [`ADMIN`] name and forwards the messages
//! players attach to their replies.

use serde::Serialize;

/// Name used for referee announcements
pub const ADMIN: &str = "Admin";

/// A single chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Author of the line, [`ADMIN`] for the referee
    pub name: String,
    /// Content of the line
    pub message: String,
}

/// Ordered chat lines. Lines can only be appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    /// Empty chat
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line written by `name`.
    pub fn push(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.messages.push(ChatMessage {
            name: name.into(),
            message: message.into(),
        });
    }

    /// Appends a line written by the referee.
    pub fn announce(&mut self, message: impl Into<String>) {
        self.push(ADMIN, message);
    }

    /// All lines, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing was said yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent line
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
