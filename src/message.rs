//! Chat message value type
//!
//! A `Message` is an immutable record of one line received from a client:
//! when it arrived, who sent it, and the text with its trailing newline
//! already stripped. The sender is referenced by id rather than by name so
//! that rendering can resolve the sender's *current* display name at
//! dispatch time.

use chrono::{DateTime, Local};

use crate::types::ClientId;

/// One chat line, stamped at read time by the sender's read loop.
#[derive(Debug, Clone)]
pub struct Message {
    /// Time the line was read off the socket
    pub timestamp: DateTime<Local>,
    /// Sender identity; the display name is looked up when rendering
    pub sender: ClientId,
    /// Line content, newline stripped
    pub text: String,
}

impl Message {
    /// Create a new message with the given timestamp, sender and text
    pub fn new(timestamp: DateTime<Local>, sender: ClientId, text: String) -> Self {
        Self {
            timestamp,
            sender,
            text,
        }
    }

    /// Canonical rendering: `"<time> - <senderName>: <text>\n"`
    ///
    /// The clock is a short 12-hour format with am/pm and no date,
    /// e.g. `3:04PM`.
    pub fn render(&self, sender_name: &str) -> String {
        format!(
            "{} - {}: {}\n",
            self.timestamp.format("%-I:%M%p"),
            sender_name,
            self.text
        )
    }
}
