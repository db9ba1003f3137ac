//! Error types for the chat server
//!
//! Fatal, connection-scoped errors only. User-level command errors (room
//! name taken, not in a room, ...) are protocol lines sent to the offending
//! client, never Rust errors. Uses thiserror for ergonomic definitions.

use thiserror::Error;

/// Connection-scoped fatal errors
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error on the transport (ends that connection only)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Lobby event channel is gone (server shutting down)
    #[error("Channel send error")]
    ChannelSend,
}

/// Message send errors
///
/// Occurs when attempting to send lines through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
