//! Client handle definition
//!
//! Represents a connected client as seen from the lobby: display name,
//! current room, the outbound queue feeding its write loop, and the quit
//! signal that closes its transport.

use std::sync::Arc;

use tokio::sync::{mpsc, Notify};

use crate::error::SendError;
use crate::types::ClientId;

/// Display name every client starts with
pub const DEFAULT_NAME: &str = "Anonymous";

/// Connected client state, owned by the lobby registry
///
/// The connection actor keeps the socket; the lobby keeps this handle.
/// Dropping the handle closes the outbound queue, which is the signal for
/// the client's write loop to drain and exit.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for this client
    pub id: ClientId,
    /// Display name, `"Anonymous"` until changed with `/name`
    pub name: String,
    /// Name of the room this client is currently in, if any
    pub room: Option<String>,
    /// Lobby → write-loop queue of raw protocol lines
    outbound: mpsc::Sender<String>,
    /// Fired to make the connection actor close its transport
    quit: Arc<Notify>,
}

impl Client {
    /// Create a new client handle with the default name and no room
    pub fn new(id: ClientId, outbound: mpsc::Sender<String>, quit: Arc<Notify>) -> Self {
        Self {
            id,
            name: DEFAULT_NAME.to_string(),
            room: None,
            outbound,
            quit,
        }
    }

    /// Queue a raw line for this client's write loop
    ///
    /// Waits if the outbound queue is full; errors if the write loop is gone.
    pub async fn send(&self, line: String) -> Result<(), SendError> {
        self.outbound
            .send(line)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Tell the connection actor to close the transport.
    ///
    /// This is the single disconnect trigger: the read loop exits, its
    /// inbound queue closes, and the normal leave cascade runs from there.
    pub fn quit(&self) {
        self.quit.notify_one();
    }
}
