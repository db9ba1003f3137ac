//! Chat room state
//!
//! A `Room` is a named broadcast group: a membership list, an append-only
//! history of every line ever broadcast into it, and an idle-expiry
//! deadline. It is pure state owned by the lobby and only ever touched from
//! the lobby's dispatch loop, so it needs no synchronization of its own.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::client::Client;
use crate::types::ClientId;

/// How long a room may go without a broadcast before it is deleted
pub const EXPIRY_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A chat room: members, full broadcast history, and expiry deadline
#[derive(Debug)]
pub struct Room {
    /// Room name, the registry key; immutable after creation
    pub name: String,
    /// Current members, in join order
    members: Vec<ClientId>,
    /// Every line broadcast since creation, in order; replayed on join
    history: Vec<String>,
    /// Deadline after which the room is deleted; pushed back by every broadcast
    expiry: Instant,
}

impl Room {
    /// Create an empty room expiring one idle window from now
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: Vec::new(),
            history: Vec::new(),
            expiry: Instant::now() + EXPIRY_WINDOW,
        }
    }

    /// Current expiry deadline
    pub fn expiry(&self) -> Instant {
        self.expiry
    }

    /// Lines broadcast so far, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Current members in join order
    pub fn members(&self) -> &[ClientId] {
        &self.members
    }

    /// Whether the given client is a member
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.members.contains(&client_id)
    }

    /// Add a member; history replay is done by the caller before this
    pub fn add_member(&mut self, client_id: ClientId) {
        self.members.push(client_id);
    }

    /// Remove a member by identity; O(members) scan is fine at this scale
    pub fn remove_member(&mut self, client_id: ClientId) {
        self.members.retain(|id| *id != client_id);
    }

    /// Broadcast a line to every member and record it in history.
    ///
    /// Refreshes the expiry deadline first: any broadcast counts as
    /// activity. Delivery awaits each member's outbound queue in turn; a
    /// member whose queue is gone (mid-disconnect) is skipped.
    pub async fn broadcast(&mut self, line: String, clients: &HashMap<ClientId, Client>) {
        self.expiry = Instant::now() + EXPIRY_WINDOW;
        self.history.push(line.clone());
        for id in &self.members {
            if let Some(client) = clients.get(id) {
                let _ = client.send(line.clone()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::{mpsc, Notify};

    fn fake_client(clients: &mut HashMap<ClientId, Client>) -> (ClientId, mpsc::Receiver<String>) {
        let id = ClientId::new();
        let (tx, rx) = mpsc::channel(32);
        clients.insert(id, Client::new(id, tx, Arc::new(Notify::new())));
        (id, rx)
    }

    #[tokio::test]
    async fn test_room_starts_empty() {
        let room = Room::new("general".to_string());
        assert_eq!(room.name, "general");
        assert!(room.members().is_empty());
        assert!(room.history().is_empty());
    }

    #[tokio::test]
    async fn test_room_membership() {
        let mut room = Room::new("general".to_string());
        let a = ClientId::new();
        let b = ClientId::new();

        room.add_member(a);
        room.add_member(b);
        assert!(room.contains(a));
        assert!(room.contains(b));

        room.remove_member(a);
        assert!(!room.contains(a));
        assert!(room.contains(b));
        assert_eq!(room.members(), &[b]);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_members_and_appends_history() {
        let mut clients = HashMap::new();
        let (a, mut rx_a) = fake_client(&mut clients);
        let (b, mut rx_b) = fake_client(&mut clients);

        let mut room = Room::new("general".to_string());
        room.add_member(a);
        room.add_member(b);

        room.broadcast("one\n".to_string(), &clients).await;
        room.broadcast("two\n".to_string(), &clients).await;

        assert_eq!(rx_a.recv().await.unwrap(), "one\n");
        assert_eq!(rx_a.recv().await.unwrap(), "two\n");
        assert_eq!(rx_b.recv().await.unwrap(), "one\n");
        assert_eq!(rx_b.recv().await.unwrap(), "two\n");
        assert_eq!(room.history(), &["one\n".to_string(), "two\n".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_refreshes_expiry() {
        let clients = HashMap::new();
        let mut room = Room::new("general".to_string());
        let created = room.expiry();

        tokio::time::advance(Duration::from_secs(3600)).await;
        room.broadcast("ping\n".to_string(), &clients).await;

        assert_eq!(room.expiry(), created + Duration::from_secs(3600));
        assert!(room.expiry() > created);
    }

    #[tokio::test]
    async fn test_broadcast_skips_departed_member() {
        let mut clients = HashMap::new();
        let (a, mut rx_a) = fake_client(&mut clients);
        let gone = ClientId::new(); // never registered

        let mut room = Room::new("general".to_string());
        room.add_member(gone);
        room.add_member(a);

        room.broadcast("still here\n".to_string(), &clients).await;
        assert_eq!(rx_a.recv().await.unwrap(), "still here\n");
    }
}
