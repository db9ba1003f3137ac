//! Lobby actor implementation
//!
//! The central actor that owns all shared state: the client registry and the
//! room registry. Every state transition goes through `Lobby::run`, which
//! processes exactly one event at a time, so no locks are needed anywhere.
//!
//! Everything else in the process (read loops, write loops, relays, expiry
//! timers) only moves data through channels into or out of this loop.
//! Delivery awaits each recipient's bounded outbound queue, so one client
//! that stops reading can stall the whole lobby; the queue bound adds slack
//! but does not shed load.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::client::Client;
use crate::command::Command;
use crate::message::Message;
use crate::room::Room;
use crate::types::ClientId;

/// Hard cap on concurrently connected clients
pub const MAX_CLIENTS: usize = 10;

/// First line every admitted client receives
pub const MSG_CONNECT: &str = "Welcome to the server! Type \"/help\" to get a list of commands.\n";

pub const ERROR_SEND: &str = "Error: You cannot send messages in the lobby.\n";
pub const ERROR_CREATE: &str = "Error: A chat room with that name already exists.\n";
pub const ERROR_JOIN: &str = "Error: A chat room with that name does not exist.\n";
pub const ERROR_LEAVE: &str = "Error: You cannot leave the lobby.\n";

pub const NOTICE_DELETE: &str = "Notice: Chat room is inactive and being deleted.\n";

const HELP_LINES: [&str; 7] = [
    "/help - lists all commands\n",
    "/list - lists all chat rooms\n",
    "/create foo - creates a chat room named foo\n",
    "/join foo - joins a chat room named foo\n",
    "/leave - leaves the current chat room\n",
    "/name foo - changes your name to foo\n",
    "/quit - quits the program\n",
];

/// Room-wide notice that a client joined
pub fn notice_joined(name: &str) -> String {
    format!("Notice: \"{name}\" joined the chat room.\n")
}

/// Room-wide notice that a client left
pub fn notice_left(name: &str) -> String {
    format!("Notice: \"{name}\" left the chat room.\n")
}

/// Room-wide rename notice, addressed with the old name
pub fn notice_renamed(old: &str, new: &str) -> String {
    format!("Notice: \"{old}\" changed their name to \"{new}\".\n")
}

/// Personal rename acknowledgement for a roomless client
pub fn notice_name_changed(new: &str) -> String {
    format!("Notice: Changed name to \"{new}\".\n")
}

/// Personal acknowledgement that a room was created
pub fn notice_created(name: &str) -> String {
    format!("Notice: Created chat room \"{name}\".\n")
}

/// Events multiplexed into the lobby's dispatch loop
#[derive(Debug)]
pub enum LobbyEvent {
    /// New connection asking to be admitted. Carries the registry handle and
    /// the receiving end of the connection's inbound queue.
    Join {
        client: Client,
        inbound: mpsc::Receiver<Message>,
    },
    /// A parsed line from some connected client
    Incoming(Message),
    /// A client's inbound queue closed: its connection is gone
    Leave { client_id: ClientId },
    /// One-shot expiry wake-up for the named room
    Expire { room: String },
}

/// The lobby actor
///
/// Owns the client and room registries and a clone of its own event sender,
/// which admission relays and expiry timers feed back into.
pub struct Lobby {
    /// All connected clients: ClientId -> Client
    clients: HashMap<ClientId, Client>,
    /// All current rooms, keyed by their unique names
    rooms: HashMap<String, Room>,
    /// Event sender handed to relays and expiry timers
    events: mpsc::Sender<LobbyEvent>,
    /// Event receiver drained by `run`
    receiver: mpsc::Receiver<LobbyEvent>,
}

impl Lobby {
    /// Create a new lobby around the given event channel
    pub fn new(events: mpsc::Sender<LobbyEvent>, receiver: mpsc::Receiver<LobbyEvent>) -> Self {
        Self {
            clients: HashMap::new(),
            rooms: HashMap::new(),
            events,
            receiver,
        }
    }

    /// Run the lobby event loop
    ///
    /// Continuously receives and processes events until all senders are
    /// dropped. This loop is the only place registry state is mutated.
    pub async fn run(mut self) {
        info!("Lobby started");

        while let Some(event) = self.receiver.recv().await {
            self.handle_event(event).await;
        }

        info!("Lobby shutting down");
    }

    /// Process a single event
    async fn handle_event(&mut self, event: LobbyEvent) {
        match event {
            LobbyEvent::Join { client, inbound } => {
                self.handle_join(client, inbound).await;
            }
            LobbyEvent::Incoming(message) => {
                self.handle_incoming(message).await;
            }
            LobbyEvent::Leave { client_id } => {
                self.handle_leave(client_id).await;
            }
            LobbyEvent::Expire { room } => {
                self.handle_expire(room).await;
            }
        }
    }

    /// Admit a new connection, or reject it when at capacity.
    ///
    /// Rejection closes the connection without any in-protocol message and
    /// without registering the client. Admission sends the welcome line and
    /// spawns the relay that pipes the client's inbound queue into the event
    /// channel; when that queue closes, the relay raises `Leave`.
    async fn handle_join(&mut self, client: Client, mut inbound: mpsc::Receiver<Message>) {
        if self.clients.len() >= MAX_CLIENTS {
            info!("Client {} rejected, server full", client.id);
            client.quit();
            return;
        }

        let client_id = client.id;
        let _ = client.send(MSG_CONNECT.to_string()).await;
        self.clients.insert(client_id, client);
        info!("Client {} admitted ({} connected)", client_id, self.clients.len());

        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(message) = inbound.recv().await {
                if events.send(LobbyEvent::Incoming(message)).await.is_err() {
                    return;
                }
            }
            let _ = events.send(LobbyEvent::Leave { client_id }).await;
        });
    }

    /// Tear down a disconnected client: leave its room (with the usual
    /// notice), drop it from the registry. Dropping the handle closes the
    /// outbound queue; the write loop drains what is buffered and exits.
    async fn handle_leave(&mut self, client_id: ClientId) {
        let room_name = self
            .clients
            .get(&client_id)
            .and_then(|client| client.room.clone());
        if let Some(room_name) = room_name {
            self.room_leave(&room_name, client_id).await;
        }

        if self.clients.remove(&client_id).is_some() {
            info!("Client {} disconnected ({} connected)", client_id, self.clients.len());
        }
    }

    /// Classify one inbound line and act on it
    async fn handle_incoming(&mut self, message: Message) {
        // The sender may have disconnected between read and dispatch
        if !self.clients.contains_key(&message.sender) {
            return;
        }

        match Command::parse(&message.text) {
            Command::Create(name) => self.create_room(message.sender, name).await,
            Command::List => self.list_rooms(message.sender).await,
            Command::Join(name) => self.join_room(message.sender, name).await,
            Command::Leave => self.leave_room(message.sender).await,
            Command::Name(name) => self.change_name(message.sender, name).await,
            Command::Help => self.help(message.sender).await,
            Command::Quit => self.quit(message.sender),
            Command::Chat(_) => self.send_message(message).await,
        }
    }

    /// Broadcast a chat line to the sender's room, or complain to the sender
    async fn send_message(&mut self, message: Message) {
        let Some(client) = self.clients.get(&message.sender) else {
            return;
        };
        let Some(room_name) = client.room.clone() else {
            let _ = client.send(ERROR_SEND.to_string()).await;
            debug!("Client {} tried to send a message in the lobby", message.sender);
            return;
        };

        let line = message.render(&client.name);
        if let Some(room) = self.rooms.get_mut(&room_name) {
            room.broadcast(line, &self.clients).await;
            debug!("Client {} sent a message to {}", message.sender, room_name);
        }
    }

    /// Create a room, unless the name is already taken
    async fn create_room(&mut self, sender: ClientId, name: String) {
        let Some(client) = self.clients.get(&sender) else {
            return;
        };
        if self.rooms.contains_key(&name) {
            let _ = client.send(ERROR_CREATE.to_string()).await;
            debug!("Client {} tried to create duplicate room {:?}", sender, name);
            return;
        }

        let room = Room::new(name.clone());
        self.schedule_expiry(name.clone(), room.expiry());
        let _ = client.send(notice_created(&name)).await;
        info!("Client {} created room {:?}", sender, name);
        self.rooms.insert(name, room);
    }

    /// Join a room, leaving the current one first if necessary.
    ///
    /// The joiner gets the room's full history in order, then is added as a
    /// member, then the join notice is broadcast (so the joiner sees its own
    /// arrival, but exactly once).
    async fn join_room(&mut self, sender: ClientId, name: String) {
        if !self.rooms.contains_key(&name) {
            if let Some(client) = self.clients.get(&sender) {
                let _ = client.send(ERROR_JOIN.to_string()).await;
            }
            debug!("Client {} tried to join missing room {:?}", sender, name);
            return;
        }

        let current = self
            .clients
            .get(&sender)
            .and_then(|client| client.room.clone());
        if current.is_some() {
            self.leave_room(sender).await;
        }

        let joiner_name;
        {
            let Some(client) = self.clients.get_mut(&sender) else {
                return;
            };
            client.room = Some(name.clone());
            joiner_name = client.name.clone();
            if let Some(room) = self.rooms.get(&name) {
                for line in room.history() {
                    let _ = client.send(line.clone()).await;
                }
            }
        }

        if let Some(room) = self.rooms.get_mut(&name) {
            room.add_member(sender);
            room.broadcast(notice_joined(&joiner_name), &self.clients).await;
        }
        info!("Client {} joined room {:?}", sender, name);
    }

    /// Leave the current room, or complain if there is none
    async fn leave_room(&mut self, sender: ClientId) {
        let Some(client) = self.clients.get(&sender) else {
            return;
        };
        let Some(room_name) = client.room.clone() else {
            let _ = client.send(ERROR_LEAVE.to_string()).await;
            debug!("Client {} tried to leave the lobby", sender);
            return;
        };

        self.room_leave(&room_name, sender).await;
        info!("Client {} left room {:?}", sender, room_name);
    }

    /// Shared leave path: broadcast the notice while the leaver is still a
    /// member (so it hears its own departure), then remove it and clear the
    /// back-reference.
    async fn room_leave(&mut self, room_name: &str, client_id: ClientId) {
        let Some(leaver_name) = self.clients.get(&client_id).map(|c| c.name.clone()) else {
            return;
        };

        if let Some(room) = self.rooms.get_mut(room_name) {
            room.broadcast(notice_left(&leaver_name), &self.clients).await;
            room.remove_member(client_id);
        }
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.room = None;
        }
    }

    /// Change the client's display name.
    ///
    /// In a room the rename notice is broadcast addressed with the *old*
    /// name; roomless clients get a personal acknowledgement. The name is
    /// set unconditionally afterwards.
    async fn change_name(&mut self, sender: ClientId, new_name: String) {
        let Some(client) = self.clients.get(&sender) else {
            return;
        };

        match client.room.clone() {
            None => {
                let _ = client.send(notice_name_changed(&new_name)).await;
            }
            Some(room_name) => {
                let old_name = client.name.clone();
                if let Some(room) = self.rooms.get_mut(&room_name) {
                    room.broadcast(notice_renamed(&old_name, &new_name), &self.clients)
                        .await;
                }
            }
        }

        if let Some(client) = self.clients.get_mut(&sender) {
            debug!("Client {} changed name to {:?}", sender, new_name);
            client.name = new_name;
        }
    }

    /// Send the client the current room names, one per line
    async fn list_rooms(&mut self, sender: ClientId) {
        let Some(client) = self.clients.get(&sender) else {
            return;
        };

        let _ = client.send("\n".to_string()).await;
        let _ = client.send("Chat Rooms:\n".to_string()).await;
        for name in self.rooms.keys() {
            let _ = client.send(format!("{name}\n")).await;
        }
        let _ = client.send("\n".to_string()).await;
    }

    /// Send the client the static command summary
    async fn help(&mut self, sender: ClientId) {
        let Some(client) = self.clients.get(&sender) else {
            return;
        };

        let _ = client.send("\n".to_string()).await;
        let _ = client.send("Commands:\n".to_string()).await;
        for line in HELP_LINES {
            let _ = client.send(line.to_string()).await;
        }
        let _ = client.send("\n".to_string()).await;
    }

    /// Close the client's transport. The read loop exits, its inbound queue
    /// closes, and the relay raises `Leave`: the one teardown path shared
    /// with involuntary disconnects.
    fn quit(&self, sender: ClientId) {
        if let Some(client) = self.clients.get(&sender) {
            client.quit();
        }
    }

    /// Expiry wake-up: delete the room if its deadline has truly passed,
    /// otherwise re-arm a one-shot timer at the current deadline. Timers are
    /// never canceled; a stale wake-up is simply re-evaluated here.
    async fn handle_expire(&mut self, room_name: String) {
        let Some(room) = self.rooms.get(&room_name) else {
            return;
        };

        let deadline = room.expiry();
        if deadline > Instant::now() {
            debug!("Room {:?} still active, expiry rescheduled", room_name);
            self.schedule_expiry(room_name, deadline);
            return;
        }

        if let Some(room) = self.rooms.get_mut(&room_name) {
            room.broadcast(NOTICE_DELETE.to_string(), &self.clients).await;
            let members = room.members().to_vec();
            for id in members {
                if let Some(client) = self.clients.get_mut(&id) {
                    client.room = None;
                }
            }
        }
        self.rooms.remove(&room_name);
        info!("Deleted idle room {:?}", room_name);
    }

    /// Arm a one-shot wake-up that raises `Expire` for the room at the given
    /// deadline
    fn schedule_expiry(&self, room_name: String, deadline: Instant) {
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = events.send(LobbyEvent::Expire { room: room_name }).await;
        });
    }
}
