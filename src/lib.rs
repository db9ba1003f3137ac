//! Multi-Room TCP Chat Server Library
//!
//! A line-oriented chat server where clients create, list and join named
//! rooms over plain TCP, built with the Actor pattern for state management.
//!
//! # Features
//! - Newline-terminated text protocol, one command or chat line per line
//! - Dynamically created rooms with full history replay on join
//! - Idle rooms expire after a fixed window without broadcasts
//! - Display names with room-wide rename notices
//! - Connection cap with silent admission control
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `Lobby` is the central actor owning the client and room registries
//! - Each connection runs independent read and write loops
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use linechat::{handle_connection, Lobby};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:3333").await.unwrap();
//!     let (events_tx, events_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(Lobby::new(events_tx.clone(), events_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let events_tx = events_tx.clone();
//!         tokio::spawn(handle_connection(stream, events_tx));
//!     }
//! }
//! ```

pub mod client;
pub mod command;
pub mod connection;
pub mod error;
pub mod lobby;
pub mod message;
pub mod room;
pub mod types;

// Re-export main types for convenience
pub use client::Client;
pub use command::Command;
pub use connection::handle_connection;
pub use error::{AppError, SendError};
pub use lobby::{Lobby, LobbyEvent, MAX_CLIENTS};
pub use message::Message;
pub use room::{Room, EXPIRY_WINDOW};
pub use types::ClientId;
