//! Multi-Room TCP Chat Server - Entry Point
//!
//! Starts the TCP listener and the Lobby actor, accepting connections.

use std::env;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use linechat::{handle_connection, Lobby};

/// Default server address
const DEFAULT_ADDR: &str = "127.0.0.1:3333";

/// Channel buffer size for lobby events
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=linechat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linechat=info")),
        )
        .init();

    // Get bind address from command line or use default
    let addr = env::args().nth(1).unwrap_or_else(|| DEFAULT_ADDR.to_string());

    // Start TCP listener; failing to bind is fatal
    let listener = TcpListener::bind(&addr).await?;
    info!("Chat server listening on {}", addr);

    // Create the Lobby actor channel and start it
    let (events_tx, events_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let lobby = Lobby::new(events_tx.clone(), events_rx);
    tokio::spawn(lobby.run());

    info!("Lobby actor started");

    // Connection accept loop; a single failed accept is not fatal
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let events_tx = events_tx.clone();

                // Spawn a connection actor for each client
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, events_tx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
