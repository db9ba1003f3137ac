//! Per-connection actor
//!
//! Owns one TCP connection and runs its two I/O loops: a read loop that
//! turns socket lines into `Message`s on the inbound queue, and a write loop
//! that flushes raw lines from the outbound queue back to the socket.
//! Neither loop ever touches lobby state; everything goes through channels.
//!
//! Teardown is unified: whether the client sent `/quit` (quit signal fired
//! by the lobby) or the transport failed, the read loop exits and drops the
//! inbound sender. The lobby's relay sees the closed queue and raises the
//! Leave event, which in turn closes the outbound queue and lets the write
//! loop drain and exit.

use std::sync::Arc;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info};

use crate::client::Client;
use crate::error::AppError;
use crate::lobby::LobbyEvent;
use crate::message::Message;
use crate::types::ClientId;

/// Outbound queue depth per client. Broadcast delivery awaits this queue, so
/// a client that stops reading stalls the lobby once the slack runs out.
pub const OUTBOUND_BUFFER_SIZE: usize = 32;

/// Inbound queue depth per client
const INBOUND_BUFFER_SIZE: usize = 16;

/// Handle a new TCP connection for its whole lifetime.
///
/// Registers the client with the lobby, runs the read and write loops to
/// completion, and returns once the connection is fully torn down.
pub async fn handle_connection(
    stream: TcpStream,
    events: mpsc::Sender<LobbyEvent>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let client_id = ClientId::new();
    info!("Client {} connected from {}", client_id, peer_addr);

    let (read_half, write_half) = stream.into_split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER_SIZE);
    let (inbound_tx, inbound_rx) = mpsc::channel::<Message>(INBOUND_BUFFER_SIZE);
    let quit = Arc::new(Notify::new());

    let client = Client::new(client_id, outbound_tx, quit.clone());
    if events
        .send(LobbyEvent::Join {
            client,
            inbound: inbound_rx,
        })
        .await
        .is_err()
    {
        error!("Failed to register client {} - lobby closed", client_id);
        return Err(AppError::ChannelSend);
    }

    // Read loop: socket lines -> inbound queue. Exiting drops inbound_tx,
    // which closes the queue; that closure is the one disconnect signal.
    let read_task = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            tokio::select! {
                _ = quit.notified() => {
                    debug!("Client {} quit, closing transport", client_id);
                    break;
                }
                line = lines.next_line() => match line {
                    Ok(Some(text)) => {
                        let message = Message::new(Local::now(), client_id, text);
                        // A full inbound queue must not mask the quit signal
                        tokio::select! {
                            _ = quit.notified() => {
                                debug!("Client {} quit, closing transport", client_id);
                                break;
                            }
                            sent = inbound_tx.send(message) => {
                                if sent.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Ok(None) => {
                        debug!("Client {} closed the connection", client_id);
                        break;
                    }
                    Err(e) => {
                        debug!("Read error for client {}: {}", client_id, e);
                        break;
                    }
                },
            }
        }
        debug!("Read loop ended for {}", client_id);
    });

    // Write loop: outbound queue -> socket. Queue closure means drain what
    // is buffered, then exit.
    let write_task = tokio::spawn(async move {
        let mut writer = BufWriter::new(write_half);
        while let Some(line) = outbound_rx.recv().await {
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                debug!("Write error for client {}: {}", client_id, e);
                break;
            }
            if let Err(e) = writer.flush().await {
                debug!("Flush error for client {}: {}", client_id, e);
                break;
            }
        }
        debug!("Write loop ended for {}", client_id);
    });

    let _ = tokio::join!(read_task, write_task);
    info!("Client {} connection closed", client_id);

    Ok(())
}
