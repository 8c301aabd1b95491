//! Per-connection tasks: decode inbound frames, forward outbound events.
//!
//! Each accepted connection gets one reader task (this function) and
//! one writer task. The reader decodes frames into [`ClientCommand`]s
//! and feeds the lobby mailbox in arrival order; the writer drains the
//! connection's event channel into the socket. Neither task touches any
//! room state directly.

use tokio::sync::mpsc;
use trigrid_protocol::{ClientCommand, Codec, ConnectionId, JsonCodec};
use trigrid_transport::{Connection, WebSocketConnection};

use crate::TrigridError;
use crate::lobby::LobbyCommand;

/// Drop guard that reports the disconnect when the handler exits.
///
/// Cleanup must reach the lobby even if the handler panics. `Drop` is
/// synchronous, so delivery is a fire-and-forget task.
struct DisconnectGuard {
    conn: ConnectionId,
    lobby: mpsc::Sender<LobbyCommand>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let lobby = self.lobby.clone();
        let conn = self.conn;
        tokio::spawn(async move {
            let _ = lobby.send(LobbyCommand::Disconnected { conn }).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    lobby: mpsc::Sender<LobbyCommand>,
) -> Result<(), TrigridError> {
    let id = conn.id();
    let codec = JsonCodec;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    lobby
        .send(LobbyCommand::Connected { conn: id, sender: event_tx })
        .await
        .map_err(|_| TrigridError::LobbyClosed)?;
    let _guard = DisconnectGuard { conn: id, lobby: lobby.clone() };

    // Writer: drain lobby events into the socket.
    let writer_conn = conn.clone();
    let writer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(conn = %writer_conn.id(), error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    // Reader: decode frames and hand them to the lobby in arrival order.
    loop {
        match conn.recv().await {
            Ok(Some(data)) => match codec.decode::<ClientCommand>(&data) {
                Ok(cmd) => {
                    if lobby.send(LobbyCommand::Command { conn: id, cmd }).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    // Undecodable frames are the silent-ignore class:
                    // no state change, no reply.
                    tracing::debug!(conn = %id, error = %e, "dropping undecodable frame");
                }
            },
            Ok(None) => {
                tracing::debug!(conn = %id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(conn = %id, error = %e, "receive error");
                break;
            }
        }
    }

    writer.abort();
    // _guard drops here → Disconnected reaches the lobby.
    Ok(())
}
