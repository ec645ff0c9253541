//! Per-connection handler: reads client frames and feeds the coordinator.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that drains the connection's outbound channel.
//! The flow is:
//!   1. Register with the coordinator (identity, presence, rooms go out)
//!   2. Loop: receive frames → decode → forward as coordinator commands
//!   3. On close or error: close the socket, then the drop guard
//!      announces the disconnect

use std::sync::Arc;

use memoria_deck::{FacePool, deal};
use memoria_protocol::{ClientMessage, Codec, ConnectionId, ServerMessage};
use memoria_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::MemoriaError;
use crate::coordinator::CoordinatorHandle;
use crate::server::ServerState;

/// Drop guard that disconnects a connection when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async send.
struct DisconnectGuard {
    id: ConnectionId,
    coordinator: CoordinatorHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let id = self.id;
        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            let _ = coordinator.disconnect(id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<P, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<P, C>>,
) -> Result<(), MemoriaError>
where
    P: FacePool,
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(write_outbound(
        Arc::clone(&conn),
        rx,
        state.codec.clone(),
    ));

    // Register and arm the guard together. If registration fails the
    // sender is dropped with the command and the writer stops on its own.
    state.coordinator.connect(conn_id, tx).await?;
    let _guard = DisconnectGuard {
        id: conn_id,
        coordinator: state.coordinator.clone(),
    };

    let result = read_frames(&conn, &state, conn_id).await;

    // Close our side before the guard fires.
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }

    // _guard drops here → disconnect fires.
    result
}

/// Receives frames until the peer goes away, dispatching each decoded
/// message.
async fn read_frames<P, C>(
    conn: &WebSocketConnection,
    state: &ServerState<P, C>,
    conn_id: ConnectionId,
) -> Result<(), MemoriaError>
where
    P: FacePool,
    C: Codec,
{
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Ok(());
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode frame");
                continue;
            }
        };

        dispatch(state, conn_id, msg).await?;
    }
}

/// Turns one client message into coordinator commands.
async fn dispatch<P, C>(
    state: &ServerState<P, C>,
    conn_id: ConnectionId,
    msg: ClientMessage,
) -> Result<(), MemoriaError>
where
    P: FacePool,
    C: Codec,
{
    match msg {
        ClientMessage::JoinRoom { room_id } => {
            state.coordinator.join_room(conn_id, room_id).await
        }
        ClientMessage::LeaveRoom { room_id } => {
            state.coordinator.leave_room(conn_id, room_id).await
        }
        ClientMessage::Relay(relay) => state.coordinator.relay(conn_id, relay).await,
        ClientMessage::NewGame => {
            // Pool I/O and shuffling happen here, not in the coordinator.
            let cards = match state.faces.faces().await {
                Ok(faces) => deal(&faces, &state.deck),
                Err(e) => Err(e),
            };
            match cards {
                Ok(cards) => state.coordinator.deal(conn_id, cards).await,
                Err(e) => {
                    tracing::warn!(%conn_id, error = %e, "could not deal a deck");
                    Ok(())
                }
            }
        }
    }
}

/// Writer task: encodes queued server messages onto the socket.
///
/// Ends when every sender is gone (the coordinator dropped the
/// connection) or the socket refuses a write.
async fn write_outbound<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    codec: C,
) {
    let conn_id = conn.id();
    while let Some(msg) = rx.recv().await {
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, writer stopping");
            break;
        }
    }
    tracing::trace!(%conn_id, "writer stopped");
}
