//! The directory's record of a single connected client.

use std::time::Instant;

use memoria_protocol::{ConnectionId, RoomId, ServerMessage};
use tokio::sync::mpsc;

/// Channel sender for delivering outbound messages to a connection's
/// writer task.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Where a connection currently is.
///
/// ```text
///   Unassigned ──(join accepted)──→ InRoom(room)
///       ↑                               │
///       └──────────(leave)──────────────┘
/// ```
///
/// A disconnect removes the record entirely, whatever the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connected, not seated anywhere.
    Unassigned,

    /// Seated in exactly one room.
    InRoom(RoomId),
}

impl ConnectionState {
    /// The occupied room, if any.
    pub fn room(&self) -> Option<RoomId> {
        match self {
            Self::Unassigned => None,
            Self::InRoom(room_id) => Some(*room_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// A single connected client.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub state: ConnectionState,
    /// When the connection registered. Used for the session length in
    /// disconnect logs.
    pub connected_at: Instant,
    pub(crate) sender: OutboundSender,
}

impl Connection {
    pub(crate) fn new(id: ConnectionId, sender: OutboundSender) -> Self {
        Self {
            id,
            state: ConnectionState::Unassigned,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// Queues a message for this connection. Returns `false` if the
    /// writer task is gone.
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.sender.send(msg).is_ok()
    }
}
