//! Error types for the room layer.

use memoria_protocol::{ConnectionId, RoomId};

/// Why an admit or remove did not happen. None of these are faults: the
/// coordinator turns them into a rejection message or drops them.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The connection already sits in a room (possibly this one).
    #[error("connection {0} already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomId),

    /// The connection is not seated in this room.
    #[error("connection {0} not in room {1}")]
    NotInRoom(ConnectionId, RoomId),
}
