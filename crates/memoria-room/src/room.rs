//! A single room.

use memoria_protocol::{ConnectionId, RoomId, RoomListEntry};

use crate::ROOM_CAPACITY;

/// One of the server's fixed rooms.
///
/// Only the registry mutates `players`; everyone else gets `&Room` or a
/// [`RoomListEntry`] copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: RoomId,
    name: String,
    players: Vec<ConnectionId>,
}

impl Room {
    pub(crate) fn new(id: RoomId, name: String) -> Self {
        Self {
            id,
            name,
            players: Vec::with_capacity(ROOM_CAPACITY),
        }
    }

    /// The room's id.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// The display label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Occupants in join order.
    pub fn players(&self) -> &[ConnectionId] {
        &self.players
    }

    /// Returns `true` if `id` sits in this room.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.players.contains(&id)
    }

    /// Returns `true` when no seat is left.
    pub fn is_full(&self) -> bool {
        self.players.len() >= ROOM_CAPACITY
    }

    /// Returns `true` when nobody sits here.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// The lobby view of this room.
    pub fn to_entry(&self) -> RoomListEntry {
        RoomListEntry {
            id: self.id,
            name: self.name.clone(),
            players: self.players.clone(),
        }
    }

    pub(crate) fn seat(&mut self, id: ConnectionId) {
        self.players.push(id);
    }

    /// Returns `false` if `id` was not seated.
    pub(crate) fn unseat(&mut self, id: ConnectionId) -> bool {
        let before = self.players.len();
        self.players.retain(|p| *p != id);
        self.players.len() != before
    }
}
