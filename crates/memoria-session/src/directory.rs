//! The connection directory: every client connected right now.
//!
//! # Concurrency note
//!
//! `ConnectionDirectory` is NOT thread-safe by itself: it uses a plain
//! `HashMap`. It is owned by the session coordinator task and only ever
//! touched from there, which is what makes join/leave/disconnect
//! handling linearizable.

use std::collections::HashMap;

use memoria_protocol::{ConnectionId, RoomId, ServerMessage};

use crate::{Connection, ConnectionState, OutboundSender, SessionError};

/// Tracks active connections, their room state, and their outbound
/// channels.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ assign_room() ──→ clear_room() ──→ unregister()
///     │                                                  ▲
///     └──────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Default)]
pub struct ConnectionDirectory {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a newly connected client in the `Unassigned` state.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyRegistered`] if the id is active.
    pub fn register(
        &mut self,
        id: ConnectionId,
        sender: OutboundSender,
    ) -> Result<(), SessionError> {
        if self.connections.contains_key(&id) {
            return Err(SessionError::AlreadyRegistered(id));
        }
        self.connections.insert(id, Connection::new(id, sender));
        tracing::info!(
            connection_id = %id,
            active = self.connections.len(),
            "connection registered"
        );
        Ok(())
    }

    /// Removes a connection and returns the room it occupied.
    ///
    /// Unknown ids are a no-op returning `None`, so a duplicate
    /// disconnect event is harmless.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<RoomId> {
        let connection = self.connections.remove(&id)?;
        tracing::info!(
            connection_id = %id,
            connected_for = ?connection.connected_at.elapsed(),
            active = self.connections.len(),
            "connection unregistered"
        );
        connection.state.room()
    }

    /// Records that `id` now sits in `room_id`.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] for an unknown id.
    pub fn assign_room(
        &mut self,
        id: ConnectionId,
        room_id: RoomId,
    ) -> Result<(), SessionError> {
        let connection = self
            .connections
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        connection.state = ConnectionState::InRoom(room_id);
        Ok(())
    }

    /// Records that `id` no longer sits in any room.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] for an unknown id.
    pub fn clear_room(&mut self, id: ConnectionId) -> Result<(), SessionError> {
        let connection = self
            .connections
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        connection.state = ConnectionState::Unassigned;
        Ok(())
    }

    /// Returns the state of a connection, or `None` if it is not active.
    pub fn state(&self, id: ConnectionId) -> Option<ConnectionState> {
        self.connections.get(&id).map(|c| c.state)
    }

    /// Returns `true` if `id` is currently connected.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// All active connection ids, ascending.
    pub fn active_ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> =
            self.connections.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Queues `msg` for one connection. Silently drops the message if the
    /// connection is unknown or its writer is gone; the disconnect event
    /// that follows does the cleanup.
    pub fn send_to(&self, id: ConnectionId, msg: ServerMessage) {
        if let Some(connection) = self.connections.get(&id) {
            if !connection.send(msg) {
                tracing::trace!(connection_id = %id, "outbound channel closed");
            }
        }
    }

    /// Queues `msg` for every active connection.
    pub fn broadcast(&self, msg: &ServerMessage) {
        for connection in self.connections.values() {
            connection.send(msg.clone());
        }
    }

    /// Returns the number of active connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `ConnectionDirectory`, named
    //! `test_{function}_{scenario}_{expected}`.

    use super::*;
    use tokio::sync::mpsc;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    /// Registers `id` and hands back the receiving end of its channel.
    fn register(
        dir: &mut ConnectionDirectory,
        id: u64,
    ) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        dir.register(cid(id), tx).expect("register should succeed");
        rx
    }

    // =====================================================================
    // register()
    // =====================================================================

    #[test]
    fn test_register_new_connection_is_unassigned() {
        let mut dir = ConnectionDirectory::new();
        let _rx = register(&mut dir, 1);

        assert_eq!(dir.state(cid(1)), Some(ConnectionState::Unassigned));
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_register_duplicate_id_returns_error() {
        let mut dir = ConnectionDirectory::new();
        let _rx = register(&mut dir, 1);

        let (tx, _rx2) = mpsc::unbounded_channel();
        let result = dir.register(cid(1), tx);

        assert!(
            matches!(result, Err(SessionError::AlreadyRegistered(id)) if id == cid(1))
        );
        assert_eq!(dir.len(), 1);
    }

    // =====================================================================
    // unregister()
    // =====================================================================

    #[test]
    fn test_unregister_unassigned_returns_none() {
        let mut dir = ConnectionDirectory::new();
        let _rx = register(&mut dir, 1);

        assert_eq!(dir.unregister(cid(1)), None);
        assert!(dir.is_empty());
    }

    #[test]
    fn test_unregister_seated_returns_room() {
        let mut dir = ConnectionDirectory::new();
        let _rx = register(&mut dir, 1);
        dir.assign_room(cid(1), RoomId(4)).unwrap();

        assert_eq!(dir.unregister(cid(1)), Some(RoomId(4)));
        assert!(!dir.contains(cid(1)));
    }

    #[test]
    fn test_unregister_unknown_id_is_noop() {
        let mut dir = ConnectionDirectory::new();
        let _rx = register(&mut dir, 1);

        assert_eq!(dir.unregister(cid(99)), None);
        assert_eq!(dir.unregister(cid(99)), None);
        assert_eq!(dir.len(), 1);
    }

    // =====================================================================
    // assign_room() / clear_room()
    // =====================================================================

    #[test]
    fn test_assign_then_clear_room_round_trips_state() {
        let mut dir = ConnectionDirectory::new();
        let _rx = register(&mut dir, 1);

        dir.assign_room(cid(1), RoomId(2)).unwrap();
        assert_eq!(dir.state(cid(1)), Some(ConnectionState::InRoom(RoomId(2))));

        dir.clear_room(cid(1)).unwrap();
        assert_eq!(dir.state(cid(1)), Some(ConnectionState::Unassigned));
    }

    #[test]
    fn test_assign_room_unknown_id_returns_not_found() {
        let mut dir = ConnectionDirectory::new();
        let result = dir.assign_room(cid(5), RoomId(1));
        assert!(matches!(result, Err(SessionError::NotFound(id)) if id == cid(5)));
    }

    #[test]
    fn test_clear_room_unknown_id_returns_not_found() {
        let mut dir = ConnectionDirectory::new();
        assert!(dir.clear_room(cid(5)).is_err());
    }

    // =====================================================================
    // active_ids()
    // =====================================================================

    #[test]
    fn test_active_ids_sorted_ascending() {
        let mut dir = ConnectionDirectory::new();
        let _a = register(&mut dir, 9);
        let _b = register(&mut dir, 2);
        let _c = register(&mut dir, 5);

        assert_eq!(dir.active_ids(), vec![cid(2), cid(5), cid(9)]);
    }

    // =====================================================================
    // send_to() / broadcast()
    // =====================================================================

    #[test]
    fn test_send_to_reaches_only_target() {
        let mut dir = ConnectionDirectory::new();
        let mut rx1 = register(&mut dir, 1);
        let mut rx2 = register(&mut dir, 2);

        dir.send_to(cid(1), ServerMessage::RoomReset);

        assert_eq!(rx1.try_recv().unwrap(), ServerMessage::RoomReset);
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_reaches_everyone() {
        let mut dir = ConnectionDirectory::new();
        let mut rx1 = register(&mut dir, 1);
        let mut rx2 = register(&mut dir, 2);

        let msg = ServerMessage::PresenceUpdated {
            connections: dir.active_ids(),
        };
        dir.broadcast(&msg);

        assert_eq!(rx1.try_recv().unwrap(), msg);
        assert_eq!(rx2.try_recv().unwrap(), msg);
    }

    #[test]
    fn test_send_to_closed_receiver_does_not_panic() {
        let mut dir = ConnectionDirectory::new();
        let rx = register(&mut dir, 1);
        drop(rx);

        dir.send_to(cid(1), ServerMessage::RoomReset);
        dir.broadcast(&ServerMessage::RoomReset);
        assert!(dir.contains(cid(1)));
    }
}
