//! Room registry: the fixed room list and admission control.

use memoria_protocol::{ConnectionId, RoomId, RoomListEntry};

use crate::{Room, RoomError};

/// Owns every room and decides who may sit where.
///
/// Rooms are created once from a name list and get ids `1..=n` in list
/// order. Two invariants hold after every call:
///
/// - no room seats more than [`ROOM_CAPACITY`](crate::ROOM_CAPACITY)
///   connections, and none twice;
/// - a connection sits in at most one room.
///
/// The registry is a plain struct with `&mut self` mutators. It is owned
/// by the session coordinator task, so admits and removes are applied one
/// at a time.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
    /// Bumped on every accepted mutation.
    version: u64,
}

impl RoomRegistry {
    /// Creates one empty room per name.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rooms: Vec<Room> = names
            .into_iter()
            .zip(1u64..)
            .map(|(name, id)| Room::new(RoomId(id), name.into()))
            .collect();
        tracing::info!(rooms = rooms.len(), "room registry created");
        Self { rooms, version: 0 }
    }

    /// All rooms in id order.
    pub fn list_rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Owned lobby view of every room, in id order.
    pub fn snapshot(&self) -> Vec<RoomListEntry> {
        self.rooms.iter().map(Room::to_entry).collect()
    }

    /// Looks up a room. `None` is an ordinary outcome (stale or bogus id).
    pub fn find_room(&self, id: RoomId) -> Option<&Room> {
        self.index_of(id).map(|i| &self.rooms[i])
    }

    /// Seats `conn` in `room_id`.
    ///
    /// Accepted iff the room exists, has a free seat, and `conn` sits in
    /// no room at all. A rejected admit changes nothing.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no such room
    /// - [`RoomError::AlreadyInRoom`]: `conn` is seated somewhere
    /// - [`RoomError::RoomFull`]: both seats are taken
    pub fn admit(
        &mut self,
        room_id: RoomId,
        conn: ConnectionId,
    ) -> Result<&Room, RoomError> {
        let index = self.index_of(room_id).ok_or(RoomError::NotFound(room_id))?;

        if let Some(current) = self.current_room(conn) {
            return Err(RoomError::AlreadyInRoom(conn, current));
        }

        let room = &mut self.rooms[index];
        if room.is_full() {
            return Err(RoomError::RoomFull(room_id));
        }

        room.seat(conn);
        self.version += 1;
        tracing::info!(
            %room_id,
            connection_id = %conn,
            players = room.players().len(),
            "connection admitted"
        );
        Ok(&self.rooms[index])
    }

    /// Unseats `conn` from `room_id`.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no such room
    /// - [`RoomError::NotInRoom`]: `conn` is not seated there
    pub fn remove(
        &mut self,
        room_id: RoomId,
        conn: ConnectionId,
    ) -> Result<&Room, RoomError> {
        let index = self.index_of(room_id).ok_or(RoomError::NotFound(room_id))?;

        let room = &mut self.rooms[index];
        if !room.unseat(conn) {
            return Err(RoomError::NotInRoom(conn, room_id));
        }

        self.version += 1;
        tracing::info!(
            %room_id,
            connection_id = %conn,
            players = room.players().len(),
            "connection removed"
        );
        Ok(&self.rooms[index])
    }

    /// The room `conn` sits in, if any.
    pub fn current_room(&self, conn: ConnectionId) -> Option<RoomId> {
        self.rooms
            .iter()
            .find(|room| room.contains(conn))
            .map(Room::id)
    }

    /// Mutation counter; changes whenever membership changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if the registry was built without rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Ids are dense from 1, so a room's slot is `id - 1`.
    fn index_of(&self, id: RoomId) -> Option<usize> {
        let index = usize::try_from(id.0.checked_sub(1)?).ok()?;
        (index < self.rooms.len()).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_new_assigns_ids_from_one_in_order() {
        let reg = RoomRegistry::new(["a", "b", "c"]);
        let ids: Vec<u64> = reg.list_rooms().iter().map(|r| r.id().0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(reg.find_room(RoomId(2)).unwrap().name(), "b");
        assert_eq!(reg.version(), 0);
    }

    #[test]
    fn test_find_room_out_of_range_is_none() {
        let reg = RoomRegistry::new(["a"]);
        assert!(reg.find_room(RoomId(0)).is_none());
        assert!(reg.find_room(RoomId(2)).is_none());
        assert!(reg.find_room(RoomId(u64::MAX)).is_none());
    }

    #[test]
    fn test_admit_bumps_version_and_records_current_room() {
        let mut reg = RoomRegistry::new(["a", "b"]);
        reg.admit(RoomId(2), cid(7)).unwrap();

        assert_eq!(reg.current_room(cid(7)), Some(RoomId(2)));
        assert_eq!(reg.version(), 1);
    }

    #[test]
    fn test_rejected_admit_leaves_version_unchanged() {
        let mut reg = RoomRegistry::new(["a"]);
        reg.admit(RoomId(1), cid(1)).unwrap();
        reg.admit(RoomId(1), cid(2)).unwrap();

        assert!(reg.admit(RoomId(1), cid(3)).is_err());
        assert!(reg.admit(RoomId(9), cid(3)).is_err());
        assert_eq!(reg.version(), 2);
    }

    #[test]
    fn test_remove_unseats_and_bumps_version() {
        let mut reg = RoomRegistry::new(["a"]);
        reg.admit(RoomId(1), cid(1)).unwrap();

        let room = reg.remove(RoomId(1), cid(1)).unwrap();
        assert!(room.is_empty());
        assert_eq!(reg.current_room(cid(1)), None);
        assert_eq!(reg.version(), 2);
    }

    #[test]
    fn test_snapshot_matches_rooms() {
        let mut reg = RoomRegistry::new(["a", "b"]);
        reg.admit(RoomId(1), cid(4)).unwrap();

        let snap = reg.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].players, vec![cid(4)]);
        assert!(snap[1].players.is_empty());
    }
}
