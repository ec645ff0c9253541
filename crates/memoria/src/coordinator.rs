//! Session coordinator: the single task that owns rooms and connections.
//!
//! Every connection event (connect, disconnect, join, leave, relay, deal)
//! becomes a [`CoordinatorCommand`] on one channel. The actor applies
//! them one at a time, so two clients racing for the last seat are
//! serialized and only one of them gets it.

use memoria_protocol::{
    Card, ConnectionId, RejectReason, RelayMessage, RoomId, RoomListEntry,
    ServerMessage,
};
use memoria_room::{RoomError, RoomRegistry};
use memoria_session::{
    ConnectionDirectory, ConnectionState, OutboundSender, SessionError,
};
use tokio::sync::{mpsc, oneshot};

use crate::MemoriaError;

/// Default capacity of the command channel.
pub const COMMAND_CHANNEL_SIZE: usize = 256;

/// Commands sent to the coordinator through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply; the rest are
/// fire-and-forget.
pub(crate) enum CoordinatorCommand {
    /// A client finished the upgrade handshake.
    Connect {
        id: ConnectionId,
        sender: OutboundSender,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },

    /// A client went away.
    Disconnect { id: ConnectionId },

    JoinRoom { id: ConnectionId, room_id: RoomId },

    LeaveRoom { id: ConnectionId, room_id: RoomId },

    /// Forward a game-state event to the sender's peer.
    Relay { id: ConnectionId, msg: RelayMessage },

    /// Hand a freshly dealt deck to the requester's room.
    Deal { id: ConnectionId, cards: Vec<Card> },

    Rooms {
        reply: oneshot::Sender<Vec<RoomListEntry>>,
    },

    Presence {
        reply: oneshot::Sender<Vec<ConnectionId>>,
    },

    Shutdown,
}

/// Who an outbound message goes to.
#[derive(Debug, Clone, Copy)]
enum Audience {
    /// Every connected client.
    Everyone,
    One(ConnectionId),
    /// Every occupant of a room.
    Room(RoomId),
    /// Every occupant of a room but one.
    RoomExcept(RoomId, ConnectionId),
}

/// Handle to the running coordinator.
///
/// Cheap to clone; every connection handler holds one.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<CoordinatorCommand>,
}

impl CoordinatorHandle {
    async fn send(&self, cmd: CoordinatorCommand) -> Result<(), MemoriaError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| MemoriaError::Unavailable)
    }

    /// Registers a new connection and announces it.
    ///
    /// `sender` is the connection's outbound channel; everything the
    /// coordinator has to say to it goes there from now on.
    ///
    /// # Errors
    /// [`MemoriaError::Session`] if the id is already registered,
    /// [`MemoriaError::Unavailable`] if the coordinator has stopped.
    pub async fn connect(
        &self,
        id: ConnectionId,
        sender: OutboundSender,
    ) -> Result<(), MemoriaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(CoordinatorCommand::Connect {
            id,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| MemoriaError::Unavailable)??;
        Ok(())
    }

    /// Removes a connection and frees its seat.
    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), MemoriaError> {
        self.send(CoordinatorCommand::Disconnect { id }).await
    }

    pub async fn join_room(
        &self,
        id: ConnectionId,
        room_id: RoomId,
    ) -> Result<(), MemoriaError> {
        self.send(CoordinatorCommand::JoinRoom { id, room_id }).await
    }

    pub async fn leave_room(
        &self,
        id: ConnectionId,
        room_id: RoomId,
    ) -> Result<(), MemoriaError> {
        self.send(CoordinatorCommand::LeaveRoom { id, room_id }).await
    }

    pub async fn relay(
        &self,
        id: ConnectionId,
        msg: RelayMessage,
    ) -> Result<(), MemoriaError> {
        self.send(CoordinatorCommand::Relay { id, msg }).await
    }

    /// Delivers `cards` as a new game to the room `id` sits in.
    pub async fn deal(
        &self,
        id: ConnectionId,
        cards: Vec<Card>,
    ) -> Result<(), MemoriaError> {
        self.send(CoordinatorCommand::Deal { id, cards }).await
    }

    /// Current room list, as broadcast in `rooms-updated`.
    pub async fn rooms(&self) -> Result<Vec<RoomListEntry>, MemoriaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(CoordinatorCommand::Rooms { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| MemoriaError::Unavailable)
    }

    /// Connected ids, ascending.
    pub async fn presence(&self) -> Result<Vec<ConnectionId>, MemoriaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(CoordinatorCommand::Presence { reply: reply_tx })
            .await?;
        reply_rx.await.map_err(|_| MemoriaError::Unavailable)
    }

    /// Stops the coordinator. Later calls on any handle fail with
    /// [`MemoriaError::Unavailable`].
    pub async fn shutdown(&self) -> Result<(), MemoriaError> {
        self.send(CoordinatorCommand::Shutdown).await
    }
}

/// The actor state. Runs inside a Tokio task.
struct Coordinator {
    registry: RoomRegistry,
    directory: ConnectionDirectory,
    receiver: mpsc::Receiver<CoordinatorCommand>,
}

impl Coordinator {
    async fn run(mut self) {
        tracing::info!(rooms = self.registry.len(), "session coordinator started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                CoordinatorCommand::Connect { id, sender, reply } => {
                    let _ = reply.send(self.handle_connect(id, sender));
                }
                CoordinatorCommand::Disconnect { id } => self.handle_disconnect(id),
                CoordinatorCommand::JoinRoom { id, room_id } => {
                    self.handle_join(id, room_id);
                }
                CoordinatorCommand::LeaveRoom { id, room_id } => {
                    self.handle_leave(id, room_id);
                }
                CoordinatorCommand::Relay { id, msg } => self.handle_relay(id, msg),
                CoordinatorCommand::Deal { id, cards } => self.handle_deal(id, cards),
                CoordinatorCommand::Rooms { reply } => {
                    let _ = reply.send(self.registry.snapshot());
                }
                CoordinatorCommand::Presence { reply } => {
                    let _ = reply.send(self.directory.active_ids());
                }
                CoordinatorCommand::Shutdown => {
                    tracing::info!("session coordinator shutting down");
                    break;
                }
            }
        }

        tracing::info!("session coordinator stopped");
    }

    fn handle_connect(
        &mut self,
        id: ConnectionId,
        sender: OutboundSender,
    ) -> Result<(), SessionError> {
        self.directory.register(id, sender)?;
        self.deliver(
            Audience::One(id),
            ServerMessage::ConnectionEstablished { connection_id: id },
        );
        self.broadcast_presence();
        self.broadcast_rooms();
        Ok(())
    }

    fn handle_disconnect(&mut self, id: ConnectionId) {
        if !self.directory.contains(id) {
            tracing::debug!(connection_id = %id, "disconnect for unknown connection");
            return;
        }
        let seat = self
            .directory
            .unregister(id)
            .or_else(|| self.registry.current_room(id));

        if let Some(room_id) = seat {
            match self.registry.remove(room_id, id) {
                Ok(_) => {
                    self.deliver(Audience::Room(room_id), ServerMessage::RoomReset);
                    self.broadcast_rooms();
                }
                Err(e) => {
                    tracing::warn!(connection_id = %id, error = %e, "seat already gone");
                }
            }
        }
        self.broadcast_presence();
    }

    fn handle_join(&mut self, id: ConnectionId, room_id: RoomId) {
        if !self.directory.contains(id) {
            tracing::debug!(connection_id = %id, %room_id, "join from unknown connection");
            return;
        }

        let (entry, full) = match self.registry.admit(room_id, id) {
            Ok(room) => (room.to_entry(), room.is_full()),
            Err(RoomError::NotFound(_)) => {
                tracing::debug!(connection_id = %id, %room_id, "join for unknown room");
                return;
            }
            Err(e) => {
                tracing::debug!(connection_id = %id, error = %e, "join rejected");
                let reason = match e {
                    RoomError::AlreadyInRoom(..) => RejectReason::AlreadyInRoom,
                    _ => RejectReason::RoomFull,
                };
                self.deliver(
                    Audience::One(id),
                    ServerMessage::JoinRoomRejected { room_id, reason },
                );
                return;
            }
        };

        if let Err(e) = self.directory.assign_room(id, room_id) {
            tracing::warn!(connection_id = %id, error = %e, "directory out of step");
        }
        self.broadcast_rooms();
        if full {
            self.deliver(
                Audience::Room(room_id),
                ServerMessage::JoinRoomAccepted { room: entry },
            );
        }
    }

    fn handle_leave(&mut self, id: ConnectionId, room_id: RoomId) {
        if let Err(e) = self.registry.remove(room_id, id) {
            tracing::debug!(connection_id = %id, error = %e, "leave ignored");
            return;
        }
        if let Err(e) = self.directory.clear_room(id) {
            tracing::warn!(connection_id = %id, error = %e, "directory out of step");
        }
        self.deliver(Audience::Room(room_id), ServerMessage::RoomReset);
        self.broadcast_rooms();
    }

    fn handle_relay(&self, id: ConnectionId, msg: RelayMessage) {
        let Some(ConnectionState::InRoom(room_id)) = self.directory.state(id) else {
            tracing::debug!(connection_id = %id, kind = %msg.kind, "relay outside a room dropped");
            return;
        };
        tracing::trace!(connection_id = %id, %room_id, kind = %msg.kind, "relaying");
        self.deliver(Audience::RoomExcept(room_id, id), ServerMessage::Relay(msg));
    }

    fn handle_deal(&self, id: ConnectionId, cards: Vec<Card>) {
        let Some(ConnectionState::InRoom(room_id)) = self.directory.state(id) else {
            tracing::debug!(connection_id = %id, "new game outside a room dropped");
            return;
        };
        tracing::info!(connection_id = %id, %room_id, cards = cards.len(), "new game");
        self.deliver(Audience::Room(room_id), ServerMessage::NewGame { cards });
        self.deliver(
            Audience::Room(room_id),
            ServerMessage::Relay(RelayMessage::turns_reset()),
        );
    }

    fn broadcast_presence(&self) {
        self.deliver(
            Audience::Everyone,
            ServerMessage::PresenceUpdated {
                connections: self.directory.active_ids(),
            },
        );
    }

    fn broadcast_rooms(&self) {
        self.deliver(
            Audience::Everyone,
            ServerMessage::RoomsUpdated {
                rooms: self.registry.snapshot(),
            },
        );
    }

    fn deliver(&self, audience: Audience, msg: ServerMessage) {
        let (room_id, skip) = match audience {
            Audience::Everyone => {
                self.directory.broadcast(&msg);
                return;
            }
            Audience::One(id) => {
                self.directory.send_to(id, msg);
                return;
            }
            Audience::Room(room_id) => (room_id, None),
            Audience::RoomExcept(room_id, id) => (room_id, Some(id)),
        };

        let Some(room) = self.registry.find_room(room_id) else {
            return;
        };
        for &occupant in room.players() {
            if Some(occupant) != skip {
                self.directory.send_to(occupant, msg.clone());
            }
        }
    }
}

/// Spawns the coordinator task and returns a handle to it.
///
/// `channel_size` bounds the command queue; when it fills up, callers
/// wait.
pub fn spawn_coordinator(
    registry: RoomRegistry,
    channel_size: usize,
) -> CoordinatorHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = Coordinator {
        registry,
        directory: ConnectionDirectory::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    CoordinatorHandle { sender: tx }
}

// =========================================================================
// Tests
// =========================================================================
