//! Wire types: everything that travels between browser and server.
//!
//! Frames are JSON objects tagged by a `"type"` field. Client→server
//! messages are [`ClientMessage`], server→client messages are
//! [`ServerMessage`]. Game-state events ([`RelayMessage`]) use the same
//! shape in both directions because the server forwards them untouched.

use std::fmt;

use memoria_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifier of one of the server's fixed rooms.
///
/// Rooms are numbered from 1 in the order they are configured.
/// Serialized as a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Rooms and cards
// ---------------------------------------------------------------------------

/// A room as shown in the lobby: its label and who is sitting in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    pub id: RoomId,
    pub name: String,
    /// Occupants in join order.
    pub players: Vec<ConnectionId>,
}

/// One dealt card.
///
/// `matched` is always `false` when the server deals; clients flip it
/// themselves and the server never reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Reference to the face image, e.g. `/img/helmet-1.png`.
    pub src: String,
    pub matched: bool,
    /// Position assigned at deal time, unique within one deck.
    pub id: u32,
}

impl Card {
    /// A fresh, unmatched card showing `src`.
    pub fn new(src: impl Into<String>, id: u32) -> Self {
        Self {
            src: src.into(),
            matched: false,
            id,
        }
    }
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// The game-state event kinds the server relays between room occupants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelayKind {
    SetChoiceOne,
    SetChoiceTwo,
    SetCards,
    SetTurns,
    PassTurn,
    AddScore,
    ResetGame,
}

impl fmt::Display for RelayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SetChoiceOne => "setChoiceOne",
            Self::SetChoiceTwo => "setChoiceTwo",
            Self::SetCards => "setCards",
            Self::SetTurns => "setTurns",
            Self::PassTurn => "passTurn",
            Self::AddScore => "addScore",
            Self::ResetGame => "resetGame",
        };
        f.write_str(name)
    }
}

/// A game-state event. `data` is opaque to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub kind: RelayKind,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RelayMessage {
    /// The turn counter reset that accompanies every fresh deck.
    pub fn turns_reset() -> Self {
        Self {
            kind: RelayKind::SetTurns,
            data: serde_json::Value::from(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
///
/// ```text
/// {"type":"join-room","room_id":1}
/// {"type":"leave-room","room_id":1}
/// {"type":"new-game"}
/// {"type":"relay","kind":"setTurns","data":3}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Ask for a seat in a room.
    JoinRoom { room_id: RoomId },

    /// Give up the seat in a room.
    LeaveRoom { room_id: RoomId },

    /// Ask for a freshly shuffled deck for the current room.
    NewGame,

    /// Game-state event to forward to the other occupant.
    Relay(RelayMessage),
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Why a join request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    /// Both seats are taken.
    RoomFull,
    /// The requester already sits in a room.
    AlreadyInRoom,
}

/// Messages the server sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once, right after connect: the identifier of this connection.
    ConnectionEstablished { connection_id: ConnectionId },

    /// Everyone currently connected (full audience).
    PresenceUpdated { connections: Vec<ConnectionId> },

    /// The full room list (full audience).
    RoomsUpdated { rooms: Vec<RoomListEntry> },

    /// The room filled up; both occupants receive it.
    JoinRoomAccepted { room: RoomListEntry },

    /// Sent to the requester only.
    JoinRoomRejected {
        room_id: RoomId,
        reason: RejectReason,
    },

    /// The peer left; clear the local board.
    RoomReset,

    /// A relayed game-state event.
    Relay(RelayMessage),

    /// A freshly dealt deck.
    NewGame { cards: Vec<Card> },
}

// =========================================================================
// Tests
// =========================================================================
