//! Wire protocol for Memoria.
//!
//! This crate defines the messages that clients and the server exchange:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`RelayMessage`],
//!   [`RoomListEntry`], [`Card`]): the structures on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer sits between transport (raw frames) and the
//! session coordinator. It knows nothing about rooms or connections
//! beyond their identifiers.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use memoria_transport::ConnectionId;
pub use types::{
    Card, ClientMessage, RejectReason, RelayKind, RelayMessage, RoomId,
    RoomListEntry, ServerMessage,
};
