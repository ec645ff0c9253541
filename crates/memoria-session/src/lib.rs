//! Connection directory for Memoria.
//!
//! This crate tracks who is connected right now:
//!
//! 1. **Presence**: the set of active [`ConnectionId`](memoria_protocol::ConnectionId)s
//!    ([`ConnectionDirectory::active_ids`])
//! 2. **Per-connection state**: unassigned or seated in a room
//!    ([`ConnectionState`])
//! 3. **Delivery**: each connection's outbound channel, used for
//!    single-target sends and full-audience broadcasts
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Coordinator (above)  ← owns the directory, keeps it in step with rooms
//!     ↕
//! Connection Directory (this crate)
//!     ↕
//! Protocol Layer (below)  ← provides ConnectionId, RoomId, ServerMessage
//! ```

mod connection;
mod directory;
mod error;

pub use connection::{Connection, ConnectionState, OutboundSender};
pub use directory::ConnectionDirectory;
pub use error::SessionError;
