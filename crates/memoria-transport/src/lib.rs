//! Transport abstraction layer for Memoria.
//!
//! Provides the [`Transport`], [`Handshake`] and [`Connection`] traits that hide the
//! network protocol from the session coordinator, plus the opaque
//! [`ConnectionId`] every other layer uses to talk about a client.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketHandshake, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a connection.
///
/// Assigned by the transport when a connection finishes its handshake and
/// never reused for the lifetime of the process. Serialized as a plain
/// number.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// Accepting is split in two steps. [`accept`](Self::accept) only takes
/// the raw connection off the listener and returns quickly; the protocol
/// handshake runs in [`Handshake::complete`], which callers drive from
/// a per-connection task so a slow peer never holds up the next accept.
pub trait Transport: Send + Sync + 'static {
    /// A connection whose handshake has not run yet.
    type Handshake: Handshake<Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Handshake, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// An accepted connection that still has to finish its handshake.
pub trait Handshake: Send + 'static {
    /// The connection type produced once the handshake succeeds.
    type Connection: Connection;
    /// The error type for the handshake.
    type Error: std::error::Error + Send + Sync;

    /// Address of the remote peer.
    fn peer_addr(&self) -> SocketAddr;

    /// Runs the handshake and yields a usable connection.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive frames.
///
/// Sending and receiving must not block each other: the server reads
/// from a connection in one task while a writer task pushes broadcasts.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection. Frames queued afterwards fail to send.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
