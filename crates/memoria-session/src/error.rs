//! Error types for the connection directory.

use memoria_protocol::ConnectionId;

/// Errors that can occur while tracking connections.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The id is already registered. Transports never reuse ids, so this
    /// points at a bug in the caller.
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),

    /// No active connection has this id.
    #[error("connection {0} not found")]
    NotFound(ConnectionId),
}
