//! Unified error type for the Memoria server.

use memoria_deck::DeckError;
use memoria_protocol::ProtocolError;
use memoria_room::RoomError;
use memoria_session::SessionError;
use memoria_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum MemoriaError {
    /// A transport-level error (bind, handshake, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A connection directory error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room registry error.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// No deck could be dealt.
    #[error(transparent)]
    Deck(#[from] DeckError),

    /// The process configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The session coordinator has stopped.
    #[error("session coordinator is not running")]
    Unavailable,
}
