//! # Memoria
//!
//! Room registry and real-time relay server for two-player card-matching
//! ("memory") games.
//!
//! Clients connect over WebSocket, see a fixed list of named rooms, take
//! one of the two seats in a room, and from then on every game-state
//! event they send is forwarded to the other occupant. The server deals
//! shuffled decks on request and never interprets game state itself.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use memoria::prelude::*;
//!
//! # async fn start() -> Result<(), MemoriaError> {
//! let config = ServerConfig::from_env()?;
//! let server = MemoriaServerBuilder::from_config(&config)
//!     .build(config.face_source())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod coordinator;
mod error;
mod handler;
pub mod logging;
mod server;

pub use config::{ConfigError, FaceSourceKind, ServerConfig};
pub use coordinator::{COMMAND_CHANNEL_SIZE, CoordinatorHandle, spawn_coordinator};
pub use error::MemoriaError;
pub use server::{MemoriaServer, MemoriaServerBuilder};

pub mod prelude {
    //! Everything needed to configure and run a server.

    pub use crate::{
        ConfigError, CoordinatorHandle, FaceSourceKind, MemoriaError, MemoriaServer,
        MemoriaServerBuilder, ServerConfig,
    };
    pub use memoria_deck::{
        DeckConfig, DirectoryPool, FacePool, FaceSource, FixedPool,
    };
    pub use memoria_protocol::{
        Card, ClientMessage, ConnectionId, RejectReason, RelayKind, RelayMessage,
        RoomId, RoomListEntry, ServerMessage,
    };
    pub use memoria_room::RoomRegistry;
}
