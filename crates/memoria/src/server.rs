//! `MemoriaServer` builder and server loop.
//!
//! This is the entry point for running a Memoria server. It ties
//! together all the layers: transport → protocol → coordinator
//! (rooms + connections) → deck.

use std::net::SocketAddr;
use std::sync::Arc;

use memoria_deck::{DeckConfig, FacePool};
use memoria_protocol::{Codec, JsonCodec};
use memoria_room::{RoomRegistry, default_room_names};
use memoria_transport::{Handshake, Transport, WebSocketTransport};

use crate::MemoriaError;
use crate::config::ServerConfig;
use crate::coordinator::{COMMAND_CHANNEL_SIZE, CoordinatorHandle, spawn_coordinator};
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. All
/// mutable state lives behind the coordinator handle.
pub(crate) struct ServerState<P, C> {
    pub(crate) coordinator: CoordinatorHandle,
    pub(crate) faces: P,
    pub(crate) deck: DeckConfig,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Memoria server.
///
/// # Example
///
/// ```rust,ignore
/// use memoria::prelude::*;
///
/// let server = MemoriaServer::builder()
///     .bind("0.0.0.0:3001")
///     .allowed_origin(Some("http://localhost:3000".into()))
///     .build(FixedPool::legacy())
///     .await?;
/// server.run().await
/// ```
pub struct MemoriaServerBuilder {
    bind_addr: String,
    allowed_origin: Option<String>,
    rooms: Vec<String>,
    deck: DeckConfig,
    channel_size: usize,
}

impl MemoriaServerBuilder {
    /// Creates a new builder with default settings: localhost, no origin
    /// check, the default rooms, 12-pair decks.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            allowed_origin: None,
            rooms: default_room_names(),
            deck: DeckConfig::default(),
            channel_size: COMMAND_CHANNEL_SIZE,
        }
    }

    /// Creates a builder from process configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new()
            .bind(&config.bind_addr)
            .allowed_origin(config.allowed_origin.clone())
            .rooms(config.rooms.iter().cloned())
            .deck(config.deck)
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Restricts browser upgrades to one origin. `None` or `"*"` allows
    /// any.
    pub fn allowed_origin(mut self, origin: Option<String>) -> Self {
        self.allowed_origin = origin;
        self
    }

    /// Sets the room names. Rooms get ids `1..=n` in this order.
    pub fn rooms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rooms = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets deck size and card numbering.
    pub fn deck(mut self, deck: DeckConfig) -> Self {
        self.deck = deck;
        self
    }

    /// Sets the coordinator's command queue capacity.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = size.max(1);
        self
    }

    /// Binds the listener, starts the coordinator, and returns the
    /// server, dealing decks from `faces`.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`. Must be called inside
    /// a Tokio runtime.
    pub async fn build<P: FacePool>(
        self,
        faces: P,
    ) -> Result<MemoriaServer<P, JsonCodec>, MemoriaError> {
        let transport = WebSocketTransport::bind(&self.bind_addr)
            .await?
            .with_allowed_origin(self.allowed_origin);

        let coordinator =
            spawn_coordinator(RoomRegistry::new(self.rooms), self.channel_size);

        let state = Arc::new(ServerState {
            coordinator,
            faces,
            deck: self.deck,
            codec: JsonCodec,
        });

        Ok(MemoriaServer { transport, state })
    }
}

impl Default for MemoriaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Memoria server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct MemoriaServer<P, C> {
    transport: WebSocketTransport,
    state: Arc<ServerState<P, C>>,
}

impl MemoriaServer<(), JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> MemoriaServerBuilder {
        MemoriaServerBuilder::new()
    }
}

impl<P, C> MemoriaServer<P, C>
where
    P: FacePool,
    C: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, MemoriaError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle to the session coordinator, for inspection.
    pub fn coordinator(&self) -> CoordinatorHandle {
        self.state.coordinator.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming TCP connections and spawns a task for each that
    /// completes the WebSocket upgrade and then runs the handler. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), MemoriaError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Memoria server running");

        loop {
            match self.transport.accept().await {
                Ok(handshake) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = handshake.peer_addr();
                        let conn = match handshake.complete().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "upgrade refused");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
