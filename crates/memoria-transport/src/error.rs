/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting TCP connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The WebSocket upgrade was refused or malformed.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// The peer did not finish the WebSocket upgrade in time.
    #[error("handshake timed out")]
    HandshakeTimedOut,
}
