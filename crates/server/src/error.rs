//! Server error types.

/// Errors raised by the network layer.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen socket could not be bound. Fatal at startup.
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}
