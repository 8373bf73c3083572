//! Server lifecycle errors.

use thiserror::Error;

/// The webhook server could not start or stopped abnormally.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// `host:port` that was requested.
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[error("webhook server failed: {0}")]
    Serve(#[source] std::io::Error),
}
