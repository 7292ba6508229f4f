//! Error types for runtime access.

use thiserror::Error;

/// Errors produced while talking to the container runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The configured endpoint string is not a recognized scheme.
    #[error("invalid runtime endpoint: {endpoint}")]
    InvalidEndpoint {
        /// The rejected endpoint string.
        endpoint: String,
    },

    /// Establishing a connection to the runtime failed.
    #[error("cannot connect to runtime at {endpoint}: {source}")]
    Connect {
        /// Endpoint that was unreachable.
        endpoint: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The runtime answered with an unexpected HTTP status.
    #[error("runtime returned HTTP {status} for {path}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Request path that produced the response.
        path: String,
    },

    /// The requested container no longer exists in the runtime.
    #[error("container not found: {id}")]
    NotFound {
        /// Identifier of the missing container.
        id: String,
    },

    /// The runtime's response could not be parsed as HTTP.
    #[error("malformed runtime response: {message}")]
    Protocol {
        /// Description of the framing violation.
        message: String,
    },

    /// An I/O operation on the runtime connection failed.
    #[error("runtime I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A runtime response body was not the expected JSON.
    #[error("runtime JSON error: {source}")]
    Json {
        /// Underlying decode error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
