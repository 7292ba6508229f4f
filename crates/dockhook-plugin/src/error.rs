//! Error types for plugin channels.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors produced while spawning or calling a plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A bare plugin program name could not be found on `$PATH`.
    #[error("plugin executable not found: {program}: {source}")]
    Resolve {
        /// Configured program name.
        program: String,
        /// Underlying lookup error.
        source: which::Error,
    },

    /// The plugin process could not be started.
    #[error("cannot spawn plugin {path}: {source}")]
    Spawn {
        /// Resolved executable path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The channel was marked broken by an earlier failure; calls fail fast
    /// without touching the subprocess.
    #[error("plugin {plugin}: channel is broken")]
    ChannelBroken {
        /// Display name of the plugin.
        plugin: String,
    },

    /// The plugin closed its stdout mid-call.
    #[error("plugin {plugin}: channel closed by plugin")]
    ChannelClosed {
        /// Display name of the plugin.
        plugin: String,
    },

    /// The per-call deadline expired before the plugin answered.
    #[error("plugin {plugin}: no response within {deadline:?}")]
    Timeout {
        /// Display name of the plugin.
        plugin: String,
        /// The deadline that expired.
        deadline: Duration,
    },

    /// Reading or writing the plugin's pipes failed.
    #[error("plugin {plugin}: I/O error: {source}")]
    Io {
        /// Display name of the plugin.
        plugin: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The plugin answered a different request than the outstanding one.
    #[error("plugin {plugin}: response id {got} does not match request id {expected}")]
    OutOfOrder {
        /// Display name of the plugin.
        plugin: String,
        /// Id of the outstanding request.
        expected: u64,
        /// Id the plugin answered with.
        got: u64,
    },

    /// The plugin sent bytes that do not decode as a response.
    #[error("plugin {plugin}: undecodable response: {source}")]
    Codec {
        /// Display name of the plugin.
        plugin: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// The plugin answered with an RPC-level error.
    #[error("plugin {plugin}: {message}")]
    Rpc {
        /// Display name of the plugin.
        plugin: String,
        /// Error value reported by the plugin.
        message: String,
    },
}

impl PluginError {
    /// Whether this failure leaves the channel's framing untrustworthy.
    ///
    /// An RPC-level error is a well-framed answer; everything that happens
    /// mid-wire (I/O failure, EOF, undecodable bytes, deadline expiry) means
    /// the next response on the pipe can no longer be matched to a call.
    #[must_use]
    pub const fn breaks_channel(&self) -> bool {
        !matches!(self, Self::Rpc { .. })
    }
}

/// Convenience alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
