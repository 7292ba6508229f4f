//! Plugin process management for dockhook.
//!
//! Each configured plugin is an external executable spawned at startup and
//! spoken to over newline-delimited JSON-RPC on its stdin/stdout. This crate
//! owns the channel (with explicit connection state and per-call deadline),
//! the immutable registry built from configuration, and the per-call outcome
//! record consumed by logging.

pub mod channel;
pub mod error;
pub mod outcome;
pub mod registry;

pub use channel::{PluginCall, PluginChannel};
pub use error::{PluginError, Result};
pub use outcome::CallOutcome;
pub use registry::{PluginEntry, PluginRegistry};
