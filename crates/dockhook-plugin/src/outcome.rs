//! The per-call outcome record.

use crate::error::PluginError;

/// Result of one plugin invocation for one event.
///
/// Ephemeral: produced per (event, plugin) pair, consumed only by logging,
/// never retried or persisted.
#[derive(Debug)]
pub struct CallOutcome {
    /// Display name of the plugin that was invoked.
    pub plugin: String,
    /// RPC method name that was invoked.
    pub method: &'static str,
    /// The plugin's response text, or the call's failure.
    pub result: Result<String, PluginError>,
}

impl CallOutcome {
    /// Whether the plugin answered successfully.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}
