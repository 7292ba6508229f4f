//! The immutable registry of configured plugins.

use std::sync::Arc;
use std::time::Duration;

use crate::channel::{PluginCall, PluginChannel};
use crate::error::Result;

/// One registered plugin: display name plus its RPC channel.
///
/// Created once at startup, never mutated; the channel may fail per-call
/// without affecting other entries.
pub struct PluginEntry {
    name: String,
    channel: Arc<dyn PluginCall>,
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PluginEntry {
    /// Creates an entry from a display name and a channel.
    #[must_use]
    pub fn new(name: impl Into<String>, channel: Arc<dyn PluginCall>) -> Self {
        Self {
            name: name.into(),
            channel,
        }
    }

    /// Display name (the configured executable path string).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A shareable handle to the plugin's channel.
    #[must_use]
    pub fn channel(&self) -> Arc<dyn PluginCall> {
        Arc::clone(&self.channel)
    }
}

/// The full set of configured plugins, fixed after startup.
#[derive(Debug)]
pub struct PluginRegistry {
    entries: Vec<PluginEntry>,
}

impl PluginRegistry {
    /// Spawns every configured plugin and assembles the registry.
    ///
    /// There is no partial-plugin-set mode: the first plugin that cannot be
    /// spawned aborts construction, and the caller treats that as fatal.
    ///
    /// # Errors
    ///
    /// Returns the first spawn or resolution failure.
    pub fn build(programs: &[String], call_timeout: Duration) -> Result<Self> {
        let mut entries = Vec::with_capacity(programs.len());
        for program in programs {
            let channel = PluginChannel::connect(program, call_timeout)?;
            tracing::info!(plugin = %program, "plugin started");
            entries.push(PluginEntry::new(program.clone(), Arc::new(channel)));
        }
        Ok(Self { entries })
    }

    /// Assembles a registry from pre-built entries.
    #[must_use]
    pub fn from_entries(entries: Vec<PluginEntry>) -> Self {
        Self { entries }
    }

    /// The registered plugins, in configuration order.
    #[must_use]
    pub fn entries(&self) -> &[PluginEntry] {
        &self.entries
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no plugins are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
