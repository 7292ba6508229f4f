//! Container metadata as returned by the runtime's inspect operation.
//!
//! Serde renames mirror the Docker inspect wire schema (PascalCase field
//! names, ports keyed by `"<port>/<proto>"`) so the structure can be forwarded
//! to plugins byte-compatible with what the runtime itself would send.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A port key in the runtime's `"80/tcp"` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortKey(String);

impl PortKey {
    /// Creates a port key from its wire representation.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The numeric port part (`"80"` for `"80/tcp"`).
    #[must_use]
    pub fn port(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// The protocol part (`"tcp"` for `"80/tcp"`); defaults to `tcp` when the
    /// runtime omits it.
    #[must_use]
    pub fn proto(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or("tcp")
    }

    /// The raw wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A host-side binding for a mapped container port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    /// Host interface address the port is bound to.
    #[serde(rename = "HostIp", default)]
    pub host_ip: String,
    /// Host port number as a string, per the runtime schema.
    #[serde(rename = "HostPort", default)]
    pub host_port: String,
}

/// The container's static configuration section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Image name the container was created from.
    #[serde(rename = "Image", default)]
    pub image: String,
    /// Ports the image declares as exposed; values are empty objects on the
    /// wire.
    #[serde(rename = "ExposedPorts", default)]
    pub exposed_ports: BTreeMap<PortKey, serde_json::Value>,
}

/// The container's host-side configuration section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Network mode (`default`, `host`, ...).
    #[serde(rename = "NetworkMode", default)]
    pub network_mode: String,
}

/// The container's runtime network state section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Mapping from container port to host bindings; unmapped exposed ports
    /// appear with a `null` value on the wire.
    #[serde(rename = "Ports", default)]
    pub ports: BTreeMap<PortKey, Option<Vec<PortBinding>>>,
}

/// Metadata snapshot for a container, fetched on demand per event.
///
/// Owned transiently by the dispatch of a single event; shared read-only
/// across that event's fan-out calls and never cached across events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Container identifier.
    #[serde(rename = "Id", default)]
    pub id: String,
    /// Static configuration.
    #[serde(rename = "Config", default)]
    pub config: ContainerConfig,
    /// Host-side configuration.
    #[serde(rename = "HostConfig", default)]
    pub host_config: HostConfig,
    /// Runtime network state.
    #[serde(rename = "NetworkSettings", default)]
    pub network_settings: NetworkSettings,
}

impl ContainerInfo {
    /// Short human-readable summary used in per-call log records.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.config.image
    }
}
