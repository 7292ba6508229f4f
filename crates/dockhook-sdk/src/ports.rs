//! Helpers for finding the port a container actually serves on.
//!
//! Which port matters depends on how the container is networked: under the
//! runtime's default bridging the host-mapped port is the reachable one, and
//! under host networking the exposed container port is.

use dockhook_common::container::ContainerInfo;
use thiserror::Error;

/// Why a port could not be determined from an inspect snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortError {
    /// No TCP port is mapped to the host.
    #[error("no mapped TCP port found")]
    NoMappedPort,
    /// The image exposes no TCP port.
    #[error("no exposed TCP port found")]
    NoExposedPort,
    /// The container runs in a network mode these helpers do not cover.
    #[error("unsupported network mode: {0}")]
    UnsupportedNetworkMode(String),
}

/// The port the container is reachable on, per its network mode.
///
/// # Errors
///
/// Returns [`PortError`] when no TCP port applies or the mode is unsupported.
pub fn running_port(info: &ContainerInfo) -> Result<String, PortError> {
    match info.host_config.network_mode.as_str() {
        // `-p` and `-P`
        "default" => mapped_tcp_port(info),
        // `--net host`
        "host" => exposed_tcp_port(info),
        other => Err(PortError::UnsupportedNetworkMode(other.to_owned())),
    }
}

/// First TCP port mapped to the host in the inspect snapshot.
///
/// # Errors
///
/// Returns [`PortError::NoMappedPort`] when nothing is mapped.
pub fn mapped_tcp_port(info: &ContainerInfo) -> Result<String, PortError> {
    for (key, bindings) in &info.network_settings.ports {
        if !key.proto().eq_ignore_ascii_case("tcp") {
            continue;
        }
        if let Some(first) = bindings.as_ref().and_then(|b| b.first()) {
            return Ok(first.host_port.clone());
        }
    }
    Err(PortError::NoMappedPort)
}

/// First TCP port the image declares as exposed.
///
/// # Errors
///
/// Returns [`PortError::NoExposedPort`] when the image exposes none.
pub fn exposed_tcp_port(info: &ContainerInfo) -> Result<String, PortError> {
    info.config
        .exposed_ports
        .keys()
        .find(|key| key.proto().eq_ignore_ascii_case("tcp"))
        .map(|key| key.port().to_owned())
        .ok_or(PortError::NoExposedPort)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspect_fixture(network_mode: &str) -> ContainerInfo {
        serde_json::from_str(&format!(
            r#"{{
                "Id": "c1",
                "Config": {{
                    "Image": "nginx",
                    "ExposedPorts": {{"443/udp": {{}}, "80/tcp": {{}}}}
                }},
                "HostConfig": {{"NetworkMode": "{network_mode}"}},
                "NetworkSettings": {{
                    "Ports": {{
                        "53/udp": [{{"HostIp": "0.0.0.0", "HostPort": "30053"}}],
                        "80/tcp": [{{"HostIp": "0.0.0.0", "HostPort": "32768"}}]
                    }}
                }}
            }}"#
        ))
        .expect("fixture should deserialize")
    }

    #[test]
    fn default_mode_uses_the_mapped_host_port() {
        let info = inspect_fixture("default");
        assert_eq!(running_port(&info).expect("port"), "32768");
    }

    #[test]
    fn host_mode_uses_the_exposed_container_port() {
        let info = inspect_fixture("host");
        assert_eq!(running_port(&info).expect("port"), "80");
    }

    #[test]
    fn udp_only_mappings_do_not_count() {
        let mut info = inspect_fixture("default");
        let _ = info
            .network_settings
            .ports
            .remove(&dockhook_common::container::PortKey::new("80/tcp"));
        assert_eq!(mapped_tcp_port(&info), Err(PortError::NoMappedPort));
    }

    #[test]
    fn missing_exposed_ports_error() {
        let mut info = inspect_fixture("host");
        info.config.exposed_ports.clear();
        assert_eq!(running_port(&info), Err(PortError::NoExposedPort));
    }

    #[test]
    fn other_network_modes_are_unsupported() {
        let info = inspect_fixture("container:abc");
        assert_eq!(
            running_port(&info),
            Err(PortError::UnsupportedNetworkMode("container:abc".to_owned()))
        );
    }
}
