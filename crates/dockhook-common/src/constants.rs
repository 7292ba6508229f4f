//! System-wide constants and defaults.

/// Default Docker daemon endpoint (local Unix socket).
pub const DEFAULT_DOCKER_ENDPOINT: &str = "unix:///var/run/docker.sock";

/// Default plugin launched when no configuration file is given.
pub const DEFAULT_PLUGIN: &str = "dockhook-echo";

/// Default per-plugin-call deadline in seconds.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Application name used in CLI output and logs.
pub const APP_NAME: &str = "dockhook";
