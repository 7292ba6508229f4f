//! The bundled example plugin: logs every call to stderr and answers `done`
//! for container starts.
//!
//! Launched by default when dockhook runs without a configuration file;
//! useful for verifying a deployment end to end.

use dockhook_common::container::ContainerInfo;
use dockhook_common::event::Event;
use dockhook_sdk::EventHooks;

struct Echo;

impl EventHooks for Echo {
    fn start(&mut self, container: Option<&ContainerInfo>) -> Result<String, String> {
        tracing::info!(
            image = container.map_or("", ContainerInfo::summary),
            "container started"
        );
        Ok("done".to_owned())
    }

    fn die(&mut self, container: Option<&ContainerInfo>) -> Result<String, String> {
        tracing::info!(
            image = container.map_or("", ContainerInfo::summary),
            "container died"
        );
        Ok(String::new())
    }

    fn destroy(&mut self, event: &Event) -> Result<String, String> {
        tracing::info!(id = %event.id, "container destroyed");
        Ok(String::new())
    }
}

fn main() -> std::io::Result<()> {
    // stdout carries the RPC responses; diagnostics go to stderr, which the
    // daemon inherits.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    dockhook_sdk::serve(&mut Echo)
}
