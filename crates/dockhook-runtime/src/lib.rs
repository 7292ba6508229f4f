//! Container runtime access for dockhook.
//!
//! Talks the Docker Engine HTTP API over a Unix socket or TCP endpoint:
//! an indefinite lifecycle event stream plus on-demand container inspection,
//! and the inspector policy deciding when an event's container can still be
//! inspected at all.

pub mod client;
pub mod endpoint;
pub mod error;
mod http;
pub mod inspector;

pub use client::{ContainerApi, DockerClient, EventStream};
pub use endpoint::Endpoint;
pub use error::{Result, RuntimeError};
pub use inspector::ContainerInspector;
