//! # dockhook-sdk
//!
//! Support library for writing dockhook plugins in Rust.
//!
//! A plugin is an ordinary executable: the daemon spawns it, sends one
//! JSON-RPC request line per event on its stdin, and reads one response line
//! from its stdout. Implement [`EventHooks`] for the statuses you care about
//! and hand it to [`serve`]; everything else answers with an empty result.

pub mod ports;
pub mod serve;

pub use ports::{exposed_tcp_port, mapped_tcp_port, running_port, PortError};
pub use serve::{serve, serve_on, EventHooks};
