//! The dockhook dispatch core.
//!
//! Consumes one runtime event at a time and fans it out concurrently to every
//! registered plugin, isolating per-plugin failures and never letting a slow
//! fan-out block intake of the next event.

pub mod dispatcher;
pub mod runner;

pub use dispatcher::EventDispatcher;
pub use runner::{EventFeed, Runner};
