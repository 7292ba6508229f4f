//! # dockhook-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the entire dockhook workspace.
//!
//! This crate is the leaf of the dependency graph — it depends on no other
//! internal crate and provides the foundational primitives that all other
//! crates build upon: the runtime event model, the container inspect model,
//! and the YAML configuration document.

pub mod config;
pub mod constants;
pub mod container;
pub mod error;
pub mod event;
