//! anidrop - Media acquisition and delivery pipeline
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod error;
pub mod metadata;
pub mod notifications;
pub mod pipeline;
pub mod progress;
pub mod queue;
pub mod sinks;
