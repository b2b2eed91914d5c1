//! Clipforge - pipeline-driven short-video transformation engine
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod pipeline;
pub mod server;
pub mod services;
