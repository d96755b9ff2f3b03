//! Shared utilities, configuration, and error handling for Sharekit
//!
//! This crate provides common functionality used across the Sharekit workspace:
//! - Configuration management following 12-factor principles
//! - Error types and handling, including document store errors
//! - State machine error types
//! - Tracing subscriber setup for host applications

pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod telemetry;

pub use config::{Config, ResolutionPolicy};
pub use db::StoreError;
pub use error::{Error, Result};
pub use state::StateError;
