//! Journal Common - Shared types and utilities for the journal service.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Error types and handling utilities
//! - Logging setup

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, LlmConfig, ObservabilityConfig, ServerConfig, StorageConfig};
pub use error::{Error, Result};
pub use logging::init_logging;
