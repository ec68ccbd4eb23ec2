//! Core types for the tool kernel.
//!
//! This module provides foundational types used throughout the system:
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for transports, bridge and catalog

mod config;
mod errors;

pub use config::{
    BridgeConfig, CatalogConfig, Config, ObservabilityConfig, ServerConfig, CALL_TIMEOUT,
    PROBE_INTERVAL, PROBE_TIMEOUT,
};
pub use errors::{DanglingReference, Error, Result};
