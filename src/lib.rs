//! # Decibel MCP - Tool Kernel
//!
//! Exposes a catalog of tools to AI-agent hosts over MCP-style JSON-RPC:
//! - Tool registry with JSON-schema input contracts
//! - Facades bundling several tools behind one `action` enum
//! - Catalogs at three description tiers (full, compact, micro)
//! - Bridge adapter proxying calls to a coordinating daemon, with local
//!   fallback when the daemon is unreachable
//!
//! ## Architecture
//!
//! ```text
//!   stdio / HTTP ──→ McpRouter ──→ ToolService
//!                                    ├── ToolKernel ──→ facade resolve ──→ handler
//!                                    └── BridgeAdapter
//!                                          ├── PROXY: POST {daemon}/call
//!                                          └── LOCAL: ToolKernel
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod bridge;
pub mod catalog;
pub mod facade;
pub mod kernel;
pub mod tools;
pub mod transport;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
