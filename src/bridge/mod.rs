//! Bridge: proxy calls to a coordinating daemon, fall back to the local
//! kernel when it is unreachable.
//!
//! ```text
//!            probe ok (was down)
//!   LOCAL ───────────────────────▶ PROXY
//!     ▲                              │
//!     └──────────────────────────────┘
//!      probe failed | proxied call hit a transport failure
//! ```

pub mod adapter;
pub mod client;
pub mod health;

pub use adapter::BridgeAdapter;
pub use client::{DaemonClient, DaemonReply};
pub use health::{BridgeMode, DaemonHealth, HealthCell, HealthMonitor};
