//! WebTUIO Common Utilities
//!
//! Shared infrastructure for all WebTUIO crates:
//! - Error types and result aliases
//! - Monotonic stream clock and send-rate gates
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
