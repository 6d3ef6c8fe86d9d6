//! # Utility Modules
//!
//! Supporting utilities shared by the codec layers.
//!
//! ## Components
//! - **Hex**: hex dump formatting for trace output
//! - **Logging**: `tracing-subscriber` setup driven by `LoggingConfig`
//! - **Metrics**: per-dispatcher atomic counters

pub mod hex;
pub mod logging;
pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};
