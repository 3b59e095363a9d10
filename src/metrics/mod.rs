//! Metrics layer
//!
//! # Modules
//!
//! - [`push`]: Push gateway client
//! - [`registry`]: Gauge registry and text exposition rendering
//! - [`server`]: HTTP scrape endpoint
//! - [`sink`]: `MetricsSink` trait written to by the analyzer

pub mod push;
pub mod registry;
pub mod server;
pub mod sink;
