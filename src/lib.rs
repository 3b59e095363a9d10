//! Dependency freshness exporter for Go module projects
//!
//! # Modules
//!
//! - [`analyzer`]: Per-project analysis and the periodic tick loop
//! - [`checkout`]: Shallow git checkout of the analyzed projects
//! - [`config`]: YAML/JSON configuration loading and validation
//! - [`logging`]: `tracing` subscriber setup
//! - [`metrics`]: Gauge registry, HTTP exposition and push gateway transport
//! - [`module`]: Module records, `go list` querying, decoding and partitioning
//! - [`pusher`]: One-shot analysis delivered to a push gateway or a writer
//! - [`version`]: Go version ordering, next-version resolution and staleness

pub mod analyzer;
pub mod checkout;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod module;
pub mod pusher;
pub mod version;
