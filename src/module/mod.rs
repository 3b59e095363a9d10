//! Module graph layer
//!
//! Lists a project's module graph, decodes the raw record stream and
//! partitions it into main module, dependencies and replace directives.
//!
//! # Modules
//!
//! - [`decoder`]: Streaming decoder for concatenated JSON records
//! - [`error`]: Error types for querying and partitioning
//! - [`partition`]: Main/dependency/replacement split
//! - [`query`]: `ModuleGraphQuery` trait and the `go list` implementation
//! - [`types`]: `ModuleRecord` and the partitioned graph types

pub mod decoder;
pub mod error;
pub mod partition;
pub mod query;
pub mod types;
