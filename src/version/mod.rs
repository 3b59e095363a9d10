//! Version layer for dependency freshness
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Dependency │────▶│  Resolver   │────▶│  Staleness  │
//! │  (record)   │     │ (next ver.) │     │   (days)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │   Semver    │
//!                     │ (Go order)  │
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`resolver`]: Finds the version following the pinned one
//! - [`semver`]: Go module version parsing and precedence
//! - [`staleness`]: Converts the resolved version into an age

pub mod resolver;
pub mod semver;
pub mod staleness;
