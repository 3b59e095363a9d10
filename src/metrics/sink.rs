//! Metrics sink trait

#[cfg(test)]
use mockall::automock;

use crate::module::types::DependencyKind;

/// Label-keyed gauge store receiving analysis results
///
/// Every operation overwrites the value stored under its label tuple, so
/// repeating a call with the same arguments is a no-op.
#[cfg_attr(test, automock)]
pub trait MetricsSink: Send + Sync {
    /// Record the main module and the Go version it declares (value 1)
    fn set_info(&self, module: &str, go_version: &str);

    /// Record how many days `dependency` has been outdated
    fn set_deprecated(
        &self,
        module: &str,
        dependency: &str,
        kind: DependencyKind,
        current: &str,
        latest: &str,
        value: f64,
    );

    /// Record a replace directive of `dependency` (value 1)
    fn set_replaced(
        &self,
        module: &str,
        dependency: &str,
        kind: DependencyKind,
        replacement: &str,
        version: &str,
    );

    /// Record whether the last analysis of `repository` succeeded
    fn set_status(&self, repository: &str, ok: bool);

    /// Record the duration of the last analysis in seconds
    fn set_duration(&self, seconds: f64);
}
