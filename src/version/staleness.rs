//! Staleness measurement of dependencies

use chrono::{DateTime, Utc};

use crate::module::types::{Dependency, DependencyKind, ModuleRecord};

/// Gauge value emitted for outdated modules whose age cannot be measured
///
/// Existing dashboards alert on this exact value, so it is only produced by
/// [`Staleness::as_gauge_value`].
pub const OUTDATED_UNKNOWN_DAYS: f64 = 1000.0;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// How long a dependency has been outdated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Staleness {
    /// No newer version is known
    Current,
    /// Days since the version following the current one was released
    KnownAge(f64),
    /// A newer version exists but its release time is unknown
    OutdatedUnknown,
}

impl Staleness {
    /// Measure the staleness of `module` given its resolved next version
    pub fn measure(
        module: &ModuleRecord,
        next_update: Option<&ModuleRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        if !module.is_outdated() {
            return Staleness::Current;
        }

        match next_update.and_then(|next| next.time) {
            Some(published) => {
                let elapsed = now.signed_duration_since(published);
                Staleness::KnownAge(elapsed.num_milliseconds() as f64 / MILLIS_PER_DAY)
            }
            None => Staleness::OutdatedUnknown,
        }
    }

    /// Encode as the value of the deprecated gauge
    pub fn as_gauge_value(&self) -> f64 {
        match self {
            Staleness::Current => 0.0,
            Staleness::KnownAge(days) => *days,
            Staleness::OutdatedUnknown => OUTDATED_UNKNOWN_DAYS,
        }
    }
}

/// Staleness of one dependency together with its label values
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyStaleness {
    pub path: String,
    pub kind: DependencyKind,
    pub current_version: String,
    pub latest_version: String,
    pub staleness: Staleness,
}

impl DependencyStaleness {
    pub fn assess(
        dependency: &Dependency,
        next_update: Option<&ModuleRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        let module = &dependency.effective;
        let latest_version = module
            .update
            .as_ref()
            .map(|u| u.version.clone())
            .unwrap_or_else(|| module.version.clone());

        Self {
            path: dependency.path.clone(),
            kind: dependency.kind,
            current_version: module.version.clone(),
            latest_version,
            staleness: Staleness::measure(module, next_update, now),
        }
    }
}
