//! Next version resolution for outdated modules
//!
//! The staleness of a module is measured from the release of the version
//! immediately following the pinned one, not from the latest release. The
//! source only reports the latest update, so the immediate successor is
//! looked up in the module's known versions and, when it is not the latest
//! one, its release time is fetched with a pinned query.

use std::path::Path;

use tracing::{debug, warn};

use crate::module::decoder::decode_records;
use crate::module::error::QueryError;
use crate::module::query::{ModuleGraphQuery, TargetSpec};
use crate::module::types::ModuleRecord;
use crate::version::semver::{is_newer, is_pseudo_version};

/// Position of the version following the current one among the known versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextVersion<'a> {
    /// The next version is the latest known update
    Latest,
    /// The next version lies strictly between the current and the latest one
    Intermediate(&'a str),
    /// No known version is newer than the current one
    NotFound,
}

/// Find the first version, in source order, newer than `current`
///
/// An empty list means the source gave no history, in which case the latest
/// update is the best available answer.
pub fn next_version<'a>(current: &str, versions: &'a [String]) -> NextVersion<'a> {
    if versions.is_empty() {
        return NextVersion::Latest;
    }

    match versions.iter().position(|v| is_newer(v, current)) {
        Some(idx) if idx == versions.len() - 1 => NextVersion::Latest,
        Some(idx) => NextVersion::Intermediate(&versions[idx]),
        None => NextVersion::NotFound,
    }
}

/// Resolve the record of the version immediately following `module.version`
///
/// Returns None when the module is up to date or when the pinned lookup of
/// an intermediate version fails; the latter is logged and never aborts the
/// caller.
pub async fn resolve_next_update<Q: ModuleGraphQuery + ?Sized>(
    query: &Q,
    location: &Path,
    module: &ModuleRecord,
) -> Option<ModuleRecord> {
    let update = module.update.as_deref()?;

    match next_version(&module.version, &module.versions) {
        NextVersion::Latest => Some(update.clone()),
        NextVersion::NotFound => {
            warn!(
                "No known version of {} is newer than {}{}, falling back to latest update {}",
                module.path,
                module.version,
                if is_pseudo_version(&module.version) {
                    " (pseudo-version)"
                } else {
                    ""
                },
                update.version
            );
            Some(update.clone())
        }
        NextVersion::Intermediate(candidate) => {
            debug!(
                "Next version of {} after {} is {}",
                module.path, module.version, candidate
            );
            fetch_pinned(query, location, &module.path, candidate)
                .await
                .inspect_err(|e| {
                    warn!(
                        "Unable to fetch {}@{}: {}",
                        module.path, candidate, e
                    )
                })
                .ok()
                .flatten()
        }
    }
}

async fn fetch_pinned<Q: ModuleGraphQuery + ?Sized>(
    query: &Q,
    location: &Path,
    path: &str,
    version: &str,
) -> Result<Option<ModuleRecord>, QueryError> {
    let raw = query
        .query(location, &TargetSpec::pinned(path, version))
        .await?;
    let record = decode_records(&raw)?.into_iter().next();
    if record.is_none() {
        warn!("Lookup of {}@{} returned no module record", path, version);
    }
    Ok(record)
}
