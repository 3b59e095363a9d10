//! Splits a decoded module graph into main module, dependencies and replacements

use tracing::warn;

use crate::module::error::PartitionError;
use crate::module::types::{Dependency, DependencyKind, ModuleGraph, ModuleRecord, Replacement};

/// Partition the records of a full (`all`) module graph
///
/// Exactly one record must be flagged as main. Every other record becomes a
/// dependency; when it carries a replace directive the replacement target is
/// used for versions and staleness while the original path and kind are kept
/// for labeling.
pub fn partition(records: Vec<ModuleRecord>) -> Result<ModuleGraph, PartitionError> {
    let (mains, others): (Vec<_>, Vec<_>) = records.into_iter().partition(|r| r.main);

    let main = match <[ModuleRecord; 1]>::try_from(mains) {
        Ok([main]) => main,
        Err(mains) if mains.is_empty() => return Err(PartitionError::NoMain),
        Err(mains) => {
            return Err(PartitionError::MultipleMain {
                count: mains.len(),
                paths: mains.into_iter().map(|m| m.path).collect(),
            });
        }
    };

    let mut dependencies = Vec::with_capacity(others.len());
    let mut replacements = Vec::new();

    for mut record in others {
        if let Some(load_error) = &record.error {
            warn!("Module {} reported an error: {}", record.path, load_error.err);
        }

        let kind = DependencyKind::from_indirect(record.indirect);
        let path = record.path.clone();

        let effective = match record.replace.take() {
            Some(target) => {
                replacements.push(Replacement {
                    path: path.clone(),
                    kind,
                    replacement_path: target.path.clone(),
                    replacement_version: target.version.clone(),
                });
                *target
            }
            None => record,
        };

        dependencies.push(Dependency {
            path,
            kind,
            effective,
        });
    }

    Ok(ModuleGraph {
        main,
        dependencies,
        replacements,
    })
}
