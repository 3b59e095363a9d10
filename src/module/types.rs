//! Module record types as emitted by `go list -m -json`

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One node of a module graph snapshot
///
/// Field names follow the `go list` JSON output (`Path`, `GoVersion`, ...);
/// snake_case spellings are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ModuleRecord {
    #[serde(alias = "path")]
    pub path: String,
    #[serde(alias = "version")]
    pub version: String,
    /// Known versions in the order supplied by the source, not necessarily sorted
    #[serde(alias = "versions")]
    pub versions: Vec<String>,
    #[serde(alias = "replace")]
    pub replace: Option<Box<ModuleRecord>>,
    /// Release time of `version`
    #[serde(alias = "time")]
    pub time: Option<DateTime<Utc>>,
    /// Latest known newer version, when the source reports one
    #[serde(alias = "update")]
    pub update: Option<Box<ModuleRecord>>,
    #[serde(alias = "main")]
    pub main: bool,
    #[serde(alias = "indirect")]
    pub indirect: bool,
    #[serde(alias = "dir")]
    pub dir: String,
    #[serde(alias = "go_mod")]
    pub go_mod: String,
    #[serde(alias = "go_version")]
    pub go_version: String,
    #[serde(alias = "error")]
    pub error: Option<ModuleLoadError>,
}

/// Error payload reported by the source while loading a module
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModuleLoadError {
    #[serde(rename = "Err", alias = "err")]
    pub err: String,
}

impl ModuleRecord {
    /// Creates a record with only path and version set
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Whether the source reported a newer version for this module
    pub fn is_outdated(&self) -> bool {
        self.update.is_some()
    }
}

/// Direct or transitive requirement of the main module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Direct,
    Indirect,
}

impl DependencyKind {
    pub fn from_indirect(indirect: bool) -> Self {
        if indirect {
            DependencyKind::Indirect
        } else {
            DependencyKind::Direct
        }
    }

    /// Returns the label value used in emitted metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Direct => "direct",
            DependencyKind::Indirect => "indirect",
        }
    }
}

/// A dependency as seen by the later analysis stages
///
/// `path` and `kind` always come from the record listed in the graph, while
/// `effective` is the replacement target when a replace directive applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub path: String,
    pub kind: DependencyKind,
    pub effective: ModuleRecord,
}

/// A replace directive found while partitioning the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub path: String,
    pub kind: DependencyKind,
    pub replacement_path: String,
    pub replacement_version: String,
}

/// Partitioned module graph of one project
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleGraph {
    pub main: ModuleRecord,
    pub dependencies: Vec<Dependency>,
    pub replacements: Vec<Replacement>,
}
