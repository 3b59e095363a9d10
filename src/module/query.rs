//! Module graph query trait and its `go list` implementation

#[cfg(test)]
use mockall::automock;

use std::fmt;
use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use crate::config::DEFAULT_GO_BINARY;
use crate::module::error::QueryError;

/// What a module graph query should list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// The full module graph of the project (`all`)
    All,
    /// A single module pinned at one version (`path@version`)
    Pinned { path: String, version: String },
}

impl TargetSpec {
    pub fn pinned(path: impl Into<String>, version: impl Into<String>) -> Self {
        TargetSpec::Pinned {
            path: path.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::All => f.write_str("all"),
            TargetSpec::Pinned { path, version } => write!(f, "{}@{}", path, version),
        }
    }
}

/// Trait for listing the module records of a checked out project
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ModuleGraphQuery: Send + Sync {
    /// Returns the raw, concatenated JSON record stream for `target`
    ///
    /// # Arguments
    /// * `location` - Directory holding the project's `go.mod`
    /// * `target` - Full graph or a single pinned module
    async fn query(&self, location: &Path, target: &TargetSpec) -> Result<Vec<u8>, QueryError>;
}

/// Queries module graphs by running `go list -m -json`
pub struct GoListQuery {
    go_binary: String,
}

impl GoListQuery {
    /// Creates a GoListQuery running a custom `go` binary
    pub fn new(go_binary: &str) -> Self {
        Self {
            go_binary: go_binary.to_string(),
        }
    }

    fn args(target: &TargetSpec) -> Vec<String> {
        let mut args = vec!["list".to_string(), "-m".to_string()];
        if *target == TargetSpec::All {
            args.push("-u".to_string());
            args.push("-versions".to_string());
        }
        args.push("-json".to_string());
        args.push(target.to_string());
        args
    }
}

impl Default for GoListQuery {
    fn default() -> Self {
        Self::new(DEFAULT_GO_BINARY)
    }
}

#[async_trait::async_trait]
impl ModuleGraphQuery for GoListQuery {
    async fn query(&self, location: &Path, target: &TargetSpec) -> Result<Vec<u8>, QueryError> {
        let args = Self::args(target);
        debug!("Running {} {} in {:?}", self.go_binary, args.join(" "), location);

        let output = Command::new(&self.go_binary)
            .args(&args)
            .current_dir(location)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| QueryError::Spawn {
                program: self.go_binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(QueryError::Command {
                program: self.go_binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
