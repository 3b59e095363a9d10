//! Shallow git checkout of analyzed projects

#[cfg(test)]
use mockall::automock;

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::config::{GitAuth, ProjectConfig};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Unable to create checkout directory: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("Invalid repository url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git clone exited with {status}: {stderr}")]
    Clone {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// A checked out working copy, removed from disk when dropped
#[derive(Debug)]
pub struct CheckedOut {
    dir: TempDir,
}

impl CheckedOut {
    pub fn new(dir: TempDir) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Trait for acquiring a local working copy of a project
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Checkout: Send + Sync {
    async fn checkout(&self, project: &ProjectConfig) -> Result<CheckedOut, CheckoutError>;
}

/// Checks out projects with `git clone --depth 1`
#[derive(Debug, Default)]
pub struct GitCheckout;

#[async_trait::async_trait]
impl Checkout for GitCheckout {
    async fn checkout(&self, project: &ProjectConfig) -> Result<CheckedOut, CheckoutError> {
        let dir = tempfile::Builder::new()
            .prefix("git-checkout")
            .tempdir()
            .map_err(CheckoutError::TempDir)?;

        debug!("Cloning repository into {:?}", dir.path());

        let output = clone_command(project, dir.path())?
            .output()
            .await
            .map_err(CheckoutError::Spawn)?;

        if !output.status.success() {
            return Err(CheckoutError::Clone {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CheckedOut::new(dir))
    }
}

/// Builds the clone command; credentials travel in the environment, never
/// in the arguments
fn clone_command(project: &ProjectConfig, target: &Path) -> Result<Command, CheckoutError> {
    let mut command = Command::new("git");
    command
        .args([
            "clone",
            "--depth",
            "1",
            "--single-branch",
            "--no-recurse-submodules",
            "--quiet",
        ])
        .arg(&project.url)
        .arg(target)
        .env("GIT_TERMINAL_PROMPT", "0")
        .kill_on_drop(true);

    if let Some(auth) = &project.auth {
        ensure_http_url(&project.url)?;
        command.envs(auth_env(auth));
    }
    Ok(command)
}

/// Basic auth passed as an extra http header through git's environment config
fn auth_env(auth: &GitAuth) -> [(&'static str, String); 3] {
    let credentials = STANDARD.encode(format!("{}:{}", auth.username, auth.password));
    [
        ("GIT_CONFIG_COUNT", "1".to_string()),
        ("GIT_CONFIG_KEY_0", "http.extraHeader".to_string()),
        (
            "GIT_CONFIG_VALUE_0",
            format!("Authorization: Basic {}", credentials),
        ),
    ]
}

/// Credentials are only sent as http headers, so other transports are refused
fn ensure_http_url(url: &str) -> Result<(), CheckoutError> {
    let invalid = |reason: String| CheckoutError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(format!(
            "credentials require http(s), got {}",
            scheme
        ))),
    }
}
