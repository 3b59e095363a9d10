//! Fake collaborators for analyzer tests

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use gomod_exporter::checkout::{CheckedOut, Checkout, CheckoutError};
use gomod_exporter::config::ProjectConfig;
use gomod_exporter::module::error::QueryError;
use gomod_exporter::module::query::{ModuleGraphQuery, TargetSpec};

/// Module graph query answering from canned record streams
#[derive(Default)]
pub struct FakeQuery {
    graph: Mutex<Vec<Result<Vec<u8>, String>>>,
    pinned: HashMap<String, Vec<u8>>,
    pinned_calls: Mutex<Vec<String>>,
}

impl FakeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer of the next full graph query; the last one repeats
    pub fn with_graph(self, raw: &str) -> Self {
        self.graph.lock().unwrap().push(Ok(raw.as_bytes().to_vec()));
        self
    }

    /// Queue a failing full graph query
    pub fn with_graph_failure(self, message: &str) -> Self {
        self.graph.lock().unwrap().push(Err(message.to_string()));
        self
    }

    /// Answer `path@version` lookups with `raw`; unknown lookups fail
    pub fn with_pinned(mut self, path: &str, version: &str, raw: &str) -> Self {
        self.pinned
            .insert(format!("{}@{}", path, version), raw.as_bytes().to_vec());
        self
    }

    pub fn pinned_calls(&self) -> Vec<String> {
        self.pinned_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModuleGraphQuery for FakeQuery {
    async fn query(&self, _location: &Path, target: &TargetSpec) -> Result<Vec<u8>, QueryError> {
        match target {
            TargetSpec::All => {
                let mut graph = self.graph.lock().unwrap();
                let answer = if graph.len() > 1 {
                    graph.remove(0)
                } else {
                    graph.first().cloned().unwrap_or_else(|| Ok(Vec::new()))
                };
                answer.map_err(|message| QueryError::Spawn {
                    program: "go".to_string(),
                    source: std::io::Error::other(message),
                })
            }
            TargetSpec::Pinned { .. } => {
                let key = target.to_string();
                self.pinned_calls.lock().unwrap().push(key.clone());
                self.pinned.get(&key).cloned().ok_or_else(|| QueryError::Spawn {
                    program: "go".to_string(),
                    source: std::io::Error::other(format!("unknown module {}", key)),
                })
            }
        }
    }
}

/// Start or end of one checkout, stamped with tokio time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    Start(String, Instant),
    End(String, Instant),
}

/// Checkout into empty temp dirs, with optional per-project delay and failure
#[derive(Default)]
pub struct FakeCheckout {
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    events: Arc<Mutex<Vec<CheckoutEvent>>>,
}

impl FakeCheckout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn events(&self) -> Arc<Mutex<Vec<CheckoutEvent>>> {
        self.events.clone()
    }
}

#[async_trait]
impl Checkout for FakeCheckout {
    async fn checkout(&self, project: &ProjectConfig) -> Result<CheckedOut, CheckoutError> {
        self.events
            .lock()
            .unwrap()
            .push(CheckoutEvent::Start(project.url.clone(), Instant::now()));

        if let Some(delay) = self.delays.get(&project.url) {
            tokio::time::sleep(*delay).await;
        }

        self.events
            .lock()
            .unwrap()
            .push(CheckoutEvent::End(project.url.clone(), Instant::now()));

        if self.failing.contains(&project.url) {
            return Err(CheckoutError::Spawn(std::io::Error::other("clone failed")));
        }
        Ok(CheckedOut::new(tempfile::tempdir().unwrap()))
    }
}

/// Value of the first rendered sample starting with `series`
pub fn gauge_value(rendered: &str, series: &str) -> Option<f64> {
    rendered
        .lines()
        .find(|line| line.starts_with(series))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}
