//! Project analysis and the periodic analysis loop
//!
//! Each project run goes through checkout, full module graph query, decoding,
//! partitioning, next-version resolution of every outdated dependency and
//! finally emission into the metrics sink. A failure before resolution aborts
//! the run and only the status and duration gauges are written; the previous
//! dependency gauges of the project stay untouched.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{Instrument, debug, error, info, info_span};

use crate::checkout::{Checkout, CheckoutError};
use crate::config::ProjectConfig;
use crate::metrics::sink::MetricsSink;
use crate::module::decoder::decode_records;
use crate::module::error::{PartitionError, QueryError};
use crate::module::partition::partition;
use crate::module::query::{ModuleGraphQuery, TargetSpec};
use crate::module::types::{ModuleGraph, Replacement};
use crate::version::resolver::resolve_next_update;
use crate::version::staleness::DependencyStaleness;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Unable to checkout: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Unable to run go analysis: {0}")]
    Query(#[from] QueryError),

    #[error("Invalid module graph: {0}")]
    Partition(#[from] PartitionError),
}

/// Result of one successful project analysis
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectReport {
    pub module: String,
    pub go_version: String,
    pub dependencies: Vec<DependencyStaleness>,
    pub replacements: Vec<Replacement>,
}

/// Drives project analyses and writes their results to a metrics sink
pub struct Analyzer {
    projects: Vec<ProjectConfig>,
    checkout: Arc<dyn Checkout>,
    query: Arc<dyn ModuleGraphQuery>,
    metrics: Arc<dyn MetricsSink>,
}

impl Analyzer {
    pub fn new(
        projects: Vec<ProjectConfig>,
        checkout: Arc<dyn Checkout>,
        query: Arc<dyn ModuleGraphQuery>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            projects,
            checkout,
            query,
            metrics,
        }
    }

    /// Analyze every configured project, then wait `interval`, forever
    ///
    /// Projects are processed one after another and a tick only starts once
    /// the previous tick and its sleep are over.
    pub async fn run_forever(&self, interval: Duration) {
        loop {
            self.run_once().await;
            sleep(interval).await;
        }
    }

    /// Analyze every configured project once
    pub async fn run_once(&self) {
        info!("running full analyze");
        for project in &self.projects {
            // Failures are logged by process_project and show in the status gauge
            let _ = self.process_project(project).await;
        }
    }

    /// Analyze a single project and emit its metrics
    pub async fn process_project(
        &self,
        project: &ProjectConfig,
    ) -> Result<ProjectReport, AnalyzeError> {
        let span = info_span!("project", url = %project.url, username = %project.username());
        async {
            let start = Instant::now();
            let result = self.analyze_project(project).await;

            match &result {
                Ok(report) => {
                    self.write_metrics(report);
                    self.metrics.set_status(&project.url, true);
                }
                Err(e) => {
                    error!("project analysis failed: {}", e);
                    self.metrics.set_status(&project.url, false);
                }
            }
            self.metrics.set_duration(start.elapsed().as_secs_f64());

            result
        }
        .instrument(span)
        .await
    }

    async fn analyze_project(&self, project: &ProjectConfig) -> Result<ProjectReport, AnalyzeError> {
        info!("analysing project");

        debug!("cloning repository");
        let checkout = self.checkout.checkout(project).await?;

        debug!("extracting go modules");
        let graph = self.module_graph(checkout.path()).await?;

        let report = self.assess(checkout.path(), graph).await;
        Ok(report)
    }

    async fn module_graph(&self, location: &Path) -> Result<ModuleGraph, AnalyzeError> {
        let raw = self.query.query(location, &TargetSpec::All).await?;
        let records = decode_records(&raw)?;
        Ok(partition(records)?)
    }

    async fn assess(&self, location: &Path, graph: ModuleGraph) -> ProjectReport {
        let mut dependencies = Vec::with_capacity(graph.dependencies.len());

        for dependency in &graph.dependencies {
            let next_update = if dependency.effective.is_outdated() {
                resolve_next_update(self.query.as_ref(), location, &dependency.effective).await
            } else {
                None
            };
            dependencies.push(DependencyStaleness::assess(
                dependency,
                next_update.as_ref(),
                Utc::now(),
            ));
        }

        ProjectReport {
            module: graph.main.path,
            go_version: graph.main.go_version,
            dependencies,
            replacements: graph.replacements,
        }
    }

    fn write_metrics(&self, report: &ProjectReport) {
        debug!("writing statistics");
        self.metrics.set_info(&report.module, &report.go_version);

        for replacement in &report.replacements {
            self.metrics.set_replaced(
                &report.module,
                &replacement.path,
                replacement.kind,
                &replacement.replacement_path,
                &replacement.replacement_version,
            );
        }

        for dependency in &report.dependencies {
            self.metrics.set_deprecated(
                &report.module,
                &dependency.path,
                dependency.kind,
                &dependency.current_version,
                &dependency.latest_version,
                dependency.staleness.as_gauge_value(),
            );
        }
    }
}
