//! One-shot analysis of a single project, delivered once

use std::io::Write;

use tracing::info;

use crate::analyzer::Analyzer;
use crate::config::ProjectConfig;
use crate::metrics::push::{PushError, PushGateway};
use crate::metrics::registry::GaugeRegistry;

/// Grouping label of pushed metrics, valued with the project url
pub const GROUPING_LABEL: &str = "repository";

/// Where the rendered metrics of a one-shot run go
pub enum Destination<'a> {
    /// Replace the project's group on a push gateway
    Gateway(PushGateway),
    /// Write the exposition text as is, e.g. to stdout
    Writer(&'a mut dyn Write),
}

/// Analyze `project` once and deliver the content of `registry`
///
/// A failed analysis is not an error here: it is already logged and shows
/// as `status=0` in the delivered metrics. Only delivery failures are
/// returned.
pub async fn push_project(
    analyzer: &Analyzer,
    registry: &GaugeRegistry,
    project: &ProjectConfig,
    destination: Destination<'_>,
) -> Result<(), PushError> {
    let _ = analyzer.process_project(project).await;

    let body = registry.render();
    match destination {
        Destination::Writer(writer) => {
            writer.write_all(body.as_bytes())?;
            writer.flush()?;
        }
        Destination::Gateway(gateway) => {
            gateway.push(GROUPING_LABEL, &project.url, body).await?;
            info!("metrics of {} pushed", project.url);
        }
    }
    Ok(())
}
