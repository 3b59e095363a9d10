//! In-memory gauge registry rendered in the Prometheus text format

use std::fmt::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::metrics::sink::MetricsSink;
use crate::module::types::DependencyKind;

/// Content type of the rendered exposition
pub const TEXT_FORMAT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

struct GaugeFamily {
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
    values: IndexMap<Vec<String>, f64>,
}

impl GaugeFamily {
    fn new(name: &'static str, help: &'static str, labels: &'static [&'static str]) -> Self {
        Self {
            name,
            help,
            labels,
            values: IndexMap::new(),
        }
    }

    fn set(&mut self, label_values: &[&str], value: f64) {
        debug_assert_eq!(label_values.len(), self.labels.len());
        let key = label_values.iter().map(|v| v.to_string()).collect();
        self.values.insert(key, value);
    }

    fn render(&self, namespace: &str, out: &mut String) {
        // Unlabelled gauges always exist; labelled ones only once set
        if !self.labels.is_empty() && self.values.is_empty() {
            return;
        }
        let full_name = format!("{}_{}", namespace, self.name);
        let _ = writeln!(out, "# HELP {} {}", full_name, self.help);
        let _ = writeln!(out, "# TYPE {} gauge", full_name);

        if self.labels.is_empty() {
            let value = self.values.values().next().copied().unwrap_or(0.0);
            let _ = writeln!(out, "{} {}", full_name, format_value(value));
            return;
        }

        for (label_values, value) in &self.values {
            let labels = self
                .labels
                .iter()
                .zip(label_values)
                .map(|(name, value)| format!("{}=\"{}\"", name, escape_label_value(value)))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(out, "{}{{{}}} {}", full_name, labels, format_value(*value));
        }
    }
}

struct Families {
    info: GaugeFamily,
    deprecated: GaugeFamily,
    replaced: GaugeFamily,
    status: GaugeFamily,
    duration: GaugeFamily,
}

/// Namespace-prefixed gauge registry implementing [`MetricsSink`]
pub struct GaugeRegistry {
    namespace: String,
    families: Mutex<Families>,
}

impl GaugeRegistry {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            families: Mutex::new(Families {
                info: GaugeFamily::new(
                    "info",
                    "Informations about given repository, value always 1",
                    &["module", "goversion"],
                ),
                deprecated: GaugeFamily::new(
                    "deprecated",
                    "Number of days since given dependency of repository is out-of-date",
                    &["module", "dependency", "type", "current", "latest"],
                ),
                replaced: GaugeFamily::new(
                    "replaced",
                    "Give information about module replacements",
                    &["module", "dependency", "type", "replacement", "version"],
                ),
                status: GaugeFamily::new(
                    "status",
                    "Status of last analysis of given repository, 0 for error",
                    &["repository"],
                ),
                duration: GaugeFamily::new(
                    "duration",
                    "Duration of last analysis in second",
                    &[],
                ),
            }),
        }
    }

    fn families(&self) -> MutexGuard<'_, Families> {
        self.families.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Render all gauges in the Prometheus text exposition format
    pub fn render(&self) -> String {
        let families = self.families();
        let mut out = String::new();
        for family in [
            &families.info,
            &families.deprecated,
            &families.replaced,
            &families.status,
            &families.duration,
        ] {
            family.render(&self.namespace, &mut out);
        }
        out
    }
}

impl MetricsSink for GaugeRegistry {
    fn set_info(&self, module: &str, go_version: &str) {
        self.families().info.set(&[module, go_version], 1.0);
    }

    fn set_deprecated(
        &self,
        module: &str,
        dependency: &str,
        kind: DependencyKind,
        current: &str,
        latest: &str,
        value: f64,
    ) {
        self.families()
            .deprecated
            .set(&[module, dependency, kind.as_str(), current, latest], value);
    }

    fn set_replaced(
        &self,
        module: &str,
        dependency: &str,
        kind: DependencyKind,
        replacement: &str,
        version: &str,
    ) {
        self.families()
            .replaced
            .set(&[module, dependency, kind.as_str(), replacement, version], 1.0);
    }

    fn set_status(&self, repository: &str, ok: bool) {
        self.families()
            .status
            .set(&[repository], if ok { 1.0 } else { 0.0 });
    }

    fn set_duration(&self, seconds: f64) {
        self.families().duration.set(&[], seconds);
    }
}

fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
