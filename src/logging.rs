//! `tracing` subscriber setup

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

/// Level directive for a configured level name, `error` when unknown
pub fn level_directive(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        _ => "error",
    }
}

/// Build the filter, letting `RUST_LOG` override the configured level
fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(&config.level)))
}

/// Install the global subscriber writing to stderr
///
/// The returned guard flushes buffered log lines when dropped and must be
/// kept alive for the whole process.
pub fn init(config: &LogConfig) -> anyhow::Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let registry = tracing_subscriber::registry().with(env_filter(config));

    if config.json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(!config.no_color)
                    .with_writer(writer),
            )
            .try_init()?;
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DEBUG", "debug")]
    #[case("info", "info")]
    #[case("Warn", "warn")]
    #[case("warning", "warn")]
    #[case("trace", "trace")]
    #[case("error", "error")]
    #[case("fatal", "error")]
    #[case("", "error")]
    fn level_directive_returns_expected(#[case] level: &str, #[case] expected: &str) {
        assert_eq!(level_directive(level), expected);
    }
}
