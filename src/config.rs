use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Defaults
// =============================================================================

/// Default analysis interval (24 hours)
pub const DEFAULT_INTERVAL: &str = "24h";

/// Default HTTP path of the metrics endpoint
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Default metric name prefix
pub const DEFAULT_NAMESPACE: &str = "gomod";

/// Default listen address of the metrics endpoint
pub const DEFAULT_LISTEN: &str = ":23352";

/// Default Go toolchain binary used to list modules
pub const DEFAULT_GO_BINARY: &str = "go";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to read configuration yaml/json file: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration of the long-running exporter
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub projects: Vec<ProjectConfig>,
    pub exporter: ExporterConfig,
    pub web: WebConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// error, warn, info, debug or trace
    pub level: String,
    pub json: bool,
    pub no_color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
            json: false,
            no_color: false,
        }
    }
}

/// One git project to analyze
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ProjectConfig {
    pub url: String,
    #[serde(default)]
    pub auth: Option<GitAuth>,
}

impl ProjectConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth: None,
        }
    }

    /// User name reported in logs
    pub fn username(&self) -> &str {
        match &self.auth {
            Some(auth) if !auth.username.is_empty() => &auth.username,
            _ => "(no-auth)",
        }
    }
}

/// Basic auth credentials for git over http(s)
#[derive(Clone, Deserialize, Default, PartialEq)]
pub struct GitAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for GitAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Analysis loop and metric naming settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExporterConfig {
    /// Go-style duration between two analyses, e.g. "24h" or "1h30m"
    pub interval: String,
    pub path: String,
    pub namespace: String,
    pub go_binary: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL.to_string(),
            path: DEFAULT_METRICS_PATH.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            go_binary: DEFAULT_GO_BINARY.to_string(),
        }
    }
}

impl ExporterConfig {
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.interval).ok_or_else(|| {
            ConfigError::Invalid(format!("invalid exporter.interval value '{}'", self.interval))
        })
    }
}

/// Metrics endpoint settings
///
/// The endpoint is served over https when both `ssl_key` and `ssl_cert` are
/// set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebConfig {
    pub listen: String,
    /// PEM encoded private key
    pub ssl_key: Option<PathBuf>,
    /// PEM encoded certificate chain
    pub ssl_cert: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            ssl_key: None,
            ssl_cert: None,
        }
    }
}

/// Certificate and key paths of an https endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TlsFiles<'a> {
    pub cert: &'a Path,
    pub key: &'a Path,
}

impl WebConfig {
    /// Certificate and key to serve https with, if configured
    pub fn tls(&self) -> Option<TlsFiles<'_>> {
        match (&self.ssl_cert, &self.ssl_key) {
            (Some(cert), Some(key)) => Some(TlsFiles { cert, key }),
            _ => None,
        }
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.listen.is_empty() {
            self.listen = DEFAULT_LISTEN.to_string();
        }
        // Empty strings count as unset
        self.ssl_key = self.ssl_key.take().filter(|p| !p.as_os_str().is_empty());
        self.ssl_cert = self.ssl_cert.take().filter(|p| !p.as_os_str().is_empty());

        for (name, path) in [("web.ssl_key", &self.ssl_key), ("web.ssl_cert", &self.ssl_cert)] {
            if let Some(path) = path.as_ref().filter(|p| !p.is_file()) {
                return Err(ConfigError::Invalid(format!(
                    "{}: file not found: {}",
                    name,
                    path.display()
                )));
            }
        }
        if self.ssl_key.is_some() != self.ssl_cert.is_some() {
            return Err(ConfigError::Invalid(
                "web.ssl_key and web.ssl_cert must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address to bind, ":port" meaning all interfaces
    pub fn listen_addr(&self) -> String {
        if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen)
        } else {
            self.listen.clone()
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse YAML, falling back to JSON, then validate
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = match serde_yaml::from_str(content) {
            Ok(config) => config,
            Err(yaml_err) => serde_json::from_str(content).map_err(|json_err| {
                ConfigError::Parse(format!("yaml: {}, json: {}", yaml_err, json_err))
            })?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Fill empty settings with their defaults and check the rest
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if let Some(idx) = self.projects.iter().position(|p| p.url.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "projects[{}]: url must not be empty",
                idx
            )));
        }

        let exporter = &mut self.exporter;
        if exporter.interval.is_empty() {
            exporter.interval = DEFAULT_INTERVAL.to_string();
        }
        if exporter.path.is_empty() {
            exporter.path = DEFAULT_METRICS_PATH.to_string();
        }
        if exporter.namespace.is_empty() {
            exporter.namespace = DEFAULT_NAMESPACE.to_string();
        }
        if exporter.go_binary.is_empty() {
            exporter.go_binary = DEFAULT_GO_BINARY.to_string();
        }
        exporter.interval()?;
        if !exporter.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "exporter.path must start with '/', got '{}'",
                exporter.path
            )));
        }

        self.web.validate()
    }
}

/// Parse a Go-style duration string ("300ms", "90s", "1h30m", "1.5h")
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value == "0" {
        return Some(Duration::ZERO);
    }
    if value.is_empty() {
        return None;
    }

    let mut total = 0f64;
    let mut rest = value;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total += number * seconds_per_unit;
    }

    Duration::try_from_secs_f64(total).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn config_from_minimal_yaml_uses_defaults() {
        let config = Config::parse("projects:\n  - url: https://github.com/org/repo\n").unwrap();

        assert_eq!(config.projects, vec![ProjectConfig::new("https://github.com/org/repo")]);
        assert_eq!(config.exporter, ExporterConfig::default());
        assert_eq!(config.web.listen, ":23352");
        assert_eq!(config.log.level, "error");
        assert_eq!(config.exporter.interval().unwrap(), Duration::from_secs(86400));
    }

    #[test]
    fn config_from_full_yaml_parses_all_fields() {
        let config = Config::parse(
            r#"
log:
  level: debug
  json: true
  no_color: true
projects:
  - url: https://github.com/org/repo
    auth:
      username: bot
      password: s3cret
exporter:
  interval: 1h30m
  path: /custom
  namespace: deps
  go_binary: /usr/local/go/bin/go
web:
  listen: 127.0.0.1:9000
"#,
        )
        .unwrap();

        assert_eq!(
            config,
            Config {
                log: LogConfig {
                    level: "debug".to_string(),
                    json: true,
                    no_color: true,
                },
                projects: vec![ProjectConfig {
                    url: "https://github.com/org/repo".to_string(),
                    auth: Some(GitAuth {
                        username: "bot".to_string(),
                        password: "s3cret".to_string(),
                    }),
                }],
                exporter: ExporterConfig {
                    interval: "1h30m".to_string(),
                    path: "/custom".to_string(),
                    namespace: "deps".to_string(),
                    go_binary: "/usr/local/go/bin/go".to_string(),
                },
                web: WebConfig {
                    listen: "127.0.0.1:9000".to_string(),
                    ssl_key: None,
                    ssl_cert: None,
                },
            }
        );
        assert_eq!(config.exporter.interval().unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn config_from_json_parses() {
        let config =
            Config::parse(r#"{"projects": [{"url": "https://example.com/r.git"}]}"#).unwrap();

        assert_eq!(config.projects[0].url, "https://example.com/r.git");
    }

    #[test]
    fn config_rejects_empty_project_url() {
        let result = Config::parse("projects:\n  - url: ''\n");

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_rejects_invalid_interval() {
        let result = Config::parse("exporter:\n  interval: daily\n");

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_fills_defaults_for_empty_values() {
        let config = Config::parse(
            "exporter:\n  interval: ''\n  path: ''\n  namespace: ''\nweb:\n  listen: ''\n",
        )
        .unwrap();

        assert_eq!(config.exporter, ExporterConfig::default());
        assert_eq!(config.web.listen, DEFAULT_LISTEN);
        assert_eq!(config.web.tls(), None);
    }

    #[test]
    fn config_reads_tls_files() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("key.pem");
        let cert = dir.path().join("cert.pem");
        std::fs::write(&key, "key").unwrap();
        std::fs::write(&cert, "cert").unwrap();

        let config = Config::parse(&format!(
            "web:\n  listen: ':8443'\n  ssl_key: {}\n  ssl_cert: {}\n",
            key.display(),
            cert.display()
        ))
        .unwrap();

        assert_eq!(
            config.web.tls(),
            Some(TlsFiles {
                cert: &cert,
                key: &key,
            })
        );
    }

    #[test]
    fn config_rejects_missing_tls_file() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        std::fs::write(&cert, "cert").unwrap();

        let result = Config::parse(&format!(
            "web:\n  ssl_key: {}\n  ssl_cert: {}\n",
            dir.path().join("missing.pem").display(),
            cert.display()
        ));

        assert!(
            matches!(result, Err(ConfigError::Invalid(ref message)) if message.contains("web.ssl_key"))
        );
    }

    #[test]
    fn config_rejects_tls_key_without_cert() {
        let mut key = tempfile::NamedTempFile::new().unwrap();
        writeln!(key, "key").unwrap();

        let result = Config::parse(&format!("web:\n  ssl_key: {}\n", key.path().display()));

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_rejects_unparseable_content() {
        let result = Config::parse("projects: [");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn config_load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "projects:\n  - url: https://github.com/org/repo").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.projects.len(), 1);
    }

    #[test]
    fn config_load_fails_for_missing_file() {
        let result = Config::load(Path::new("/nonexistent/config.yml"));

        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[rstest]
    #[case(None, "(no-auth)")]
    #[case(Some(("", "p")), "(no-auth)")]
    #[case(Some(("bot", "p")), "bot")]
    fn project_username_returns_expected(
        #[case] auth: Option<(&str, &str)>,
        #[case] expected: &str,
    ) {
        let project = ProjectConfig {
            url: "https://github.com/org/repo".to_string(),
            auth: auth.map(|(username, password)| GitAuth {
                username: username.to_string(),
                password: password.to_string(),
            }),
        };

        assert_eq!(project.username(), expected);
    }

    #[test]
    fn git_auth_debug_hides_password() {
        let auth = GitAuth {
            username: "bot".to_string(),
            password: "s3cret".to_string(),
        };

        assert!(!format!("{:?}", auth).contains("s3cret"));
    }

    #[rstest]
    #[case(":23352", "0.0.0.0:23352")]
    #[case("127.0.0.1:9000", "127.0.0.1:9000")]
    fn listen_addr_returns_expected(#[case] listen: &str, #[case] expected: &str) {
        let web = WebConfig {
            listen: listen.to_string(),
            ..Default::default()
        };

        assert_eq!(web.listen_addr(), expected);
    }

    #[rstest]
    #[case("24h", Some(Duration::from_secs(86400)))]
    #[case("1h30m", Some(Duration::from_secs(5400)))]
    #[case("90s", Some(Duration::from_secs(90)))]
    #[case("500ms", Some(Duration::from_millis(500)))]
    #[case("1.5h", Some(Duration::from_secs(5400)))]
    #[case("0", Some(Duration::ZERO))]
    #[case("", None)]
    #[case("10", None)]
    #[case("5d", None)]
    #[case("h", None)]
    fn parse_duration_returns_expected(#[case] value: &str, #[case] expected: Option<Duration>) {
        assert_eq!(parse_duration(value), expected);
    }
}
