//! Prometheus push gateway transport

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use thiserror::Error;
use tracing::debug;

use crate::metrics::registry::TEXT_FORMAT_CONTENT_TYPE;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Push gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unable to write metrics: {0}")]
    Io(#[from] std::io::Error),
}

/// Client pushing rendered metrics to a push gateway
pub struct PushGateway {
    client: reqwest::Client,
    base_url: String,
    job: String,
}

impl PushGateway {
    /// Creates a PushGateway for `job`, optionally skipping TLS verification
    pub fn new(base_url: &str, job: &str, skip_tls_verify: bool) -> Result<Self, PushError> {
        let client = reqwest::Client::builder()
            .user_agent("gomod-exporter")
            .danger_accept_invalid_certs(skip_tls_verify)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            job: job.to_string(),
        })
    }

    /// Grouping url of `job` and the given label, label value base64-encoded
    fn grouping_url(&self, label: &str, value: &str) -> String {
        format!(
            "{}/metrics/job/{}/{}@base64/{}",
            self.base_url,
            urlencode_segment(&self.job),
            label,
            encode_label_value(value)
        )
    }

    /// Replace the metrics of the `label=value` group with `body`
    pub async fn push(&self, label: &str, value: &str, body: String) -> Result<(), PushError> {
        let url = self.grouping_url(label, value);
        debug!("Pushing metrics to {}", url);

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, TEXT_FORMAT_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Url-safe base64 without padding; an empty value is sent as a single "="
fn encode_label_value(value: &str) -> String {
    if value.is_empty() {
        "=".to_string()
    } else {
        URL_SAFE_NO_PAD.encode(value)
    }
}

fn urlencode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
