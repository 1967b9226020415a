//! reqwest-backed [`JsonSource`] for the Câmara and Senado open-data APIs.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::{debug, field, info, instrument, Span};

use legis_core::logging::{DURATION_MS, STATUS};
use legis_core::{Error, JsonSource, Result};

use crate::config::CatalogConfig;

/// HTTP source for the open-data listing endpoints.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Create a source with the configured timeout and User-Agent.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            timeout_secs = config.timeout_secs,
            user_agent = %config.user_agent,
            "Initializing HTTP source"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl JsonSource for HttpSource {
    #[instrument(
        skip(self, endpoint, params),
        fields(
            subsystem = "catalog",
            component = "http",
            op = "get_json",
            endpoint = %endpoint,
            status = field::Empty,
            duration_ms = field::Empty,
        )
    )]
    async fn get_json(
        &self,
        base_url: &str,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<JsonValue> {
        let start = Instant::now();
        let url = format!("{}{}", base_url.trim_end_matches('/'), endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        Span::current().record(STATUS, u64::from(status.as_u16()));
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| Error::Shape(format!("Failed to parse response from {}: {}", url, e)))?;

        Span::current().record(DURATION_MS, start.elapsed().as_millis() as u64);
        debug!("Request complete");
        Ok(body)
    }
}
