//! Tomorrow.io forecast client.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{Config, ForecastDocument, ForecastError};

use super::ForecastProvider;

const FORECAST_PATH: &str = "/v4/weather/forecast";

#[derive(Clone)]
pub struct TomorrowIoProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for TomorrowIoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TomorrowIoProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TomorrowIoProvider {
    /// Provider against the public endpoint with the default timeout.
    pub fn new(api_key: String) -> Result<Self, ForecastError> {
        Self::from_config(api_key, &Config::default())
    }

    /// Provider using the base URL and timeout from `config`.
    pub fn from_config(api_key: String, config: &Config) -> Result<Self, ForecastError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ForecastError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// `{base}/v4/weather/forecast?location=..&apikey=..`
    pub fn forecast_url(&self, location: &str) -> Result<Url, ForecastError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ForecastError::InvalidRequest("Location must not be empty".to_string()));
        }

        let endpoint = format!("{}{FORECAST_PATH}", self.base_url);
        let url = Url::parse_with_params(
            &endpoint,
            &[("location", location), ("apikey", self.api_key.as_str())],
        )
        .map_err(|e| {
            ForecastError::InvalidRequest(format!("Invalid forecast endpoint '{endpoint}': {e}"))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ForecastError::InvalidRequest(format!(
                "Unsupported scheme '{}' in forecast endpoint",
                url.scheme()
            )));
        }

        Ok(url)
    }
}

#[async_trait]
impl ForecastProvider for TomorrowIoProvider {
    #[instrument(skip(self))]
    async fn fetch_forecast(&self, location: &str) -> Result<ForecastDocument, ForecastError> {
        let url = self.forecast_url(location)?;

        debug!(base_url = %self.base_url, "Requesting forecast");

        let res = self.http.get(url).send().await.map_err(|e| {
            let err = send_error(e);
            warn!(error = %err, "Forecast request failed");
            err
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            ForecastError::Transport(format!(
                "Failed to read forecast response body: {}",
                e.without_url()
            ))
        })?;

        if !status.is_success() {
            warn!(%status, "Forecast request rejected");
            return Err(ForecastError::Transport(format!(
                "Forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let document: ForecastDocument = serde_json::from_str(&body)
            .map_err(|e| ForecastError::Decode(format!("Failed to parse forecast JSON: {e}")))?;

        debug!(daily = document.timelines.daily.len(), "Forecast decoded");

        Ok(document)
    }
}

/// The URL carries the API key, so it is dropped from the surfaced error.
fn send_error(e: reqwest::Error) -> ForecastError {
    if e.is_builder() {
        ForecastError::InvalidRequest(format!("Failed to build forecast request: {}", e.without_url()))
    } else if e.is_timeout() {
        ForecastError::Transport(format!("Forecast request timed out: {}", e.without_url()))
    } else {
        ForecastError::Transport(format!("Failed to send forecast request: {}", e.without_url()))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
