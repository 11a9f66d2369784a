//! Spreadsheet webhook sink.
//!
//! Posts each event as JSON to a configured URL. There is no authentication
//! header, no retry, and the response body is never read; a non-2xx status is
//! logged but still counts as submitted.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{AttendanceSink, RelayEvent};
use crate::error::{Result, RollcallError};

/// Default timeout for webhook requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the webhook sink.
#[derive(Debug, Clone)]
pub struct WebhookSinkConfig {
    /// Endpoint receiving the POSTed events.
    pub endpoint: Url,
    /// Request timeout.
    pub timeout: Duration,
}

impl WebhookSinkConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Fire-and-forget JSON webhook.
pub struct WebhookSink {
    client: Client,
    config: WebhookSinkConfig,
}

impl WebhookSink {
    pub fn new(config: WebhookSinkConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RollcallError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &Url {
        &self.config.endpoint
    }
}

#[async_trait]
impl AttendanceSink for WebhookSink {
    #[instrument(skip(self, event), fields(action = event.action()))]
    async fn submit(&self, event: &RelayEvent) -> Result<()> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .json(event)
            .send()
            .await
            .map_err(|e| {
                let latency_ms = start.elapsed().as_millis() as u64;
                warn!(error = %e, latency_ms, "Webhook request failed");
                RollcallError::RelayFailed(format!("Webhook request failed: {e}"))
            })?;

        let status = response.status();
        let latency_ms = start.elapsed().as_millis() as u64;
        if status.is_success() {
            debug!(status = %status, latency_ms, "Webhook accepted event");
        } else {
            // Opaque sink: a non-success status is not a delivery failure here.
            debug!(status = %status, latency_ms, "Webhook returned non-success status, ignored");
        }

        Ok(())
    }
}

impl std::fmt::Debug for WebhookSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSink")
            .field("endpoint", &self.config.endpoint.as_str())
            .field("timeout", &self.config.timeout)
            .finish()
    }
}
