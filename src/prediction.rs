//! Client for the external prediction service.
//!
//! The service is a black box that, for a hospital identifier, returns a
//! short-horizon ED load forecast together with alerts and transfer
//! recommendations. This is the only module in Sentinel that touches the
//! network.
//!
//! # Endpoints
//!
//! - `GET {base}/hospitals/{id}/predict` - forecast payload ([`PredictionResponse`])
//! - `GET {base}/api/health` - service liveness document
//!
//! Every call issues exactly one request. There is no retry and no cache;
//! requests are bounded by the configured timeout.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{DEFAULT_PREDICTION_URL, DEFAULT_TIMEOUT_MS, FailurePolicy, SentinelConfig};
use crate::error::PredictionError;
use crate::model::PredictionResponse;

/// Client for querying the prediction service.
#[derive(Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    policy: FailurePolicy,
}

impl Default for PredictionClient {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_PREDICTION_URL)
    }
}

impl PredictionClient {
    /// Create a client from the application configuration.
    pub fn new(config: &SentinelConfig) -> Self {
        Self::build(
            &config.prediction_url,
            config.prediction_timeout,
            config.failure_policy,
        )
    }

    /// Create a client with a custom base URL and default settings (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        Self::build(
            base_url,
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
            FailurePolicy::Surfaced,
        )
    }

    /// Replace the request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self::build(&self.base_url, timeout, self.policy)
    }

    /// Replace the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn build(base_url: &str, timeout: Duration, policy: FailurePolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                // Only fails if the TLS backend cannot initialise; keep a working
                // client, and the timeout is still enforced per request below.
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            policy,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// URL of the forecast endpoint for a hospital.
    pub fn predict_url(&self, hospital_id: &str) -> String {
        format!(
            "{}/hospitals/{}/predict",
            self.base_url,
            urlencoding::encode(hospital_id)
        )
    }

    /// Fetch the forecast for a hospital, applying the configured failure policy.
    ///
    /// Under [`FailurePolicy::SilentFallback`] every failure is replaced by
    /// [`PredictionResponse::offline`] and this never returns `Err`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = PredictionClient::new(&config);
    /// let prediction = client.fetch_prediction("h2").await?;
    /// println!("peak load: {:?}", prediction.peak_load());
    /// ```
    pub async fn fetch_prediction(
        &self,
        hospital_id: &str,
    ) -> Result<PredictionResponse, PredictionError> {
        match self.request_prediction(hospital_id).await {
            Ok(response) => Ok(response),
            Err(e) => match self.policy {
                FailurePolicy::Surfaced => {
                    warn!(hospital_id = %hospital_id, error = %e, "Prediction fetch failed");
                    Err(e)
                }
                FailurePolicy::SilentFallback => {
                    warn!(
                        hospital_id = %hospital_id,
                        error = %e,
                        "Prediction fetch failed, substituting offline payload"
                    );
                    Ok(PredictionResponse::offline())
                }
            },
        }
    }

    /// Fetch the forecast for a hospital, always surfacing failures.
    pub async fn request_prediction(
        &self,
        hospital_id: &str,
    ) -> Result<PredictionResponse, PredictionError> {
        if hospital_id.trim().is_empty() {
            return Err(PredictionError::EmptyHospitalId);
        }

        let url = self.predict_url(hospital_id);
        debug!(url = %url, "Requesting prediction");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictionError::Status {
                code: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        serde_json::from_slice::<PredictionResponse>(&bytes)
            .map_err(|e| PredictionError::Decode(e.to_string()))
    }

    /// Query the service's liveness endpoint.
    pub async fn health(&self) -> Result<ServiceHealth, PredictionError> {
        let url = format!("{}/api/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictionError::Status {
                code: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .json::<ServiceHealth>()
            .await
            .map_err(|e| PredictionError::Decode(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> PredictionError {
        if e.is_timeout() {
            PredictionError::Timeout(self.timeout.as_millis() as u64)
        } else {
            PredictionError::Network(e.to_string())
        }
    }
}

/// Response from the prediction service's health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Liveness, e.g. "online".
    #[serde(default)]
    pub status: String,

    /// Service name and version.
    #[serde(default)]
    pub system: String,

    /// Deployment mode reported by the service.
    #[serde(default)]
    pub mode: String,
}

impl ServiceHealth {
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("online")
    }
}
