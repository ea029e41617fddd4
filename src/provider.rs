//! Analysis provider clients.
//!
//! Each external analysis service (symptom prediction, image classification)
//! is reached through one [`HttpProvider`]. Every call is normalized into an
//! [`AnalysisOutcome`]: no transport error crosses this boundary, so the
//! orchestration layer never handles provider-specific failures. Calls carry
//! a hard deadline (`tokio::time::timeout` on top of reqwest's per-request
//! timeout) and are never retried — provider endpoints are not known to be
//! idempotent from here.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Why a provider call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Connection refused / host unreachable.
    Unavailable,
    /// The hard deadline elapsed before a response arrived.
    Timeout,
    /// The provider rejected the payload (4xx).
    InvalidInput,
    /// Any other unexpected provider response.
    UpstreamError,
}

/// Normalized result of one provider call or local computation.
///
/// Success payloads are opaque at this layer: provider-internal fields are
/// relayed, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Success {
        payload: Value,
    },
    Failure {
        reason: FailureReason,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl AnalysisOutcome {
    pub fn success(payload: Value) -> Self {
        Self::Success { payload }
    }

    pub fn failure(reason: FailureReason, message: impl Into<String>) -> Self {
        Self::Failure { reason, message: Some(message.into()) }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(*reason),
        }
    }
}

/// Request/response boundary of one analysis provider.
///
/// `HttpProvider` is the production implementation; tests substitute mocks
/// (see [`MockProvider`]).
pub trait ProviderTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Submit a symptom list for prediction.
    fn predict_symptoms(&self, symptoms: &[String])
        -> impl Future<Output = AnalysisOutcome> + Send;

    /// Submit a staged image for classification.
    fn predict_image(&self, image: &Path) -> impl Future<Output = AnalysisOutcome> + Send;

    /// Probe the provider's health endpoint. The caller owns the deadline.
    fn probe_health(&self) -> impl Future<Output = Result<(), String>> + Send;
}

/// Request body for `POST {base}/predict` on the symptom provider.
#[derive(Serialize)]
struct PredictRequest<'a> {
    symptoms: &'a [String],
}

/// HTTP client for one analysis provider.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    name: String,
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpProvider {
    pub fn new(name: &str, base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5).min(timeout))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> AnalysisOutcome {
        if e.is_connect() {
            AnalysisOutcome::failure(
                FailureReason::Unavailable,
                format!("{} is unreachable at {}", self.name, self.base_url),
            )
        } else if e.is_timeout() {
            AnalysisOutcome::failure(
                FailureReason::Timeout,
                format!("no response within {}ms", self.timeout.as_millis()),
            )
        } else {
            AnalysisOutcome::failure(FailureReason::UpstreamError, e.to_string())
        }
    }

    /// Pull a human-readable message out of an error response body.
    /// Providers return `{"error": "..."}` or `{"message": "..."}`; fall back
    /// to the raw body when it is neither.
    async fn extract_message(response: reqwest::Response) -> Option<String> {
        let body = response.text().await.ok()?;
        if let Ok(value) = serde_json::from_str::<Value>(&body) {
            for key in ["error", "message"] {
                if let Some(msg) = value.get(key).and_then(Value::as_str) {
                    return Some(msg.to_string());
                }
            }
        }
        if body.is_empty() { None } else { Some(body) }
    }

    /// Send one request under the hard deadline and normalize the result.
    async fn execute(&self, request: reqwest::RequestBuilder) -> AnalysisOutcome {
        let send = request.timeout(self.timeout).send();
        let response = match tokio::time::timeout(self.timeout, send).await {
            Err(_) => {
                tracing::warn!(provider = %self.name, "provider call hit hard deadline");
                return AnalysisOutcome::failure(
                    FailureReason::Timeout,
                    format!("no response within {}ms", self.timeout.as_millis()),
                );
            }
            Ok(Err(e)) => {
                tracing::warn!(provider = %self.name, error = %e, "provider call failed");
                return self.map_transport_error(e);
            }
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        if status.is_success() {
            match response.json::<Value>().await {
                Ok(payload) => AnalysisOutcome::success(payload),
                Err(e) => AnalysisOutcome::failure(
                    FailureReason::UpstreamError,
                    format!("malformed provider response: {e}"),
                ),
            }
        } else if status.is_client_error() {
            let message = Self::extract_message(response).await;
            AnalysisOutcome::Failure { reason: FailureReason::InvalidInput, message }
        } else {
            let message = Self::extract_message(response).await;
            tracing::warn!(
                provider = %self.name,
                status = status.as_u16(),
                "provider returned unexpected status"
            );
            AnalysisOutcome::Failure { reason: FailureReason::UpstreamError, message }
        }
    }
}

impl ProviderTransport for HttpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn predict_symptoms(&self, symptoms: &[String]) -> AnalysisOutcome {
        let body = PredictRequest { symptoms };
        self.execute(self.client.post(self.predict_url()).json(&body)).await
    }

    async fn predict_image(&self, image: &Path) -> AnalysisOutcome {
        let bytes = match tokio::fs::read(image).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return AnalysisOutcome::failure(
                    FailureReason::InvalidInput,
                    format!("cannot read staged upload: {e}"),
                );
            }
        };

        let file_name = image
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let mime = mime_guess::from_path(image).first_or_octet_stream();

        let part = match reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())
        {
            Ok(part) => part,
            Err(e) => {
                return AnalysisOutcome::failure(
                    FailureReason::InvalidInput,
                    format!("cannot build multipart body: {e}"),
                );
            }
        };
        let form = reqwest::multipart::Form::new().part("image", part);

        self.execute(self.client.post(self.predict_url()).multipart(form)).await
    }

    async fn probe_health(&self) -> Result<(), String> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(format!("health endpoint returned {}", response.status())),
            Err(e) if e.is_connect() => {
                Err(format!("{} is unreachable at {}", self.name, self.base_url))
            }
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Scripted provider for tests — fixed outcomes, optional latency, and call
/// counters for dispatch assertions.
pub struct MockProvider {
    name: String,
    symptom_outcome: AnalysisOutcome,
    image_outcome: AnalysisOutcome,
    health: Result<(), String>,
    latency: Option<Duration>,
    symptom_calls: std::sync::atomic::AtomicUsize,
    image_calls: std::sync::atomic::AtomicUsize,
}

impl MockProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            symptom_outcome: AnalysisOutcome::success(serde_json::json!({"mock": true})),
            image_outcome: AnalysisOutcome::success(serde_json::json!({"mock": true})),
            health: Ok(()),
            latency: None,
            symptom_calls: std::sync::atomic::AtomicUsize::new(0),
            image_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn with_symptom_outcome(mut self, outcome: AnalysisOutcome) -> Self {
        self.symptom_outcome = outcome;
        self
    }

    pub fn with_image_outcome(mut self, outcome: AnalysisOutcome) -> Self {
        self.image_outcome = outcome;
        self
    }

    pub fn with_health(mut self, health: Result<(), String>) -> Self {
        self.health = health;
        self
    }

    /// Delay every call and probe by this much.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn symptom_call_count(&self) -> usize {
        self.symptom_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn image_call_count(&self) -> usize {
        self.image_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl ProviderTransport for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn predict_symptoms(&self, _symptoms: &[String]) -> AnalysisOutcome {
        self.symptom_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.pause().await;
        self.symptom_outcome.clone()
    }

    async fn predict_image(&self, _image: &Path) -> AnalysisOutcome {
        self.image_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.pause().await;
        self.image_outcome.clone()
    }

    async fn probe_health(&self) -> Result<(), String> {
        self.pause().await;
        self.health.clone()
    }
}
