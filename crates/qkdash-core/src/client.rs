//! HTTP client for the lab backend.
//!
//! All three endpoints speak the same envelope: a JSON body whose `status`
//! field is `"success"` or `"error"`, with `message`/`error` carrying the
//! failure text (the backend returns error envelopes on non-2xx statuses
//! too). The [`Backend`] trait exists so the orchestrator can be exercised
//! against a scripted backend in tests.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::result::{SimulationResult, TestbedResult};

/// Errors from backend operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network failure or unusable response body.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a failure envelope.
    #[error("{0}")]
    Backend(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Wire request for `POST /api/run_simulation`.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRequest {
    #[serde(flatten)]
    pub config: SimulationConfig,
}

impl SimulationRequest {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

/// Wire request for `POST /api/run_testbed`.
#[derive(Debug, Clone, Serialize)]
pub struct TestbedRequest {
    pub photon_rate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Response of `POST /api/connect_mobile`.
#[derive(Debug, Clone, Deserialize)]
pub struct PairingInfo {
    pub session_token: String,
    /// URL to encode as a QR code on the pairing screen.
    pub qr_data: String,
    #[serde(default)]
    pub local_ip: Option<String>,
    /// Seconds until the pairing session expires (enforced server-side).
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// The lab backend as the orchestrator sees it.
pub trait Backend {
    fn run_simulation(
        &self,
        request: &SimulationRequest,
    ) -> impl Future<Output = Result<SimulationResult, ClientError>>;

    fn run_testbed(
        &self,
        request: &TestbedRequest,
    ) -> impl Future<Output = Result<TestbedResult, ClientError>>;

    fn connect_mobile(&self) -> impl Future<Output = Result<PairingInfo, ClientError>>;
}

/// reqwest-backed [`Backend`] implementation.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Client against a backend base URL, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("POST {url}");
        let response = self.http.post(&url).json(body).send().await?;
        let value: serde_json::Value = response.json().await?;
        parse_envelope(value)
    }
}

impl Backend for HttpBackend {
    async fn run_simulation(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, ClientError> {
        self.post_json("/api/run_simulation", request).await
    }

    async fn run_testbed(&self, request: &TestbedRequest) -> Result<TestbedResult, ClientError> {
        self.post_json("/api/run_testbed", request).await
    }

    async fn connect_mobile(&self) -> Result<PairingInfo, ClientError> {
        self.post_json("/api/connect_mobile", &serde_json::json!({}))
            .await
    }
}

/// Split a response envelope into payload or failure message.
fn parse_envelope<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ClientError> {
    let status = value.get("status").and_then(|s| s.as_str()).unwrap_or("");
    if status == "success" {
        return serde_json::from_value(value)
            .map_err(|e| ClientError::Transport(format!("malformed success response: {e}")));
    }
    let message = value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .unwrap_or("backend reported an unspecified failure");
    Err(ClientError::Backend(message.to_string()))
}
