//! Pure REST client for the Wavelet Agent API.
//!
//! A clean, minimal client with no domain logic: it speaks the agent's
//! analyze/generate wire protocol and reports typed errors. Policy (what a
//! failed call means for a question) belongs to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use wavelet_client::{AnalyzeRequest, WaveletClient};
//!
//! let client = WaveletClient::from_env()?;
//! let verdict = client
//!     .analyze_question(&AnalyzeRequest::new("How do I promote my novel?", ""))
//!     .await?;
//! println!("in scope: {}", verdict.is_in_scope);
//! ```

pub mod error;
pub mod types;

pub use error::{Result, WaveletError};
pub use types::{
    AnalyzeRequest, AnalyzeResponse, GenerateRequest, GenerateResponse, MarketContext,
};

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, warn};

use types::WorkflowResponse;

/// Default timeout for agent calls. Scoring and generation are slow LLM
/// round-trips; anything past this is treated as a transport failure.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Wavelet Agent API.
pub struct WaveletClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl WaveletClient {
    /// Create a new client against the given base URL.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            base_url,
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// Create from `WAVELET_AGENT_URL` and `WAVELET_AGENT_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("WAVELET_AGENT_URL")
            .map_err(|_| WaveletError::Config("WAVELET_AGENT_URL not set".into()))?;
        let api_key = std::env::var("WAVELET_AGENT_API_KEY")
            .map_err(|_| WaveletError::Config("WAVELET_AGENT_API_KEY not set".into()))?;
        Ok(Self::new(base_url, api_key))
    }

    /// Use a custom request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the agent whether a question is answerable and how confident it is.
    pub async fn analyze_question(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        debug!(title = %request.title, "sending analyze request");
        let response = self
            .client
            .post(format!("{}/api/analyze", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Ask the agent to draft a reply for a question.
    pub async fn generate_response(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        debug!(workflow = ?request.workflow_id, "sending generate request");
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Resolve the public link for a workflow, if the agent knows one.
    pub async fn workflow_link(&self, workflow_id: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/api/workflows/{}", self.base_url, workflow_id))
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let body: WorkflowResponse = response.json().await?;
        Ok(body.public_url)
    }

    /// Whether the agent service is reachable and healthy.
    ///
    /// Never errors: an unreachable service is simply unhealthy.
    pub async fn health_check(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "Wavelet Agent health check failed");
                false
            }
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Wavelet Agent call failed");
        Err(WaveletError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl Clone for WaveletClient {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: SecretString::from(self.api_key.expose_secret().to_string()),
        }
    }
}

impl std::fmt::Debug for WaveletClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveletClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = WaveletClient::new("https://agent.wavelet.ai/", "key");
        assert_eq!(client.base_url(), "https://agent.wavelet.ai");
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = WaveletClient::new("https://agent.wavelet.ai", "wv-secret-key");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("wv-secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
