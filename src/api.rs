use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::HubError;
use crate::generate::GenerationRequest;
use crate::registry::Provider;

/// Cap on response bodies read into memory.
pub const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024; // 2MB

/// Client for the three backend REST endpoints. Wire shapes are fixed for
/// compatibility with the existing backend; do not rename fields.
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
    provider: &'a str,
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    content: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Serialize)]
struct ConnectionTestBody<'a> {
    provider: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ConnectionTestResponse {
    pub success: bool,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackBody<'a> {
    pub rating: u8,
    pub comments: &'a str,
    pub learning_rate: f64,
    pub session_id: &'a str,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /api/models/generate. The credential travels out-of-band in the
    /// X-API-Key header; everything else is in the JSON body.
    pub async fn generate(
        &self,
        req: &GenerationRequest,
        api_key: &str,
    ) -> Result<String, HubError> {
        let body = GenerateBody {
            prompt: &req.prompt,
            provider: req.provider.as_str(),
            model: &req.model,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/api/models/generate", self.base_url))
            .header("X-API-Key", api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let provider = req.provider.as_str();

        if !status.is_success() {
            // Error responses carry `{"detail": "..."}`. Fall back to the
            // bare status line when the body isn't that shape.
            let bytes = response.bytes().await.unwrap_or_default();
            let truncated = &bytes[..bytes.len().min(MAX_RESPONSE_BYTES)];
            let detail = serde_json::from_slice::<ErrorBody>(truncated)
                .ok()
                .and_then(|e| e.detail)
                .unwrap_or_else(|| format!("{status}"));
            return Err(HubError::Upstream {
                provider: provider.to_string(),
                message: detail,
                status: Some(status.as_u16()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| HubError::Upstream {
            provider: provider.to_string(),
            message: format!("failed to read response body: {e}"),
            status: None,
        })?;

        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(HubError::Upstream {
                provider: provider.to_string(),
                message: format!(
                    "response too large: {} bytes (max {MAX_RESPONSE_BYTES})",
                    bytes.len()
                ),
                status: None,
            });
        }

        let parsed: GenerateResponse = serde_json::from_slice(&bytes)
            .map_err(|e| HubError::SchemaParse(format!("failed to parse response: {e}")))?;

        Ok(parsed.content)
    }

    /// POST /api/models/test-connection. A `{"success": false}` body is a
    /// normal outcome, not an error.
    pub async fn test_connection(
        &self,
        provider: Provider,
        api_key: &str,
    ) -> Result<ConnectionTestResponse, HubError> {
        let body = ConnectionTestBody {
            provider: provider.as_str(),
            api_key,
        };

        let response = self
            .client
            .post(format!("{}/api/models/test-connection", self.base_url))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Upstream {
                provider: provider.as_str().to_string(),
                message: format!("{status}"),
                status: Some(status.as_u16()),
            });
        }

        response
            .json::<ConnectionTestResponse>()
            .await
            .map_err(|e| HubError::SchemaParse(format!("failed to parse response: {e}")))
    }

    /// POST /api/feedback. The backend's success payload shape is arbitrary;
    /// it is returned as raw JSON for the aggregator to fold in.
    pub async fn submit_feedback(
        &self,
        body: &FeedbackBody<'_>,
    ) -> Result<serde_json::Value, HubError> {
        let response = self
            .client
            .post(format!("{}/api/feedback", self.base_url))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Upstream {
                provider: "feedback".to_string(),
                message: format!("{status}"),
                status: Some(status.as_u16()),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| HubError::SchemaParse(format!("failed to parse response: {e}")))
    }
}
