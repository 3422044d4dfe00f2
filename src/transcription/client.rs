use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::TranscriptionError;
use super::types::{StatusReport, SubmitResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";

/// Anything that can report the status of a transcription job.
///
/// The poller only needs this seam, so tests drive it with scripted checkers.
pub trait StatusChecker {
    fn check_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<StatusReport, TranscriptionError>> + Send;
}

/// Anything that can accept audio and hand back a job id.
pub trait JobSubmitter {
    fn submit_audio(
        &self,
        audio: Vec<u8>,
        file_name: &str,
    ) -> impl Future<Output = Result<String, TranscriptionError>> + Send;
}

/// HTTP client for the transcription provider's job endpoints.
pub struct TranscriptionClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl TranscriptionClient {
    #[allow(dead_code)]
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (configured endpoint or tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self {
            api_key,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }
}

impl JobSubmitter for TranscriptionClient {
    async fn submit_audio(
        &self,
        audio: Vec<u8>,
        file_name: &str,
    ) -> Result<String, TranscriptionError> {
        let url = format!("{}/jobs", self.base_url);
        debug!(%url, bytes = audio.len(), file_name, "submitting audio");

        let response = self
            .authorized(self.client.post(&url))
            .header("content-type", "application/octet-stream")
            .header("x-file-name", file_name)
            .body(audio)
            .send()
            .await?;

        let body: SubmitResponse = decode(response).await?;
        Ok(body.job_id)
    }
}

impl StatusChecker for TranscriptionClient {
    async fn check_status(&self, job_id: &str) -> Result<StatusReport, TranscriptionError> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);
        let response = self.authorized(self.client.get(&url)).send().await?;
        decode(response).await
    }
}

/// Map non-2xx responses to errors, then decode the JSON body.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TranscriptionError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000))
            .unwrap_or(1000);
        return Err(TranscriptionError::RateLimited {
            retry_after_ms: retry_after,
        });
    }

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(TranscriptionError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        let snippet: String = text.chars().take(200).collect();
        TranscriptionError::ParseError(format!("{e} - body: {snippet}"))
    })
}
