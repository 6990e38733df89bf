use super::types::*;
use crate::{Error, Result, config::InferenceConfig};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration, time::Instant};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Longest slice of a response body kept in failure details.
const MAX_DETAIL_BODY_CHARS: usize = 512;

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Sends one payload and classifies the outcome. Never retries.
    async fn call(&self, payload: &InstructionPayload) -> InferenceResult;

    /// Same as [`InferenceClient::call`], but gives up as soon as `cancel`
    /// fires. Dropping the in-flight future aborts the HTTP exchange.
    async fn call_with_cancel(
        &self,
        payload: &InstructionPayload,
        cancel: &CancellationToken,
    ) -> InferenceResult {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => InferenceResult::failure(
                ErrorKind::Cancelled,
                "inference call cancelled before completion",
            ),
            result = self.call(payload) => result,
        }
    }
}

/// Client for an Ollama-compatible `/api/chat` endpoint.
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    limiter: Arc<Semaphore>,
}

impl OllamaClient {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        if config.max_concurrent_requests > Semaphore::MAX_PERMITS {
            return Err(Error::config(format!(
                "inference.max_concurrent_requests must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            timeout,
            limiter: Arc::new(Semaphore::new(config.max_concurrent_requests)),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn limited_send(&self, payload: &InstructionPayload) -> InferenceResult {
        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return InferenceResult::failure(
                    ErrorKind::NetworkError,
                    "inference limiter closed",
                );
            }
        };

        let request = ChatRequest::from(payload);
        debug!(
            "Sending chat request to {} with model {}",
            self.endpoint, request.model
        );
        self.send(&request).await
    }

    async fn send(&self, request: &ChatRequest) -> InferenceResult {
        let response = match self.http.post(&self.endpoint).json(request).send().await {
            Ok(response) => response,
            Err(e) => return InferenceResult::failure(classify(&e), e.to_string()),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return InferenceResult::failure(
                    classify(&e),
                    format!("failed to read response body (status {}): {}", status, e),
                );
            }
        };

        if !status.is_success() {
            return InferenceResult::failure(
                ErrorKind::ProtocolError,
                format!("status {}: {}", status, snippet(&body)),
            );
        }

        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(parsed) => InferenceResult::success(parsed.message.content.trim()),
            Err(e) => InferenceResult::failure(
                ErrorKind::ProtocolError,
                format!("malformed response ({}): {}", e, snippet(&body)),
            ),
        }
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    /// Waiting for a concurrency permit and the HTTP exchange share one
    /// deadline of `timeout_secs`.
    async fn call(&self, payload: &InstructionPayload) -> InferenceResult {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.limited_send(payload)).await {
            Ok(result) => result,
            Err(_) => InferenceResult::failure(
                ErrorKind::Timeout,
                format!("no response within {:?} (including queueing)", self.timeout),
            ),
        };

        debug!(
            "Inference call finished in {:?} (success: {})",
            started.elapsed(),
            result.is_success()
        );
        result
    }
}

fn classify(error: &reqwest::Error) -> ErrorKind {
    if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_decode() {
        ErrorKind::ProtocolError
    } else {
        ErrorKind::NetworkError
    }
}

fn snippet(body: &str) -> &str {
    match body.char_indices().nth(MAX_DETAIL_BODY_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
