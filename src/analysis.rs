// SPDX-License-Identifier: GPL-3.0-only

//! Remote food analysis client
//!
//! Both endpoints resolve to an [`AnalysisResult`] rather than an `Err`:
//! every outcome, including transport failures, is classified into something
//! the session can show. The [`AnalysisClient`] trait is the seam the tests
//! swap a scripted client in through.

use crate::constants::api;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Why an operation failed, coarse enough to drive UI copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// Camera access was denied
    PermissionDenied,
    /// No usable capture device
    DeviceUnavailable,
    /// Capture attempted before a frame existed
    NoFrameAvailable,
    /// The request did not complete in time
    NetworkTimeout,
    /// The server answered, but with a failure
    ServerError,
    /// Transport failure that is neither a timeout nor a server answer
    Unknown,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureCategory::PermissionDenied => "permission denied",
            FailureCategory::DeviceUnavailable => "device unavailable",
            FailureCategory::NoFrameAvailable => "no frame available",
            FailureCategory::NetworkTimeout => "network timeout",
            FailureCategory::ServerError => "server error",
            FailureCategory::Unknown => "unknown error",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of a detect or advice call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult {
    Success { text: String },
    Failure { message: String, category: FailureCategory },
}

impl AnalysisResult {
    pub fn failure(message: impl Into<String>, category: FailureCategory) -> Self {
        AnalysisResult::Failure {
            message: message.into(),
            category,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success { .. })
    }
}

/// Seam for submitting work to the analysis server
pub trait AnalysisClient: Send + Sync {
    /// Submit a base64 JPEG (no data-URL prefix) for detection
    fn detect(&self, image_b64: String) -> BoxFuture<'static, AnalysisResult>;

    /// Fetch generic advice, no image involved
    fn advice(&self) -> BoxFuture<'static, AnalysisResult>;
}

#[derive(Serialize)]
struct DetectRequest {
    image: String,
}

#[derive(Deserialize, Default)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// reqwest-backed client for the real server
#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    base_url: String,
    detect_timeout: Duration,
    advice_timeout: Duration,
}

impl HttpAnalysisClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeouts(base_url, api::DETECT_TIMEOUT, api::ADVICE_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        detect_timeout: Duration,
        advice_timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            detect_timeout,
            advice_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl AnalysisClient for HttpAnalysisClient {
    fn detect(&self, image_b64: String) -> BoxFuture<'static, AnalysisResult> {
        let client = self.client.clone();
        let url = format!("{}{}", self.base_url, api::DETECT_PATH);
        let timeout = self.detect_timeout;
        async move {
            debug!(url = %url, payload_len = image_b64.len(), "Submitting image for detection");
            let result = client
                .post(&url)
                .timeout(timeout)
                .json(&DetectRequest { image: image_b64 })
                .send()
                .await;
            classify(result).await
        }
        .boxed()
    }

    fn advice(&self) -> BoxFuture<'static, AnalysisResult> {
        let client = self.client.clone();
        let url = format!("{}{}", self.base_url, api::ADVICE_PATH);
        let timeout = self.advice_timeout;
        async move {
            debug!(url = %url, "Requesting advice");
            let result = client.get(&url).timeout(timeout).send().await;
            classify(result).await
        }
        .boxed()
    }
}

/// Total classification of a transport outcome into an [`AnalysisResult`]
async fn classify(result: Result<reqwest::Response, reqwest::Error>) -> AnalysisResult {
    match result {
        Ok(response) => {
            let status = response.status();
            let body: ApiResponse = response.json().await.unwrap_or_default();

            if status.is_success() && body.success {
                AnalysisResult::Success {
                    text: body.output.unwrap_or_default(),
                }
            } else {
                let message = body.error.unwrap_or_else(|| {
                    if status.is_success() {
                        "Unknown error occurred".to_string()
                    } else {
                        format!("server returned {}", status)
                    }
                });
                warn!(status = %status, message = %message, "Server reported failure");
                AnalysisResult::failure(message, FailureCategory::ServerError)
            }
        }
        Err(e) if e.is_timeout() => {
            warn!("Analysis request timed out");
            AnalysisResult::failure("request timed out", FailureCategory::NetworkTimeout)
        }
        Err(e) => {
            warn!(error = %e, "Analysis request failed in transport");
            AnalysisResult::failure(e.to_string(), FailureCategory::Unknown)
        }
    }
}
