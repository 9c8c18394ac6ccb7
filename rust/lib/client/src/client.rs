use std::sync::Arc;

use chrono::Utc;
use intake_form::{FormFields, Submission};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ApiError, FieldError};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

const SUBMISSIONS_PATH: &str = "/api/submissions";
const HEALTH_PATH: &str = "/api/health";

/// Shown when a failure carries no server message.
const GENERIC_FAILURE: &str = "Failed to submit form. Please try again.";

/// Pagination metadata of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current: usize,
    pub total: usize,
    pub has_more: bool,
    #[serde(default)]
    pub count: usize,
}

/// One page of submissions.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionPage {
    pub data: Vec<Submission>,
    pub pagination: PageInfo,
}

/// Health endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

/// Result of a form submit, ready to show to the user.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub success: bool,
    pub message: String,
    /// Stored record on success.
    pub data: Option<Submission>,
    /// Field-level rejections, from the server or the local check.
    pub errors: Vec<FieldError>,
    /// Requests sent. Zero when rejected before the network.
    pub attempts: u32,
}

impl SubmitOutcome {
    pub(crate) fn rejected(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
            attempts: 0,
        }
    }
}

/// Typed client for the submission endpoints.
pub struct SubmissionClient {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl SubmissionClient {
    /// Client over HTTP with the default retry policy.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(base_url)?)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Submit form values. Retries only transient network failures.
    ///
    /// Never returns an error: every outcome is folded into a
    /// [`SubmitOutcome`]. Clearing the draft is the caller's job.
    pub async fn submit_form(&self, fields: &FormFields) -> SubmitOutcome {
        let mut body = match serde_json::to_value(fields) {
            Ok(body) => body,
            Err(e) => return SubmitOutcome::rejected(format!("encode: {}", e), vec![]),
        };
        body["timestamp"] = serde_json::json!(Utc::now().to_rfc3339());

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        let result = loop {
            attempt += 1;
            let request = ApiRequest::post(SUBMISSIONS_PATH, body.clone());
            match self.transport.send(request).await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(attempt, max_attempts, "submit failed, retrying: {}", e);
                    self.sleeper.sleep(self.retry.delay).await;
                }
                other => break other,
            }
        };

        match result.and_then(envelope::<Submission>) {
            Ok((message, record)) => SubmitOutcome {
                success: true,
                message: message.unwrap_or_else(|| "Form submitted successfully".to_string()),
                data: Some(record),
                errors: vec![],
                attempts: attempt,
            },
            Err(e) => {
                tracing::warn!(attempts = attempt, "submit failed: {}", e);
                failure_outcome(e, attempt)
            }
        }
    }

    /// List submissions, newest first.
    pub async fn list(&self, page: usize, limit: usize) -> Result<SubmissionPage, ApiError> {
        let path = format!("{}?page={}&limit={}", SUBMISSIONS_PATH, page, limit);
        let resp = self.transport.send(ApiRequest::get(path)).await?;
        let resp = check(resp)?;
        serde_json::from_value(resp.body)
            .map_err(|e| ApiError::Decode(format!("list response: {}", e)))
    }

    /// Get one submission by id.
    pub async fn get(&self, id: &str) -> Result<Submission, ApiError> {
        let path = format!("{}/{}", SUBMISSIONS_PATH, id);
        let resp = self.transport.send(ApiRequest::get(path)).await?;
        envelope(resp).map(|(_, record)| record)
    }

    /// Delete one submission by id. Returns the server's confirmation.
    pub async fn delete(&self, id: &str) -> Result<String, ApiError> {
        let path = format!("{}/{}", SUBMISSIONS_PATH, id);
        let resp = self.transport.send(ApiRequest::delete(path)).await?;
        let resp = check(resp)?;
        Ok(resp.body["message"].as_str().unwrap_or("Deleted").to_string())
    }

    pub async fn health(&self) -> Result<Health, ApiError> {
        let resp = self.transport.send(ApiRequest::get(HEALTH_PATH)).await?;
        let resp = check(resp)?;
        serde_json::from_value(resp.body)
            .map_err(|e| ApiError::Decode(format!("health response: {}", e)))
    }
}

/// Map a non-success response to `ApiError::Server`.
fn check(resp: ApiResponse) -> Result<ApiResponse, ApiError> {
    if resp.is_success() {
        return Ok(resp);
    }
    let message = resp.body["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
    let code = resp.body["code"].as_str().map(str::to_string);
    let errors = serde_json::from_value(resp.body["errors"].clone()).unwrap_or_default();
    Err(ApiError::Server {
        status: resp.status,
        code,
        message,
        errors,
    })
}

/// Unwrap `{success, message?, data}` into its message and data.
fn envelope<T: DeserializeOwned>(resp: ApiResponse) -> Result<(Option<String>, T), ApiError> {
    let mut resp = check(resp)?;
    let message = resp.body["message"].as_str().map(str::to_string);
    let data = resp.body["data"].take();
    let data = serde_json::from_value(data)
        .map_err(|e| ApiError::Decode(format!("response data: {}", e)))?;
    Ok((message, data))
}

fn failure_outcome(e: ApiError, attempts: u32) -> SubmitOutcome {
    let (message, errors) = match e {
        ApiError::Server { message, errors, .. } => (message, errors),
        ApiError::Network(_) => (
            "Network error: could not reach the server. Please try again.".to_string(),
            vec![],
        ),
        ApiError::Timeout => ("The server took too long to respond.".to_string(), vec![]),
        ApiError::Request(detail) => (format!("Could not send the request: {}", detail), vec![]),
        ApiError::Decode(_) => (GENERIC_FAILURE.to_string(), vec![]),
    };
    SubmitOutcome {
        success: false,
        message,
        data: None,
        errors,
        attempts,
    }
}
