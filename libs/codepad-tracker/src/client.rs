//! HTTP access to the Execution Service and the Problem Catalog Service

use async_trait::async_trait;
use codepad_common::api;
use codepad_common::config::ClientConfig;
use codepad_common::types::{
    ExecutePayload, ExecutionRequest, JobStatus, ProblemDetail, ProblemList, SubmissionResponse,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Longest slice of an unreadable body kept for diagnostics
const BODY_SNIPPET_CHARS: usize = 200;

/// Errors from talking to the services
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request could not be sent or no response came back
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response arrived but its body is not the JSON we expect
    #[error("Failed to parse JSON: {source}")]
    Protocol {
        source: serde_json::Error,
        body: String,
    },

    /// Base URL cannot carry the request path
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Setup(String),
}

impl ClientError {
    pub fn is_protocol(&self) -> bool {
        matches!(self, ClientError::Protocol { .. })
    }
}

/// The two calls the tracking controller makes
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// POST /execute
    async fn submit(&self, request: &ExecutionRequest) -> Result<SubmissionResponse, ClientError>;

    /// GET /execute/job/{job_id}
    async fn job_status(&self, job_id: &str) -> Result<JobStatus, ClientError>;
}

/// Read-only problem data
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn list_problems(&self) -> Result<ProblemList, ClientError>;

    async fn get_problem(&self, problem_id: i64) -> Result<ProblemDetail, ClientError>;
}

/// reqwest-backed client for both services
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    language: String,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            language: config.language.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        api::join_url(&self.base_url, path)
    }

    /// Status URL with the job id percent-encoded as a single path segment
    fn job_status_url(&self, job_id: &str) -> Result<Url, ClientError> {
        let raw = self.url(api::JOB_STATUS_PREFIX);
        let mut url =
            Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(raw.clone()))?
            .pop_if_empty()
            .push(job_id);
        Ok(url)
    }

    /// Read the body and decode it regardless of status code.
    /// The Execution Service reports application errors as JSON with a non-2xx status.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = %status, "Non-success status, decoding body anyway");
        }
        parse_body(status, &body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }
}

fn parse_body<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|source| {
        let body: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
        warn!(status = %status, error = %source, body = %body, "Unreadable response body");
        ClientError::Protocol { source, body }
    })
}

/// JSON error envelope the service sends instead of a status object
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// The service's own error message, when `body` is an error envelope
fn application_error(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error)
}

#[async_trait]
impl ExecutionClient for HttpClient {
    async fn submit(&self, request: &ExecutionRequest) -> Result<SubmissionResponse, ClientError> {
        let payload = ExecutePayload::from_request(request, &self.language);
        let response = self
            .client
            .post(self.url(api::EXECUTE_PATH))
            .json(&payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus, ClientError> {
        let response = self.client.get(self.job_status_url(job_id)?).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<JobStatus>(&body) {
            Ok(job) => Ok(job),
            Err(_) => match application_error(&body) {
                Some(error) => {
                    warn!(job_id = %job_id, status = %status, error = %error, "Status request rejected");
                    Ok(JobStatus::failed(job_id, error))
                }
                None => parse_body(status, &body),
            },
        }
    }
}

#[async_trait]
impl CatalogClient for HttpClient {
    async fn list_problems(&self) -> Result<ProblemList, ClientError> {
        self.get(api::PROBLEMS_PATH).await
    }

    async fn get_problem(&self, problem_id: i64) -> Result<ProblemDetail, ClientError> {
        self.get(&api::problem_path(problem_id)).await
    }
}
