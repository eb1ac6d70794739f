use serde::{Deserialize, Serialize};
use std::fmt;

/// Problem as served by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Test case attached to a problem
/// Hidden cases are never shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    pub problem_id: i64,
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// GET /problems
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemList {
    #[serde(default)]
    pub problems: Vec<Problem>,
}

/// GET /problems/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetail {
    pub problem: Problem,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// A user's code submission for one problem
/// Immutable once built; dropped after the request completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub code: String,
    pub problem_id: i64,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, problem_id: i64) -> Self {
        Self {
            code: code.into(),
            problem_id,
        }
    }
}

/// Body of POST /execute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutePayload {
    pub language: String,
    pub code: String,
    pub problem_id: i64,
}

impl ExecutePayload {
    pub fn from_request(request: &ExecutionRequest, language: &str) -> Self {
        Self {
            language: language.to_string(),
            code: request.code.clone(),
            problem_id: request.problem_id,
        }
    }
}

/// Per-test outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_case_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub actual_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub passed: bool,
}

/// Response to POST /execute
///
/// The same shape covers three outcomes: an immediate failure (`error`),
/// inline results (`test_results`), or an acknowledgment carrying a `job_id`
/// that must be polled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<Vec<TestResult>>,
}

impl SubmissionResponse {
    /// Synthetic failure used when the Execution Service could not be reached
    /// or answered with something that is not JSON
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Job lifecycle as reported by GET /execute/job/{job_id}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobPhase {
    /// Only completed and failed end a job
    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Failed)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPhase::Pending => write!(f, "pending"),
            JobPhase::Processing => write!(f, "processing"),
            JobPhase::Completed => write!(f, "completed"),
            JobPhase::Failed => write!(f, "failed"),
        }
    }
}

/// One observation of a job from the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: String,
    pub status: JobPhase,
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<Vec<TestResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Synthetic terminal status standing in for an unreadable status body
    pub fn failed(job_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobPhase::Failed,
            success: false,
            test_results: None,
            error: Some(error.into()),
        }
    }
}
