// Scripted ExecutionClient for unit tests

use crate::client::{ClientError, ExecutionClient};
use async_trait::async_trait;
use codepad_common::types::{
    ExecutionRequest, JobPhase, JobStatus, SubmissionResponse, TestResult,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted answer to one status request
#[derive(Debug, Clone)]
pub enum Step {
    Status(JobStatus),
    /// Answer only after `Duration` has passed, like a slow request in flight
    Delayed(Duration, JobStatus),
    TransportFailure,
    Malformed,
}

/// Scripted answer to one submission
#[derive(Debug, Clone)]
pub enum SubmitStep {
    Response(SubmissionResponse),
    TransportFailure,
    Malformed,
}

/// Replays scripted answers and counts calls.
/// A job whose script has run out keeps answering `pending`.
#[derive(Default)]
pub struct ScriptedClient {
    submissions: Mutex<VecDeque<SubmitStep>>,
    statuses: Mutex<HashMap<String, VecDeque<Step>>>,
    status_calls: Mutex<HashMap<String, usize>>,
    submitted: Mutex<Vec<ExecutionRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_submission(&self, step: SubmitStep) {
        self.submissions.lock().unwrap().push_back(step);
    }

    pub fn script_status(&self, job_id: &str, steps: Vec<Step>) {
        self.statuses
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .extend(steps);
    }

    pub fn status_calls(&self, job_id: &str) -> usize {
        self.status_calls
            .lock()
            .unwrap()
            .get(job_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn submitted(&self) -> Vec<ExecutionRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

async fn transport_error() -> ClientError {
    match reqwest::Client::new().get("not a url").send().await {
        Err(err) => ClientError::Transport(err),
        Ok(_) => unreachable!("request to an invalid URL succeeded"),
    }
}

fn protocol_error() -> ClientError {
    let body = "<html>502 Bad Gateway</html>";
    let source = serde_json::from_str::<serde_json::Value>(body).unwrap_err();
    ClientError::Protocol {
        source,
        body: body.to_string(),
    }
}

#[async_trait]
impl ExecutionClient for ScriptedClient {
    async fn submit(&self, request: &ExecutionRequest) -> Result<SubmissionResponse, ClientError> {
        self.submitted.lock().unwrap().push(request.clone());
        let step = self.submissions.lock().unwrap().pop_front();
        match step {
            Some(SubmitStep::Response(response)) => Ok(response),
            Some(SubmitStep::TransportFailure) => Err(transport_error().await),
            Some(SubmitStep::Malformed) => Err(protocol_error()),
            None => panic!("no scripted submission left"),
        }
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatus, ClientError> {
        *self
            .status_calls
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default() += 1;

        let step = self
            .statuses
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(|steps| steps.pop_front());

        match step {
            Some(Step::Status(status)) => Ok(status),
            Some(Step::Delayed(delay, status)) => {
                tokio::time::sleep(delay).await;
                Ok(status)
            }
            Some(Step::TransportFailure) => Err(transport_error().await),
            Some(Step::Malformed) => Err(protocol_error()),
            None => Ok(pending(job_id)),
        }
    }
}

pub fn status(job_id: &str, phase: JobPhase) -> JobStatus {
    JobStatus {
        job_id: job_id.to_string(),
        status: phase,
        success: false,
        test_results: None,
        error: None,
    }
}

pub fn pending(job_id: &str) -> JobStatus {
    status(job_id, JobPhase::Pending)
}

pub fn processing(job_id: &str) -> JobStatus {
    status(job_id, JobPhase::Processing)
}

pub fn completed(job_id: &str, results: Vec<TestResult>) -> JobStatus {
    JobStatus {
        success: true,
        test_results: Some(results),
        ..status(job_id, JobPhase::Completed)
    }
}

pub fn test_result(id: i64, actual: &str, passed: bool) -> TestResult {
    TestResult {
        test_case_id: id,
        input: None,
        expected_output: None,
        actual_output: actual.to_string(),
        error: None,
        passed,
    }
}

pub fn ack(job_id: &str) -> SubmissionResponse {
    SubmissionResponse {
        success: true,
        job_id: Some(job_id.to_string()),
        ..Default::default()
    }
}
