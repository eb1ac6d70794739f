//! Status Reconciler
//!
//! Folds the tracked job and the latest submission response into the single
//! state the view is drawn from. Priority, highest first:
//! poll error, terminal job status, job in progress, lone submission response, idle.

use crate::classifier::{classify, Classified};
use crate::tracker::TrackedJob;
use codepad_common::types::{JobPhase, JobStatus, SubmissionResponse, TestResult};

#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalState {
    Idle,
    ImmediateError(String),
    JobPending {
        phase: JobPhase,
        message: Option<String>,
    },
    JobAcknowledged {
        job_id: String,
        message: Option<String>,
    },
    Results(Vec<TestResult>),
    PollError(String),
    Empty,
}

pub fn reconcile(job: &TrackedJob, response: Option<&SubmissionResponse>) -> CanonicalState {
    if let Some(error) = job.poll_error() {
        return CanonicalState::PollError(error.to_string());
    }

    let message = response.and_then(|r| r.message.clone());

    if let Some(job_id) = job.job_id() {
        return match job.latest_status() {
            Some(status) if status.is_terminal() => terminal_state(status),
            Some(status) => CanonicalState::JobPending {
                phase: status.status,
                message,
            },
            None => CanonicalState::JobAcknowledged {
                job_id: job_id.to_string(),
                message,
            },
        };
    }

    match response {
        Some(response) => from_classified(classify(response)),
        None => CanonicalState::Idle,
    }
}

fn terminal_state(status: &JobStatus) -> CanonicalState {
    if let Some(error) = &status.error {
        return CanonicalState::ImmediateError(error.clone());
    }

    match status.test_results.as_deref() {
        Some(results) if !results.is_empty() => CanonicalState::Results(results.to_vec()),
        _ if status.status == JobPhase::Failed => {
            CanonicalState::ImmediateError("Job failed".to_string())
        }
        _ => CanonicalState::Empty,
    }
}

fn from_classified(classified: Classified) -> CanonicalState {
    match classified {
        Classified::ImmediateError(error) => CanonicalState::ImmediateError(error),
        Classified::ImmediateResults(results) if results.is_empty() => CanonicalState::Empty,
        Classified::ImmediateResults(results) => CanonicalState::Results(results),
        Classified::JobAcknowledged { job_id, message } => {
            CanonicalState::JobAcknowledged { job_id, message }
        }
    }
}
