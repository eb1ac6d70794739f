/// Response Classifier
///
/// Turns the single wire shape of a submission response into a tagged value
/// once, so nothing downstream has to re-inspect optional fields.

use codepad_common::types::{SubmissionResponse, TestResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// The service rejected the submission outright
    ImmediateError(String),
    /// Results arrived inline; may be empty for a malformed-but-successful reply
    ImmediateResults(Vec<TestResult>),
    /// The service queued a job that must be polled
    JobAcknowledged {
        job_id: String,
        message: Option<String>,
    },
}

/// Rules apply in order: error, then inline results (or no job at all), then acknowledgment
pub fn classify(response: &SubmissionResponse) -> Classified {
    if let Some(error) = &response.error {
        return Classified::ImmediateError(error.clone());
    }

    let results = response.test_results.as_deref().unwrap_or_default();
    match &response.job_id {
        Some(job_id) if results.is_empty() => Classified::JobAcknowledged {
            job_id: job_id.clone(),
            message: response.message.clone(),
        },
        _ => Classified::ImmediateResults(results.to_vec()),
    }
}
