/// View Mapper
///
/// Pure function from `CanonicalState` to the six things a front end can draw.

use crate::reconciler::CanonicalState;
use codepad_common::types::{JobPhase, TestResult};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    ErrorBanner {
        message: String,
    },
    PendingBanner {
        phase: JobPhase,
        message: Option<String>,
    },
    SubmittedBanner {
        job_id: String,
        message: Option<String>,
    },
    ResultList {
        results: Vec<TestResult>,
        passed: usize,
        total: usize,
    },
    NoResults,
    Nothing,
}

impl View {
    pub fn is_error(&self) -> bool {
        matches!(self, View::ErrorBanner { .. })
    }

    /// True while the outcome is still on its way
    pub fn is_waiting(&self) -> bool {
        matches!(self, View::PendingBanner { .. } | View::SubmittedBanner { .. })
    }

    /// `Some(true)` only for a result list where every test passed
    pub fn all_passed(&self) -> Option<bool> {
        match self {
            View::ResultList { passed, total, .. } => Some(passed == total),
            _ => None,
        }
    }
}

pub fn map(state: &CanonicalState) -> View {
    match state {
        CanonicalState::Idle => View::Nothing,
        CanonicalState::Empty => View::NoResults,
        CanonicalState::ImmediateError(message) => View::ErrorBanner {
            message: message.clone(),
        },
        CanonicalState::PollError(message) => View::ErrorBanner {
            message: format!("Failed to check job status: {}", message),
        },
        CanonicalState::JobPending { phase, message } => View::PendingBanner {
            phase: *phase,
            message: message.clone(),
        },
        CanonicalState::JobAcknowledged { job_id, message } => View::SubmittedBanner {
            job_id: job_id.clone(),
            message: message.clone(),
        },
        CanonicalState::Results(results) => View::ResultList {
            passed: results.iter().filter(|r| r.passed).count(),
            total: results.len(),
            results: results.clone(),
        },
    }
}
