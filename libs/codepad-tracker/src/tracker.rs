//! Job Tracker
//!
//! Sole owner of the `TrackedJob` record. Every write goes through one of
//! the operations below, and every write coming from a poller is gated on the
//! job id still being the current one. A late answer for a superseded job can
//! therefore never overwrite the state of a newer submission.

use crate::client::ExecutionClient;
use crate::poller::{PollEvent, PollHandle, Poller};
use codepad_common::types::JobStatus;
use tracing::{debug, info, warn};

/// Tracking state for the current job
///
/// `polling_active` is only true while `job_id` is set and `latest_status`
/// is absent or non-terminal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedJob {
    job_id: Option<String>,
    latest_status: Option<JobStatus>,
    polling_active: bool,
    poll_error: Option<String>,
}

impl TrackedJob {
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn latest_status(&self) -> Option<&JobStatus> {
        self.latest_status.as_ref()
    }

    pub fn polling_active(&self) -> bool {
        self.polling_active
    }

    pub fn poll_error(&self) -> Option<&str> {
        self.poll_error.as_deref()
    }
}

/// Issued by `start_submission`; an acknowledgment is only honoured with the
/// ticket of the latest reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

/// Outcome of the identity guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    Stale,
}

impl Applied {
    pub fn is_accepted(self) -> bool {
        self == Applied::Accepted
    }
}

pub struct JobTracker<C> {
    job: TrackedJob,
    generation: u64,
    poller: Poller<C>,
    handle: Option<PollHandle>,
}

impl<C> JobTracker<C>
where
    C: ExecutionClient + 'static,
{
    pub fn new(poller: Poller<C>) -> Self {
        Self {
            job: TrackedJob::default(),
            generation: 0,
            poller,
            handle: None,
        }
    }

    pub fn tracked(&self) -> &TrackedJob {
        &self.job
    }

    pub fn is_polling(&self) -> bool {
        self.job.polling_active
    }

    /// Reset for a new submission. Must run before that submission's
    /// response is looked at.
    pub fn start_submission(&mut self) -> SubmissionTicket {
        if let Some(job_id) = self.job.job_id.as_deref() {
            debug!(job_id = %job_id, "Job superseded by new submission");
        }
        self.stop_poller();
        self.job = TrackedJob::default();
        self.generation += 1;
        SubmissionTicket(self.generation)
    }

    /// Record the job id the Execution Service handed back and start polling it.
    /// Returns false when the ticket is stale or the submission already has a job.
    pub fn on_acknowledged(&mut self, ticket: SubmissionTicket, job_id: &str) -> bool {
        if ticket.0 != self.generation {
            debug!(job_id = %job_id, "Ignoring acknowledgment from an older submission");
            return false;
        }
        if let Some(current) = self.job.job_id.as_deref() {
            warn!(job_id = %job_id, current = %current, "Submission already acknowledged");
            return false;
        }

        info!(job_id = %job_id, "Job acknowledged");
        self.job.job_id = Some(job_id.to_string());
        self.job.polling_active = true;
        self.handle = Some(self.poller.start(job_id));
        true
    }

    pub fn on_poll_result(&mut self, job_id: &str, status: JobStatus) -> Applied {
        if !self.accepts(job_id) {
            debug!(job_id = %job_id, status = %status.status, "Discarding stale job status");
            return Applied::Stale;
        }

        let terminal = status.is_terminal();
        self.job.latest_status = Some(status);
        if terminal {
            self.job.polling_active = false;
            self.stop_poller();
        }
        Applied::Accepted
    }

    /// Network failure ends tracking for this job; there is no retry
    pub fn on_poll_failure(&mut self, job_id: &str, message: impl Into<String>) -> Applied {
        if !self.accepts(job_id) {
            debug!(job_id = %job_id, "Discarding stale poll failure");
            return Applied::Stale;
        }

        self.job.poll_error = Some(message.into());
        self.job.polling_active = false;
        self.stop_poller();
        Applied::Accepted
    }

    pub fn apply(&mut self, event: PollEvent) -> Applied {
        match event {
            PollEvent::Status { job_id, status } => self.on_poll_result(&job_id, status),
            PollEvent::Failure { job_id, message } => self.on_poll_failure(&job_id, message),
        }
    }

    /// The owning session is going away
    pub fn teardown(&mut self) {
        self.stop_poller();
        self.job = TrackedJob::default();
        self.generation += 1;
    }

    // Writes are only taken for the current job while it is still being polled
    fn accepts(&self, job_id: &str) -> bool {
        self.job.polling_active && self.job.job_id.as_deref() == Some(job_id)
    }

    fn stop_poller(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}
