/// Job Poller
///
/// Drives GET /execute/job/{id} for one job at a time:
/// - first request goes out immediately, later ones after a fixed delay
/// - requests never overlap; the delay starts once the previous one resolves
/// - every observation is sent to the tracker as a `PollEvent`
/// - stops on terminal status, on the first failed request, on the poll
///   ceiling, or when its `PollHandle` is stopped or dropped
///
/// The poller never touches tracker state. A request already in flight when
/// the handle is stopped is allowed to finish; the tracker discards its result.

use crate::client::ExecutionClient;
use codepad_common::types::JobStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Observation reported by a running poller
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Status { job_id: String, status: JobStatus },
    Failure { job_id: String, message: String },
}

impl PollEvent {
    /// Job the poller was started for, not whatever id the body echoes back
    pub fn job_id(&self) -> &str {
        match self {
            PollEvent::Status { job_id, .. } | PollEvent::Failure { job_id, .. } => job_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Terminal,
    Cancelled,
    RequestFailed,
    Exhausted,
    TrackerGone,
}

/// Spawns polling tasks that all report into one event channel
pub struct Poller<C> {
    client: Arc<C>,
    interval: Duration,
    max_polls: u32,
    events: mpsc::UnboundedSender<PollEvent>,
}

impl<C> Poller<C>
where
    C: ExecutionClient + 'static,
{
    pub fn new(
        client: Arc<C>,
        interval: Duration,
        max_polls: u32,
        events: mpsc::UnboundedSender<PollEvent>,
    ) -> Self {
        Self {
            client,
            interval,
            max_polls: max_polls.max(1),
            events,
        }
    }

    /// Begin polling `job_id`. Polling lasts until the returned handle is
    /// stopped or dropped, or the loop ends on its own.
    pub fn start(&self, job_id: &str) -> PollHandle {
        let token = CancellationToken::new();

        info!(
            job_id = %job_id,
            interval_ms = self.interval.as_millis() as u64,
            max_polls = self.max_polls,
            "Polling started"
        );

        tokio::spawn(poll_loop(
            Arc::clone(&self.client),
            job_id.to_string(),
            self.interval,
            self.max_polls,
            token.clone(),
            self.events.clone(),
        ));

        PollHandle {
            job_id: job_id.to_string(),
            token,
        }
    }
}

/// Ownership of one running poll loop
/// Stopping is idempotent and also happens on drop
#[derive(Debug)]
pub struct PollHandle {
    job_id: String,
    token: CancellationToken,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            debug!(job_id = %self.job_id, "Stopping poller");
            self.token.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn poll_loop<C: ExecutionClient>(
    client: Arc<C>,
    job_id: String,
    interval: Duration,
    max_polls: u32,
    token: CancellationToken,
    events: mpsc::UnboundedSender<PollEvent>,
) {
    let mut polls: u32 = 0;

    let reason = loop {
        if token.is_cancelled() {
            break StopReason::Cancelled;
        }

        polls += 1;
        let outcome = client.job_status(&job_id).await;

        let (event, stop) = match outcome {
            Ok(status) => {
                debug!(job_id = %job_id, polls, status = %status.status, "Job status observed");
                let stop = status.is_terminal().then_some(StopReason::Terminal);
                (
                    PollEvent::Status {
                        job_id: job_id.clone(),
                        status,
                    },
                    stop,
                )
            }
            Err(err) if err.is_protocol() => {
                // Unreadable body ends the job as a failure carrying the diagnostic
                warn!(job_id = %job_id, polls, error = %err, "Status response was not JSON");
                (
                    PollEvent::Status {
                        job_id: job_id.clone(),
                        status: JobStatus::failed(job_id.clone(), err.to_string()),
                    },
                    Some(StopReason::RequestFailed),
                )
            }
            Err(err) => {
                warn!(job_id = %job_id, polls, error = %err, "Status request failed");
                (
                    PollEvent::Failure {
                        job_id: job_id.clone(),
                        message: err.to_string(),
                    },
                    Some(StopReason::RequestFailed),
                )
            }
        };

        if events.send(event).is_err() {
            break StopReason::TrackerGone;
        }
        if let Some(reason) = stop {
            break reason;
        }

        if polls >= max_polls {
            let message = format!(
                "Job {} did not finish after {} status checks",
                job_id, polls
            );
            warn!(job_id = %job_id, polls, "Giving up on job");
            let _ = events.send(PollEvent::Failure {
                job_id: job_id.clone(),
                message,
            });
            break StopReason::Exhausted;
        }

        tokio::select! {
            _ = token.cancelled() => break StopReason::Cancelled,
            _ = tokio::time::sleep(interval) => {}
        }
    };

    info!(job_id = %job_id, polls, reason = ?reason, "Polling stopped");
}
