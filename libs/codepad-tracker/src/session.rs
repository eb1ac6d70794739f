/// Submission Session
///
/// One tracking controller per user-facing session. Owns the job tracker,
/// the receiving end of the poll event channel and the latest submission
/// response. All state changes happen on `&mut self`, so the tracker needs no
/// locks: pollers only ever send events, and the session applies them.

use crate::classifier::{classify, Classified};
use crate::client::ExecutionClient;
use crate::poller::{PollEvent, Poller};
use crate::reconciler::{reconcile, CanonicalState};
use crate::tracker::JobTracker;
use crate::view::{self, View};
use codepad_common::config::ClientConfig;
use codepad_common::types::{ExecutionRequest, SubmissionResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct Session<C> {
    client: Arc<C>,
    tracker: JobTracker<C>,
    events: mpsc::UnboundedReceiver<PollEvent>,
    last_response: Option<SubmissionResponse>,
}

impl<C> Session<C>
where
    C: ExecutionClient + 'static,
{
    pub fn new(client: Arc<C>, config: &ClientConfig) -> Self {
        Self::with_polling(client, config.poll_interval(), config.max_polls)
    }

    pub fn with_polling(client: Arc<C>, interval: Duration, max_polls: u32) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = Poller::new(Arc::clone(&client), interval, max_polls, tx);

        Self {
            client,
            tracker: JobTracker::new(poller),
            events: rx,
            last_response: None,
        }
    }

    /// Submit code and return the first view of the outcome.
    ///
    /// Any job from an earlier submission is superseded before the request
    /// goes out. Transport and protocol failures come back as an error view.
    pub async fn submit(&mut self, request: ExecutionRequest) -> View {
        let ticket = self.tracker.start_submission();
        self.last_response = None;

        info!(
            problem_id = request.problem_id,
            code_bytes = request.code.len(),
            "Submitting code"
        );

        let response = match self.client.submit(&request).await {
            Ok(response) => response,
            Err(err) if err.is_protocol() => {
                warn!(problem_id = request.problem_id, error = %err, "Submission response was not JSON");
                SubmissionResponse::failure(err.to_string())
            }
            Err(err) => {
                warn!(problem_id = request.problem_id, error = %err, "Submission request failed");
                SubmissionResponse::failure(format!("An error occurred: {}", err))
            }
        };

        match classify(&response) {
            Classified::JobAcknowledged { job_id, .. } => {
                self.tracker.on_acknowledged(ticket, &job_id);
            }
            Classified::ImmediateError(error) => {
                info!(problem_id = request.problem_id, error = %error, "Submission rejected");
            }
            Classified::ImmediateResults(results) => {
                info!(
                    problem_id = request.problem_id,
                    results = results.len(),
                    "Results returned inline"
                );
            }
        }

        self.last_response = Some(response);
        self.view()
    }

    /// Wait for the next accepted poll observation and return the view it
    /// produces. Stale observations are dropped silently. Returns `None` once
    /// nothing is being polled.
    pub async fn next_update(&mut self) -> Option<View> {
        while self.tracker.is_polling() {
            let event = self.events.recv().await?;
            if self.tracker.apply(event).is_accepted() {
                return Some(self.view());
            }
        }
        None
    }

    /// Follow the current job to its end and return the final view
    pub async fn wait_for_outcome(&mut self) -> View {
        while self.next_update().await.is_some() {}
        self.view()
    }

    pub fn is_polling(&self) -> bool {
        self.tracker.is_polling()
    }

    pub fn state(&self) -> CanonicalState {
        reconcile(self.tracker.tracked(), self.last_response.as_ref())
    }

    pub fn view(&self) -> View {
        view::map(&self.state())
    }

    /// Stop polling and forget everything; safe to call more than once
    pub fn teardown(&mut self) {
        self.tracker.teardown();
        self.last_response = None;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
