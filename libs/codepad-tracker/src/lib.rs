//! Submission tracking for the codepad client.
//!
//! A submission either answers inline or hands back a job id that has to be
//! polled. [`Session`] drives that flow: it classifies the response, tracks at
//! most one job, polls it on a fixed interval, drops late answers for jobs
//! that were superseded, and reduces everything to a [`View`].

pub mod classifier;
pub mod client;
pub mod poller;
pub mod reconciler;
pub mod session;
pub mod tracker;
pub mod view;

#[cfg(test)]
mod testing;

pub use classifier::{classify, Classified};
pub use client::{CatalogClient, ClientError, ExecutionClient, HttpClient};
pub use poller::{PollEvent, PollHandle, Poller};
pub use reconciler::{reconcile, CanonicalState};
pub use session::Session;
pub use tracker::{Applied, JobTracker, SubmissionTicket, TrackedJob};
pub use view::View;
