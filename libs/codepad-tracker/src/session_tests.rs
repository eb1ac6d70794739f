//! Controller scenarios for Session
//!
//! Each test scripts the Execution Service with `ScriptedClient` and runs on a
//! paused clock, so poll timing is exact and no test waits in real time.

use super::*;
use crate::testing::{
    ack, completed, pending, processing, test_result, ScriptedClient, Step, SubmitStep,
};
use crate::tracker::Applied;
use codepad_common::types::{JobPhase, TestResult};

const INTERVAL: Duration = Duration::from_secs(1);

fn session(client: &Arc<ScriptedClient>) -> Session<ScriptedClient> {
    Session::with_polling(Arc::clone(client), INTERVAL, 20)
}

fn request() -> ExecutionRequest {
    ExecutionRequest::new("package main\n\nfunc main() {}\n", 1)
}

fn result_ids(view: &View) -> Vec<i64> {
    match view {
        View::ResultList { results, .. } => results.iter().map(|r| r.test_case_id).collect(),
        other => panic!("expected results, got {:?}", other),
    }
}

/// Test: acknowledgment, one pending poll, then completion
#[tokio::test(start_paused = true)]
async fn test_scenario_ack_pending_completed() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(ack("j1")));
    client.script_status(
        "j1",
        vec![
            Step::Status(pending("j1")),
            Step::Status(completed("j1", vec![test_result(1, "5", true)])),
        ],
    );
    let mut session = session(&client);

    let view = session.submit(request()).await;
    assert_eq!(
        view,
        View::SubmittedBanner {
            job_id: "j1".into(),
            message: None
        }
    );
    assert!(session.is_polling());

    let view = session.next_update().await.unwrap();
    assert_eq!(
        view,
        View::PendingBanner {
            phase: JobPhase::Pending,
            message: None
        }
    );

    let view = session.next_update().await.unwrap();
    assert_eq!(
        view,
        View::ResultList {
            results: vec![test_result(1, "5", true)],
            passed: 1,
            total: 1,
        }
    );
    assert!(!session.is_polling());
    assert!(session.next_update().await.is_none());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(client.status_calls("j1"), 2);
    assert_eq!(client.submitted(), vec![request()]);
}

/// Test: compile error comes back inline and nothing is polled
#[tokio::test(start_paused = true)]
async fn test_scenario_immediate_compile_error() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(SubmissionResponse::failure(
        "compile error: ./main.go:3:1: syntax error",
    )));
    let mut session = session(&client);

    let view = session.submit(request()).await;
    assert_eq!(
        view,
        View::ErrorBanner {
            message: "compile error: ./main.go:3:1: syntax error".into()
        }
    );
    assert!(!session.is_polling());
    assert!(session.next_update().await.is_none());
}

/// Test: poll transport failure, then a new submission ignores late j1 data
#[tokio::test(start_paused = true)]
async fn test_scenario_poll_failure_then_resubmit() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(ack("j1")));
    client.script_submission(SubmitStep::Response(ack("j2")));
    client.script_status("j1", vec![Step::TransportFailure]);
    let mut session = session(&client);

    session.submit(request()).await;
    let view = session.next_update().await.unwrap();
    match &view {
        View::ErrorBanner { message } => {
            assert!(message.starts_with("Failed to check job status: HTTP request failed"))
        }
        other => panic!("expected poll error, got {:?}", other),
    }
    assert!(session.next_update().await.is_none());
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(client.status_calls("j1"), 1);

    let view = session.submit(request()).await;
    assert_eq!(
        view,
        View::SubmittedBanner {
            job_id: "j2".into(),
            message: None
        }
    );

    let late = completed("j1", vec![test_result(1, "5", true)]);
    assert_eq!(session.tracker.on_poll_result("j1", late), Applied::Stale);
    assert_eq!(
        session.view(),
        View::SubmittedBanner {
            job_id: "j2".into(),
            message: None
        }
    );
}

/// Test: a poll in flight for the old job resolves after the new submission
#[tokio::test(start_paused = true)]
async fn test_in_flight_poll_from_superseded_job_is_discarded() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(ack("j1")));
    client.script_submission(SubmitStep::Response(ack("j2")));
    client.script_status(
        "j1",
        vec![Step::Delayed(
            Duration::from_secs(3),
            completed("j1", vec![test_result(1, "wrong job", true)]),
        )],
    );
    client.script_status(
        "j2",
        vec![
            Step::Status(pending("j2")),
            Step::Status(processing("j2")),
            Step::Status(processing("j2")),
            Step::Status(processing("j2")),
            Step::Status(completed("j2", vec![test_result(7, "42", true)])),
        ],
    );
    let mut session = session(&client);

    session.submit(request()).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(client.status_calls("j1"), 1);

    session.submit(request()).await;
    let final_view = session.wait_for_outcome().await;
    assert_eq!(result_ids(&final_view), vec![7]);
    assert_eq!(client.status_calls("j1"), 1);
    assert_eq!(client.status_calls("j2"), 5);
}

/// Test: every error response classifies as an error and never polls
#[tokio::test(start_paused = true)]
async fn test_error_responses_never_start_polling() {
    let responses = vec![
        SubmissionResponse::failure("boom"),
        SubmissionResponse {
            success: false,
            error: Some("queue full".into()),
            job_id: Some("j1".into()),
            ..Default::default()
        },
        SubmissionResponse {
            success: true,
            error: Some("partial".into()),
            test_results: Some(vec![test_result(1, "1", true)]),
            ..Default::default()
        },
    ];

    for response in responses {
        let client = Arc::new(ScriptedClient::new());
        client.script_submission(SubmitStep::Response(response));
        let mut session = session(&client);

        assert!(session.submit(request()).await.is_error());
        assert!(!session.is_polling());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(client.status_calls("j1"), 0);
    }
}

/// Test: acknowledgment starts exactly one poller
#[tokio::test(start_paused = true)]
async fn test_ack_starts_one_poller() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(SubmissionResponse {
        success: true,
        job_id: Some("j1".into()),
        message: Some("Job queued".into()),
        test_results: Some(vec![]),
        ..Default::default()
    }));
    let mut session = session(&client);

    let view = session.submit(request()).await;
    assert_eq!(
        view,
        View::SubmittedBanner {
            job_id: "j1".into(),
            message: Some("Job queued".into())
        }
    );

    let view = session.next_update().await.unwrap();
    assert_eq!(
        view,
        View::PendingBanner {
            phase: JobPhase::Pending,
            message: Some("Job queued".into())
        }
    );
    assert_eq!(client.status_calls("j1"), 1);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(client.status_calls("j1"), 4);
}

/// Test: N results survive reconcile + map in order with their flags
#[tokio::test(start_paused = true)]
async fn test_completed_results_round_trip() {
    let results: Vec<TestResult> = (1..=6)
        .map(|id| test_result(id, &id.to_string(), id % 2 == 0))
        .collect();

    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(ack("j1")));
    client.script_status("j1", vec![Step::Status(completed("j1", results.clone()))]);
    let mut session = session(&client);

    session.submit(request()).await;
    let view = session.wait_for_outcome().await;
    match view {
        View::ResultList {
            results: rows,
            passed,
            total,
        } => {
            assert_eq!(rows, results);
            assert_eq!(passed, 3);
            assert_eq!(total, 6);
        }
        other => panic!("expected results, got {:?}", other),
    }
}

/// Test: inline results with a job id are final
#[tokio::test(start_paused = true)]
async fn test_inline_results_skip_polling() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(SubmissionResponse {
        success: true,
        job_id: Some("j1".into()),
        test_results: Some(vec![test_result(1, "5", true), test_result(2, "6", false)]),
        ..Default::default()
    }));
    let mut session = session(&client);

    let view = session.submit(request()).await;
    assert_eq!(result_ids(&view), vec![1, 2]);
    assert_eq!(view.all_passed(), Some(false));
    assert!(!session.is_polling());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(client.status_calls("j1"), 0);
}

/// Test: success with neither job nor results shows the placeholder
#[tokio::test(start_paused = true)]
async fn test_bare_success_is_no_results() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(SubmissionResponse {
        success: true,
        ..Default::default()
    }));
    let mut session = session(&client);

    assert_eq!(session.submit(request()).await, View::NoResults);
}

/// Test: unreadable submission body becomes an error view
#[tokio::test(start_paused = true)]
async fn test_malformed_submission_body() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Malformed);
    let mut session = session(&client);

    match session.submit(request()).await {
        View::ErrorBanner { message } => assert!(message.starts_with("Failed to parse JSON")),
        other => panic!("expected error banner, got {:?}", other),
    }
    assert!(!session.is_polling());
}

/// Test: unreachable Execution Service at submit time
#[tokio::test(start_paused = true)]
async fn test_submission_transport_failure() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::TransportFailure);
    let mut session = session(&client);

    match session.submit(request()).await {
        View::ErrorBanner { message } => {
            assert!(message.starts_with("An error occurred: HTTP request failed"))
        }
        other => panic!("expected error banner, got {:?}", other),
    }
}

/// Test: unreadable status body ends the job as an error, not a poll error
#[tokio::test(start_paused = true)]
async fn test_malformed_status_body() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(ack("j1")));
    client.script_status("j1", vec![Step::Status(pending("j1")), Step::Malformed]);
    let mut session = session(&client);

    session.submit(request()).await;
    match session.wait_for_outcome().await {
        View::ErrorBanner { message } => assert!(message.starts_with("Failed to parse JSON")),
        other => panic!("expected error banner, got {:?}", other),
    }
    assert!(matches!(session.state(), CanonicalState::ImmediateError(_)));
}

/// Test: failed job carrying an error message is shown verbatim
#[tokio::test(start_paused = true)]
async fn test_failed_job_error_verbatim() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(ack("j1")));
    let mut failed = completed("j1", vec![]);
    failed.status = JobPhase::Failed;
    failed.success = false;
    failed.error = Some("runtime error: integer divide by zero".into());
    client.script_status("j1", vec![Step::Status(failed)]);
    let mut session = session(&client);

    session.submit(request()).await;
    assert_eq!(
        session.wait_for_outcome().await,
        View::ErrorBanner {
            message: "runtime error: integer divide by zero".into()
        }
    );
}

/// Test: a job that never finishes is abandoned at the ceiling
#[tokio::test(start_paused = true)]
async fn test_slow_job_hits_poll_ceiling() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(ack("j1")));
    let mut session = Session::with_polling(Arc::clone(&client), INTERVAL, 3);

    session.submit(request()).await;
    assert_eq!(
        session.wait_for_outcome().await,
        View::ErrorBanner {
            message: "Failed to check job status: Job j1 did not finish after 3 status checks"
                .into()
        }
    );
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(client.status_calls("j1"), 3);
}

/// Test: teardown stops polling and clears the view
#[tokio::test(start_paused = true)]
async fn test_teardown_mid_poll() {
    let client = Arc::new(ScriptedClient::new());
    client.script_submission(SubmitStep::Response(ack("j1")));
    let mut session = session(&client);

    session.submit(request()).await;
    session.next_update().await.unwrap();
    session.teardown();
    session.teardown();

    assert_eq!(session.view(), View::Nothing);
    assert!(session.next_update().await.is_none());
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(client.status_calls("j1"), 1);
}

/// Test: fresh session renders nothing
#[tokio::test]
async fn test_idle_session() {
    let client = Arc::new(ScriptedClient::new());
    let session = session(&client);
    assert_eq!(session.state(), CanonicalState::Idle);
    assert_eq!(session.view(), View::Nothing);
}
