// CLI commands for browsing problems and running submissions
use anyhow::{bail, Context, Result};
use codepad_common::config::ClientConfig;
use codepad_common::types::ExecutionRequest;
use codepad_tracker::{CatalogClient, HttpClient, Session, View};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::render;

/// List all problems
pub async fn list_problems(config: &ClientConfig) -> Result<bool> {
    let client = HttpClient::new(config)?;

    match client.list_problems().await {
        Ok(list) => {
            print!("{}", render::problem_list(&list.problems));
            Ok(true)
        }
        Err(e) => {
            error!(error = %e, api = %client.base_url(), "Failed to load problems");
            print!("{}", render::problem_list(&[]));
            Ok(false)
        }
    }
}

/// Show one problem with its visible test cases
pub async fn show_problem(config: &ClientConfig, problem_id: i64) -> Result<bool> {
    let client = HttpClient::new(config)?;

    match client.get_problem(problem_id).await {
        Ok(detail) => {
            print!("{}", render::problem_detail(&detail));
            Ok(true)
        }
        Err(e) => {
            error!(problem_id, error = %e, "Failed to load problem");
            print!("{}", render::problem_load_error(problem_id));
            Ok(false)
        }
    }
}

/// Submit a solution and follow it until the outcome is known.
/// Returns false when the run errored or any test failed.
pub async fn submit(config: &ClientConfig, problem_id: i64, file: Option<&Path>) -> Result<bool> {
    let code = read_source(file)?;
    if code.trim().is_empty() {
        bail!("Source code is empty");
    }

    println!("🚀 Running solution for problem #{} ({})", problem_id, config.language);

    let client = Arc::new(HttpClient::new(config)?);
    let mut session = Session::new(client, config);

    let mut last = session.submit(ExecutionRequest::new(code, problem_id)).await;
    print!("{}", render::view(&last));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let next = tokio::select! {
            update = session.next_update() => Next::Update(update),
            _ = &mut ctrl_c => Next::Interrupted,
        };

        match next {
            Next::Update(Some(view)) => {
                if view != last {
                    print!("{}", render::view(&view));
                    last = view;
                }
            }
            Next::Update(None) => break,
            Next::Interrupted => {
                warn!("Interrupted, abandoning job");
                session.teardown();
                println!("\n⚠️  Cancelled - results for this run will not be shown");
                return Ok(false);
            }
        }
    }

    info!(problem_id, outcome = %outcome_label(&last), "Submission finished");
    Ok(!last.is_error() && last.all_passed() != Some(false))
}

enum Next {
    Update(Option<View>),
    Interrupted,
}

fn outcome_label(view: &View) -> &'static str {
    match view {
        View::ErrorBanner { .. } => "error",
        View::ResultList { passed, total, .. } if passed == total => "passed",
        View::ResultList { .. } => "failed",
        View::NoResults => "no_results",
        View::PendingBanner { .. } | View::SubmittedBanner { .. } => "unfinished",
        View::Nothing => "none",
    }
}

fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read source from stdin")?;
            Ok(code)
        }
    }
}
