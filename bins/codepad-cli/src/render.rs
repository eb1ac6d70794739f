// Terminal rendering for views and catalog data
// Every function returns the text so output can be tested without a terminal

use codepad_common::types::{JobPhase, Problem, ProblemDetail, TestResult};
use codepad_tracker::View;
use std::fmt::Write;

pub fn view(view: &View) -> String {
    let mut out = String::new();

    match view {
        View::Nothing => {}
        View::ErrorBanner { message } => {
            let _ = writeln!(out, "❌ {}", message);
        }
        View::SubmittedBanner { job_id, message } => {
            let _ = writeln!(out, "📨 Submitted (job {})", job_id);
            if let Some(message) = message {
                let _ = writeln!(out, "   {}", message);
            }
        }
        View::PendingBanner { phase, message } => {
            let label = match phase {
                JobPhase::Pending => "Waiting in queue...",
                _ => "Running tests...",
            };
            let _ = writeln!(out, "⏳ {}", label);
            if let Some(message) = message {
                let _ = writeln!(out, "   {}", message);
            }
        }
        View::NoResults => {
            let _ = writeln!(out, "No results.");
        }
        View::ResultList {
            results,
            passed,
            total,
        } => {
            let _ = writeln!(out, "\n📋 Results:\n");
            for result in results {
                out.push_str(&test_result(result));
            }
            let icon = if passed == total { "✅" } else { "⚠️ " };
            let _ = writeln!(out, "{} {}/{} tests passed", icon, passed, total);
        }
    }

    out
}

fn test_result(result: &TestResult) -> String {
    let mut out = String::new();
    let verdict = if result.passed { "✓ Passed" } else { "✗ Failed" };

    let _ = writeln!(out, "Test Case #{}  {}", result.test_case_id, verdict);
    let _ = writeln!(out, "  Input: {}", result.input.as_deref().unwrap_or(""));
    let _ = writeln!(
        out,
        "  Expected Output: {}",
        result.expected_output.as_deref().unwrap_or("")
    );
    let _ = writeln!(out, "  Actual Output: {}", result.actual_output);
    if let Some(error) = &result.error {
        let _ = writeln!(out, "  Error: {}", error);
    }
    out.push('\n');
    out
}

pub fn problem_list(problems: &[Problem]) -> String {
    if problems.is_empty() {
        return "No problems available. There might be an issue with the API.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<6} {:<12} {}", "ID", "Difficulty", "Title");
    let _ = writeln!(out, "{}", "─".repeat(60));
    for problem in problems {
        let _ = writeln!(
            out,
            "{:<6} {:<12} {}",
            problem.id, problem.difficulty, problem.title
        );
    }
    let _ = writeln!(out, "\nTotal: {} problem(s)", problems.len());
    out
}

pub fn problem_detail(detail: &ProblemDetail) -> String {
    let problem = &detail.problem;
    let mut out = String::new();

    let _ = writeln!(out, "{}", problem.title);
    let _ = writeln!(out, "{}\n", problem.difficulty);
    let _ = writeln!(out, "{}\n", problem.description.trim());

    let visible: Vec<_> = detail.test_cases.iter().filter(|tc| !tc.is_hidden).collect();
    let _ = writeln!(out, "Test Cases");
    if visible.is_empty() {
        let _ = writeln!(out, "  (none visible)");
    }
    for tc in visible {
        let _ = writeln!(out, "  Input: {}", tc.input);
        let _ = writeln!(out, "  Expected Output: {}\n", tc.expected_output);
    }
    out
}

pub fn problem_load_error(problem_id: i64) -> String {
    format!(
        "Error loading problem #{}\nThere was an error loading this problem. Please try again later.\n",
        problem_id
    )
}
