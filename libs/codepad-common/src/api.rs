// HTTP endpoint layout for the Execution Service and the Problem Catalog Service.
// Paths are relative to the API base URL; the client and test servers share them.

pub const PROBLEMS_PATH: &str = "/problems";
pub const EXECUTE_PATH: &str = "/execute";
pub const JOB_STATUS_PREFIX: &str = "/execute/job";

/// Path for a single problem with its test cases
pub fn problem_path(problem_id: i64) -> String {
    format!("{}/{}", PROBLEMS_PATH, problem_id)
}

/// Join a base URL and a path without doubling or dropping the slash
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
