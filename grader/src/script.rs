use crate::error::GraderError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::{process::Command, time::timeout};

/// Downloads an evaluation script to `dest_dir` and returns its path.
pub async fn fetch_script(url: &str, dest_dir: &Path) -> Result<PathBuf, GraderError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| GraderError::FetchFailed(format!("{url}: {e}")))?;

    if !response.status().is_success() {
        return Err(GraderError::FetchFailed(format!(
            "{url}: HTTP {}",
            response.status()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| GraderError::FetchFailed(format!("{url}: {e}")))?;

    let path = dest_dir.join("evaluate.py");
    tokio::fs::write(&path, &body).await?;
    Ok(path)
}

/// Runs an evaluation script against a checked-out repository and returns
/// its stdout.
///
/// The script gets the repository path as its only argument and the given
/// time limit to finish. A nonzero exit is an evaluation crash; the stderr
/// excerpt in the error is what ends up on the submission's
/// `last_grading_error`.
pub async fn run_script(
    script: &Path,
    repo_dir: &Path,
    limit: Duration,
) -> Result<String, GraderError> {
    let child = Command::new("python3")
        .arg(script)
        .arg(repo_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| GraderError::EvaluationTimeout(limit))??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GraderError::EvaluationCrashed(format!(
            "exit code {}: {}",
            output.status.code().unwrap_or(-1),
            crate::truncate_output(&stderr)
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
