use crate::error::GraderError;
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::{process::Command, time::timeout};

/// Shallow-clones a repository into a scratch directory.
///
/// The returned [`TempDir`] owns the checkout; dropping it removes the
/// working tree. Clone failures of any kind, including running past the
/// limit, are reported as [`GraderError::FetchFailed`] since retrying an
/// unreachable repository rarely helps.
pub async fn clone_repo(repo_url: &str, limit: Duration) -> Result<TempDir, GraderError> {
    let dir = tempfile::tempdir()?;

    let child = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg(repo_url)
        .arg(dir.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| {
            GraderError::FetchFailed(format!("{repo_url}: clone timed out after {limit:?}"))
        })??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GraderError::FetchFailed(format!(
            "{repo_url}: {}",
            crate::truncate_output(&stderr)
        )));
    }

    Ok(dir)
}
