//! Evaluation engine for submitted repositories.
//!
//! Given a GitHub URL, the grader shallow-clones the repository into a
//! scratch directory and produces a [`ScoreReport`] in one of two ways:
//!
//! - **Scripted**: the module's evaluation script is downloaded and run
//!   against the checkout with a time limit; the script prints a JSON
//!   report on stdout.
//! - **Structural**: with no script configured, a set of filesystem checks
//!   awards provisional points and flags the rest for manual review.
//!
//! The crate knows nothing about the database or HTTP layer. Callers feed
//! the resulting report into whatever bookkeeping they keep and use
//! [`percentage`] and [`letter_grade`] to put it on a transcript scale.

pub mod checks;
pub mod error;
pub mod report;
pub mod scorer;
pub mod script;
pub mod workspace;

pub use error::GraderError;
pub use report::ScoreReport;
pub use scorer::{letter_grade, percentage};

use std::time::Duration;

/// What to evaluate a submission against; derived from the module's
/// grading configuration.
#[derive(Debug, Clone)]
pub struct EvaluationSpec {
    /// Where to fetch the evaluation script, or `None` for structural
    /// review only.
    pub script_url: Option<String>,
    /// The module's point scale.
    pub max_points: i32,
    pub clone_timeout: Duration,
    pub eval_timeout: Duration,
}

/// Clones `repo_url` and evaluates it per `spec`.
pub async fn evaluate(repo_url: &str, spec: &EvaluationSpec) -> Result<ScoreReport, GraderError> {
    let checkout = workspace::clone_repo(repo_url, spec.clone_timeout).await?;

    let report = match spec.script_url.as_deref() {
        Some(url) => {
            // The script lives outside the checkout so it never shows up
            // in the repository's own file listing.
            let script_dir = tempfile::tempdir()?;
            let script = script::fetch_script(url, script_dir.path()).await?;
            let stdout = script::run_script(&script, checkout.path(), spec.eval_timeout).await?;
            ScoreReport::parse(&stdout)?
        }
        None => checks::structural_review(checkout.path()),
    };

    Ok(report.normalize(spec.max_points))
}

/// Bounds process output quoted in error messages.
pub(crate) fn truncate_output(text: &str) -> String {
    const LIMIT: usize = 400;
    let text = text.trim();
    if text.len() <= LIMIT {
        return text.to_string();
    }
    let mut cut = LIMIT;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}
