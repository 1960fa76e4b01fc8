//! Job execution.
//!
//! Jobs run one at a time, in the order the dispatcher produced them. A job
//! that fails is recorded and the batch moves on to the next one. A problem
//! that affects every job (a stale override that cannot be removed) stops
//! the batch before it starts, and Ctrl-C during a tool run stops it after
//! that job.

mod types;

pub use types::{BatchReport, ExecuteError, JobOutcome, JobStatus};

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::args::Action;
use crate::config::Config;
use crate::job::{ArtifactMapping, BuildJob};
use crate::release_override::{self, OverrideError, ReleaseOverride};
use crate::tool::{BuildTool, ToolError};

/// Run every job in order and collect their outcomes.
///
/// `on_outcome` is called after each job finishes, before the next starts.
pub async fn run_batch<T, F>(
  action: Action,
  jobs: Vec<BuildJob>,
  config: &Config,
  tool: &T,
  mut on_outcome: F,
) -> Result<BatchReport, OverrideError>
where
  T: BuildTool,
  F: FnMut(&JobOutcome),
{
  let mut report = BatchReport::new(action);
  report.stale_override_removed = release_override::clear_stale(&config.override_target)?;

  info!(action = action.as_str(), jobs = jobs.len(), "starting batch");
  for job in jobs {
    let outcome = execute_job(job, config, tool).await;
    let interrupted = outcome.status == JobStatus::Interrupted;
    on_outcome(&outcome);
    report.outcomes.push(outcome);
    if interrupted {
      warn!("batch interrupted, skipping remaining jobs");
      break;
    }
  }

  info!(
    exported = report.exported_count(),
    failed = report.failed_count(),
    "batch finished"
  );
  Ok(report)
}

/// Run a single job to completion. Never fails; errors end up in the outcome.
pub async fn execute_job<T: BuildTool>(job: BuildJob, config: &Config, tool: &T) -> JobOutcome {
  let start = Instant::now();

  let status = match run_job(&job, config, tool).await {
    Ok(status) => status,
    Err(ExecuteError::Tool(ToolError::Interrupted { .. })) => JobStatus::Interrupted,
    Err(err) => {
      warn!(job = %job, error = %err, "job failed");
      JobStatus::Failed { error: err.to_string() }
    }
  };

  JobOutcome {
    job,
    status,
    duration: start.elapsed(),
  }
}

async fn run_job<T: BuildTool>(job: &BuildJob, config: &Config, tool: &T) -> Result<JobStatus, ExecuteError> {
  // Held until this function returns, on every path.
  let _release_override = if job.flavor().needs_release_override() {
    let guard = ReleaseOverride::install(&config.override_template, &config.override_target)?;
    debug!(job = %job, path = %guard.path().display(), "building with release override");
    Some(guard)
  } else {
    None
  };

  ensure_export_dir(&config.export_dir)?;
  remove_previous_export(&config.export_dir.join(job.target_filename(&config.editor_name)));

  tool.run(job, &job.tool_flags(config.jobs)).await?;

  match job.artifact(&config.editor_name, &config.export_dir) {
    None => Ok(JobStatus::Cleaned),
    Some(artifact) => export_artifact(&artifact, &config.bin_dir),
  }
}

fn ensure_export_dir(dir: &Path) -> Result<(), ExecuteError> {
  if dir.is_dir() {
    debug!(path = %dir.display(), "export directory exists");
    return Ok(());
  }
  fs::create_dir_all(dir).map_err(|source| ExecuteError::CreateExportDir {
    path: dir.to_path_buf(),
    source,
  })?;
  info!(path = %dir.display(), "created export directory");
  Ok(())
}

/// Best effort: a file that cannot be removed here surfaces when the copy overwrites it.
fn remove_previous_export(path: &Path) {
  match fs::remove_file(path) {
    Ok(()) => debug!(path = %path.display(), "removed previous export"),
    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
    Err(err) => warn!(path = %path.display(), error = %err, "failed to remove previous export"),
  }
}

fn export_artifact(artifact: &ArtifactMapping, bin_dir: &Path) -> Result<JobStatus, ExecuteError> {
  let from = artifact.source_path(bin_dir);
  if !from.is_file() {
    debug!(path = %from.display(), "build output not found, skipping export");
    return Ok(JobStatus::NoArtifact);
  }

  let to = artifact.target_path();
  fs::copy(&from, &to).map_err(|source| ExecuteError::CopyArtifact {
    from: from.clone(),
    to: to.clone(),
    source,
  })?;
  info!(from = %from.display(), to = %to.display(), "exported artifact");

  Ok(JobStatus::Exported { artifact: to })
}
