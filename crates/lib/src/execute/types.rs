//! Types for job execution.
//!
//! This module defines the error type raised inside a single job and the
//! outcome/report types the executor hands back to callers.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::args::Action;
use crate::job::BuildJob;
use crate::release_override::OverrideError;
use crate::tool::ToolError;

/// Errors that can end a single job early.
///
/// They are folded into [`JobStatus::Failed`], except an interrupted tool,
/// which becomes [`JobStatus::Interrupted`] and ends the batch.
#[derive(Debug, Error)]
pub enum ExecuteError {
  #[error(transparent)]
  Override(#[from] OverrideError),

  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error("failed to create export directory {}: {source}", path.display())]
  CreateExportDir { path: PathBuf, source: std::io::Error },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  CopyArtifact {
    from: PathBuf,
    to: PathBuf,
    source: std::io::Error,
  },
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
  /// Clean job finished; nothing is exported.
  Cleaned,
  /// Build finished and its binary was copied into the export directory.
  Exported { artifact: PathBuf },
  /// Build finished but the expected binary was not there to export.
  NoArtifact,
  /// The job could not complete.
  Failed { error: String },
  /// The tool was stopped by Ctrl-C; no further jobs run.
  Interrupted,
}

impl JobStatus {
  pub fn is_failure(&self) -> bool {
    matches!(self, Self::Failed { .. } | Self::Interrupted)
  }
}

/// Result of executing one job.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
  pub job: BuildJob,
  #[serde(flatten)]
  pub status: JobStatus,
  #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
  pub duration: Duration,
}

/// Result of executing a whole batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
  pub action: Action,
  /// Whether an override left by an earlier run had to be removed first.
  pub stale_override_removed: bool,
  pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
  pub fn new(action: Action) -> Self {
    Self {
      action,
      stale_override_removed: false,
      outcomes: Vec::new(),
    }
  }

  pub fn failed_count(&self) -> usize {
    self.outcomes.iter().filter(|o| o.status.is_failure()).count()
  }

  pub fn exported_count(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|o| matches!(o.status, JobStatus::Exported { .. }))
      .count()
  }

  pub fn was_interrupted(&self) -> bool {
    self.outcomes.iter().any(|o| o.status == JobStatus::Interrupted)
  }

  pub fn is_success(&self) -> bool {
    self.failed_count() == 0
  }

  pub fn total_duration(&self) -> Duration {
    self.outcomes.iter().map(|o| o.duration).sum()
  }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_u64(duration.as_millis().try_into().unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::job::Flavor;
  use crate::platform::Platform;
  use crate::platform::arch::Arch;

  fn outcome(status: JobStatus) -> JobOutcome {
    JobOutcome {
      job: BuildJob::new(Platform::Windows, Flavor::TemplateRelease, Arch::X86_64),
      status,
      duration: Duration::from_millis(1500),
    }
  }

  #[test]
  fn report_counts() {
    let mut report = BatchReport::new(Action::Build);
    report.outcomes.push(outcome(JobStatus::Exported {
      artifact: PathBuf::from("bin/export/windows_release_x86_64.exe"),
    }));
    report.outcomes.push(outcome(JobStatus::NoArtifact));
    report.outcomes.push(outcome(JobStatus::Failed {
      error: "boom".to_string(),
    }));

    assert_eq!(report.exported_count(), 1);
    assert_eq!(report.failed_count(), 1);
    assert!(!report.is_success());
    assert_eq!(report.total_duration(), Duration::from_millis(4500));
    assert!(!report.was_interrupted());
  }

  #[test]
  fn interrupted_job_counts_as_failure() {
    let mut report = BatchReport::new(Action::Clean);
    report.outcomes.push(outcome(JobStatus::Cleaned));
    report.outcomes.push(outcome(JobStatus::Interrupted));

    assert!(report.was_interrupted());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(serde_json::to_value(&report.outcomes[1]).unwrap()["status"], "interrupted");
  }

  #[test]
  fn outcome_serializes_flat() {
    let json = serde_json::to_value(outcome(JobStatus::Failed {
      error: "tool exited".to_string(),
    }))
    .unwrap();

    assert_eq!(json["status"], "failed");
    assert_eq!(json["error"], "tool exited");
    assert_eq!(json["duration_ms"], 1500);
    assert_eq!(json["job"]["platform"], "windows");
    assert_eq!(json["job"]["flavor"], "template_release");
    assert_eq!(json["job"]["arch"], "x86_64");
  }
}
