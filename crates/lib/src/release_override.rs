//! Scoped release-settings override.
//!
//! The build tool picks up custom release settings when a settings file
//! exists at a well-known location in the project root. The override is
//! put in place by copying a template there, and it is removed when the
//! guard is dropped, so no exit path of a job can leave it behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum OverrideError {
  #[error("release override template not found: {}", path.display())]
  TemplateMissing { path: PathBuf },

  #[error("failed to install release override {}: {source}", path.display())]
  Install { path: PathBuf, source: io::Error },

  #[error("failed to remove stale release override {}: {source}", path.display())]
  RemoveStale { path: PathBuf, source: io::Error },
}

/// Holds the override in place for as long as it is alive.
#[must_use = "the override is removed as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ReleaseOverride {
  target: PathBuf,
}

impl ReleaseOverride {
  /// Copy `template` to `target` and return a guard that removes `target` on drop.
  pub fn install(template: &Path, target: &Path) -> Result<Self, OverrideError> {
    if !template.is_file() {
      return Err(OverrideError::TemplateMissing {
        path: template.to_path_buf(),
      });
    }

    fs::copy(template, target).map_err(|source| OverrideError::Install {
      path: target.to_path_buf(),
      source,
    })?;
    debug!(path = %target.display(), "release override installed");

    Ok(Self {
      target: target.to_path_buf(),
    })
  }

  pub fn path(&self) -> &Path {
    &self.target
  }
}

impl Drop for ReleaseOverride {
  fn drop(&mut self) {
    match fs::remove_file(&self.target) {
      Ok(()) => debug!(path = %self.target.display(), "release override removed"),
      Err(err) if err.kind() == io::ErrorKind::NotFound => {}
      Err(err) => warn!(path = %self.target.display(), error = %err, "failed to remove release override"),
    }
  }
}

/// Remove an override left behind by an interrupted earlier run.
///
/// Returns whether a stale file was found.
pub fn clear_stale(target: &Path) -> Result<bool, OverrideError> {
  if !target.exists() {
    return Ok(false);
  }
  warn!(path = %target.display(), "removing stale release override from a previous run");
  fs::remove_file(target).map_err(|source| OverrideError::RemoveStale {
    path: target.to_path_buf(),
    source,
  })?;
  Ok(true)
}
