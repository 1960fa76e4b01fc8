//! Dispatcher configuration.
//!
//! Values are layered: built-in defaults, then an optional `txbuild.json` in
//! the project root, then `TXBUILD_*` environment variables. Relative paths
//! are resolved against the project root.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  CONFIG_FILENAME, DEFAULT_BIN_DIR, DEFAULT_EDITOR_NAME, DEFAULT_EXPORT_DIR, DEFAULT_JOBS, DEFAULT_OVERRIDE_TARGET,
  DEFAULT_OVERRIDE_TEMPLATE, DEFAULT_TOOL, ENV_JOBS, ENV_SCRIPT_KEY, ENV_TIMEOUT, ENV_TOOL,
};
use crate::platform::Platform;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("invalid config {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("invalid value for {var}: {value:?} ({reason})")]
  InvalidEnv {
    var: &'static str,
    value: String,
    reason: String,
  },

  #[error("invalid timeout {value:?}: {source}")]
  InvalidTimeout {
    value: String,
    source: humantime::DurationError,
  },

  #[error("parallelism must be at least 1")]
  ZeroJobs,

  #[error("secondary platform tag {0:?} is registered more than once")]
  DuplicateTag(String),
}

/// A platform reachable through the `variant` position of the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryPlatform {
  pub tag: String,
  pub platform: Platform,
}

impl SecondaryPlatform {
  pub fn new(tag: &str, platform: Platform) -> Self {
    Self {
      tag: tag.to_ascii_lowercase(),
      platform,
    }
  }
}

/// Value passed to the build tool that must never show up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ScriptKey(String);

impl ScriptKey {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for ScriptKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("ScriptKey(***)")
  }
}

/// On-disk shape of `txbuild.json`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
  tool: Option<String>,
  jobs: Option<u32>,
  bin_dir: Option<PathBuf>,
  export_dir: Option<PathBuf>,
  editor_name: Option<String>,
  override_template: Option<PathBuf>,
  override_target: Option<PathBuf>,
  secondary_platforms: Option<Vec<SecondaryPlatform>>,
  extra_flags: Option<Vec<String>>,
  script_key: Option<String>,
  timeout: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
  /// Project root; the tool runs here and relative paths resolve against it.
  pub root: PathBuf,
  /// Build tool command, e.g. `scons`.
  pub tool: String,
  /// Value of the `-j` flag.
  pub jobs: u32,
  /// Folder the build tool writes binaries into.
  pub bin_dir: PathBuf,
  /// Stable output folder for renamed binaries.
  pub export_dir: PathBuf,
  /// Export name of the editor binary, without extension.
  pub editor_name: String,
  /// Source copied into place to enable custom release settings.
  pub override_template: PathBuf,
  /// Location the build tool reads custom release settings from.
  pub override_target: PathBuf,
  pub secondary_platforms: Vec<SecondaryPlatform>,
  /// Appended verbatim to every tool invocation.
  pub extra_flags: Vec<String>,
  pub script_key: Option<ScriptKey>,
  pub timeout: Option<Duration>,
}

impl Config {
  /// Built-in configuration for a project rooted at `root`.
  pub fn defaults(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
      tool: DEFAULT_TOOL.to_string(),
      jobs: DEFAULT_JOBS,
      bin_dir: root.join(DEFAULT_BIN_DIR),
      export_dir: root.join(DEFAULT_EXPORT_DIR),
      editor_name: DEFAULT_EDITOR_NAME.to_string(),
      override_template: root.join(DEFAULT_OVERRIDE_TEMPLATE),
      override_target: root.join(DEFAULT_OVERRIDE_TARGET),
      secondary_platforms: vec![
        SecondaryPlatform::new("uwp", Platform::UwpX64),
        SecondaryPlatform::new("uwp_arm", Platform::UwpArm64),
      ],
      extra_flags: Vec::new(),
      script_key: None,
      timeout: None,
    }
  }

  /// Load the layered configuration for a project rooted at `root`.
  pub fn load(root: &Path) -> Result<Self, ConfigError> {
    let mut config = Self::defaults(root);

    let path = root.join(CONFIG_FILENAME);
    if path.exists() {
      debug!(path = %path.display(), "loading config file");
      let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
      })?;
      let file: ConfigFile =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
      config.apply_file(file)?;
    }

    config.apply_env()?;
    config.validate()?;
    Ok(config)
  }

  /// Look up a registered secondary platform by its (lowercase) tag.
  pub fn secondary(&self, tag: &str) -> Option<&SecondaryPlatform> {
    self.secondary_platforms.iter().find(|s| s.tag == tag)
  }

  fn apply_file(&mut self, file: ConfigFile) -> Result<(), ConfigError> {
    if let Some(tool) = file.tool {
      self.tool = tool;
    }
    if let Some(jobs) = file.jobs {
      self.jobs = jobs;
    }
    if let Some(dir) = file.bin_dir {
      self.bin_dir = self.root.join(dir);
    }
    if let Some(dir) = file.export_dir {
      self.export_dir = self.root.join(dir);
    }
    if let Some(name) = file.editor_name {
      self.editor_name = name;
    }
    if let Some(path) = file.override_template {
      self.override_template = self.root.join(path);
    }
    if let Some(path) = file.override_target {
      self.override_target = self.root.join(path);
    }
    if let Some(platforms) = file.secondary_platforms {
      self.secondary_platforms = platforms
        .into_iter()
        .map(|s| SecondaryPlatform::new(&s.tag, s.platform))
        .collect();
    }
    if let Some(flags) = file.extra_flags {
      self.extra_flags = flags;
    }
    if let Some(key) = file.script_key {
      self.script_key = Some(ScriptKey::new(key));
    }
    if let Some(timeout) = file.timeout {
      self.timeout = Some(parse_timeout(&timeout)?);
    }
    Ok(())
  }

  fn apply_env(&mut self) -> Result<(), ConfigError> {
    if let Ok(tool) = std::env::var(ENV_TOOL)
      && !tool.trim().is_empty()
    {
      self.tool = tool;
    }
    if let Ok(jobs) = std::env::var(ENV_JOBS) {
      self.jobs = jobs.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
        var: ENV_JOBS,
        value: jobs.clone(),
        reason: e.to_string(),
      })?;
    }
    if let Ok(key) = std::env::var(ENV_SCRIPT_KEY)
      && !key.is_empty()
    {
      self.script_key = Some(ScriptKey::new(key));
    }
    if let Ok(timeout) = std::env::var(ENV_TIMEOUT) {
      self.timeout = Some(parse_timeout(&timeout)?);
    }
    Ok(())
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.jobs == 0 {
      return Err(ConfigError::ZeroJobs);
    }
    for (i, entry) in self.secondary_platforms.iter().enumerate() {
      if self.secondary_platforms[..i].iter().any(|s| s.tag == entry.tag) {
        return Err(ConfigError::DuplicateTag(entry.tag.clone()));
      }
    }
    Ok(())
  }
}

/// Parse a human duration such as `90s` or `1h 30m`.
pub fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
  humantime::parse_duration(value.trim()).map_err(|source| ConfigError::InvalidTimeout {
    value: value.to_string(),
    source,
  })
}
