//! Build job descriptors and the artifact names derived from them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::platform::Platform;
use crate::platform::arch::Arch;

/// Flag appended to a tool invocation to tear down previous outputs.
pub const CLEAN_FLAG: &str = "-c";

/// The kind of binary a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
  Editor,
  TemplateRelease,
  TemplateDebug,
}

impl Flavor {
  /// Returns the tool's name for this flavor
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Editor => "editor",
      Self::TemplateRelease => "template_release",
      Self::TemplateDebug => "template_debug",
    }
  }

  /// Returns the `target=` flag passed to the build tool
  pub fn tool_flag(&self) -> String {
    format!("target={}", self.as_str())
  }

  /// Whether jobs of this flavor run with the release override in place.
  pub fn needs_release_override(&self) -> bool {
    matches!(self, Self::TemplateRelease)
  }
}

impl fmt::Display for Flavor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// One invocation of the external build tool.
///
/// Fields are private; a job is built once by the dispatcher and handed by
/// value to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildJob {
  platform: Platform,
  flavor: Flavor,
  arch: Arch,
  extra_flags: Vec<String>,
  clean: bool,
}

impl BuildJob {
  pub fn new(platform: Platform, flavor: Flavor, arch: Arch) -> Self {
    Self {
      platform,
      flavor,
      arch,
      extra_flags: Vec::new(),
      clean: false,
    }
  }

  pub fn with_extra_flags(mut self, flags: Vec<String>) -> Self {
    self.extra_flags = flags;
    self
  }

  pub fn with_clean(mut self, clean: bool) -> Self {
    self.clean = clean;
    self
  }

  pub fn platform(&self) -> Platform {
    self.platform
  }

  pub fn flavor(&self) -> Flavor {
    self.flavor
  }

  pub fn arch(&self) -> Arch {
    self.arch
  }

  pub fn extra_flags(&self) -> &[String] {
    &self.extra_flags
  }

  pub fn is_clean(&self) -> bool {
    self.clean
  }

  /// Short human label, e.g. `windows template_release x86_64`.
  pub fn label(&self) -> String {
    format!("{} {} {}", self.platform, self.flavor, self.arch)
  }

  /// Flags for the tool, in order: platform, parallelism, flavor, arch,
  /// extra flags, and the clean flag last.
  pub fn tool_flags(&self, jobs: u32) -> Vec<String> {
    let mut flags = vec![
      self.platform.tool_flag(),
      format!("-j{}", jobs),
      self.flavor.tool_flag(),
      self.arch.tool_flag(),
    ];
    flags.extend(self.extra_flags.iter().cloned());
    if self.clean {
      flags.push(CLEAN_FLAG.to_string());
    }
    flags
  }

  /// Filename the build tool writes into its output folder.
  pub fn source_filename(&self) -> String {
    format!(
      "godot.{}.{}.{}{}",
      self.platform.tool_name(),
      self.flavor,
      self.arch,
      self.platform.binary_extension()
    )
  }

  /// Stable operator-facing filename in the export directory.
  pub fn target_filename(&self, editor_name: &str) -> String {
    let ext = self.platform.binary_extension();
    match self.flavor {
      Flavor::Editor => format!("{}{}", editor_name, ext),
      Flavor::TemplateRelease => format!("{}_release_{}{}", self.platform.tool_name(), self.arch, ext),
      Flavor::TemplateDebug => format!("{}_debug_{}{}", self.platform.tool_name(), self.arch, ext),
    }
  }

  /// Artifact placement for this job, or `None` for clean jobs.
  pub fn artifact(&self, editor_name: &str, export_dir: &Path) -> Option<ArtifactMapping> {
    if self.clean {
      return None;
    }
    Some(ArtifactMapping {
      source_filename: self.source_filename(),
      target_filename: self.target_filename(editor_name),
      export_dir: export_dir.to_path_buf(),
    })
  }
}

impl fmt::Display for BuildJob {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.label())?;
    if self.clean {
      write!(f, " (clean)")?;
    }
    Ok(())
  }
}

/// Where a finished build's binary gets copied, and under which name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMapping {
  pub source_filename: String,
  pub target_filename: String,
  pub export_dir: PathBuf,
}

impl ArtifactMapping {
  pub fn source_path(&self, bin_dir: &Path) -> PathBuf {
    bin_dir.join(&self.source_filename)
  }

  pub fn target_path(&self) -> PathBuf {
    self.export_dir.join(&self.target_filename)
  }
}
