pub mod arch;

use std::fmt;

use serde::{Deserialize, Serialize};

use arch::Arch;

/// Platforms a build job can target.
///
/// Several platforms may share one build tool token (both UWP variants are
/// built with `platform=uwp`); they differ in the architecture they build for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
  Windows,
  UwpX64,
  UwpArm64,
  LinuxBsd,
}

impl Platform {
  /// Returns the stable identifier used in configuration and reports
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Windows => "windows",
      Self::UwpX64 => "uwp-x64",
      Self::UwpArm64 => "uwp-arm64",
      Self::LinuxBsd => "linux-bsd",
    }
  }

  /// Returns the value the build tool expects after `platform=`
  pub fn tool_name(&self) -> &'static str {
    match self {
      Self::Windows => "windows",
      Self::UwpX64 | Self::UwpArm64 => "uwp",
      Self::LinuxBsd => "linuxbsd",
    }
  }

  /// Returns the `platform=` flag passed to the build tool
  pub fn tool_flag(&self) -> String {
    format!("platform={}", self.tool_name())
  }

  /// Architecture built when this platform is selected as a secondary platform
  pub fn native_arch(&self) -> Arch {
    match self {
      Self::UwpArm64 => Arch::Arm64,
      Self::Windows | Self::UwpX64 | Self::LinuxBsd => Arch::X86_64,
    }
  }

  /// File extension of binaries produced for this platform
  pub fn binary_extension(&self) -> &'static str {
    match self {
      Self::Windows | Self::UwpX64 | Self::UwpArm64 => ".exe",
      Self::LinuxBsd => "",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
