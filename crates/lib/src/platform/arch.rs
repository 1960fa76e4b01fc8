use std::fmt;

use serde::{Deserialize, Serialize};

/// CPU architectures the external build tool can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
  X86_32,
  X86_64,
  Arm64,
}

impl Arch {
  /// Parse an architecture token from the command line.
  ///
  /// Accepts the bitness shorthand (`32`, `64`) as well as the tool's own
  /// identifiers. Returns `None` for anything else.
  pub fn from_token(token: &str) -> Option<Self> {
    match token {
      "32" | "x86_32" => Some(Self::X86_32),
      "64" | "x86_64" => Some(Self::X86_64),
      _ => None,
    }
  }

  /// Returns the identifier the build tool uses for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_32 => "x86_32",
      Self::X86_64 => "x86_64",
      Self::Arm64 => "arm64",
    }
  }

  /// Returns the `arch=` flag passed to the build tool
  pub fn tool_flag(&self) -> String {
    format!("arch={}", self.as_str())
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
