//! Positional command parsing.
//!
//! The command vocabulary is `<action> [target] [arch] [variant]`. Every
//! position is inspected on its own and case-insensitively; a token that is
//! not recognized for its position is treated as absent rather than rejected,
//! so operators can keep passing whatever their habits dictate.

use serde::Serialize;

use crate::platform::arch::Arch;

/// What to do with the selected jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Build,
  Clean,
}

impl Action {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Build => "build",
      Self::Clean => "clean",
    }
  }
}

/// Which flavors to run. `All` covers both an explicit `all` and an absent target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
  #[default]
  All,
  Release,
  Debug,
  Editor,
}

/// Immutable result of scanning the command vector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedArgs {
  pub action: Option<Action>,
  pub target: Target,
  pub arch: Option<Arch>,
  /// Lowercased secondary-platform tag, if one was given.
  ///
  /// Whether the tag names a registered platform is decided at dispatch time.
  pub variant: Option<String>,
}

/// Parse the positional tokens (program name already stripped).
pub fn parse_args<S: AsRef<str>>(tokens: &[S]) -> ParsedArgs {
  let mut parsed = ParsedArgs::default();
  let mut tokens = tokens.iter().map(|t| t.as_ref().trim().to_ascii_lowercase());

  if let Some(token) = tokens.next() {
    parsed.action = match token.as_str() {
      "build" => Some(Action::Build),
      "clean" => Some(Action::Clean),
      _ => None,
    };
  }

  if let Some(token) = tokens.next() {
    parsed.target = match token.as_str() {
      "release" => Target::Release,
      "debug" => Target::Debug,
      "tools" | "editor" => Target::Editor,
      _ => Target::All,
    };
  }

  if let Some(token) = tokens.next() {
    parsed.arch = Arch::from_token(&token);
  }

  if let Some(token) = tokens.next()
    && !token.is_empty()
  {
    parsed.variant = Some(token);
  }

  parsed
}
