//! Maps a parsed command onto the ordered list of build jobs to run.
//!
//! The mapping is a fixed table. `None` from [`plan_jobs`] means the command
//! matched no row and only the usage help should be shown.

use crate::args::{Action, ParsedArgs, Target};
use crate::config::Config;
use crate::job::{BuildJob, Flavor};
use crate::platform::Platform;
use crate::platform::arch::Arch;

/// Platform built when no secondary-platform tag selects another one.
pub const PRIMARY_PLATFORM: Platform = Platform::Windows;

/// A row of the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
  /// The whole matrix.
  All,
  /// One job on the primary platform.
  Primary(Flavor, Arch),
  /// One job on a registered secondary platform.
  Secondary(Flavor, Platform),
}

fn select_row(args: &ParsedArgs, config: &Config) -> Option<Row> {
  let secondary = args
    .variant
    .as_deref()
    .and_then(|tag| config.secondary(tag))
    .map(|s| s.platform);

  let row = match (args.target, args.arch, secondary) {
    (Target::All, None, _) => Row::All,
    (Target::Release, Some(Arch::X86_64), Some(platform)) => Row::Secondary(Flavor::TemplateRelease, platform),
    (Target::Debug, Some(Arch::X86_64), Some(platform)) => Row::Secondary(Flavor::TemplateDebug, platform),
    (Target::Release, Some(arch @ (Arch::X86_64 | Arch::X86_32)), _) => Row::Primary(Flavor::TemplateRelease, arch),
    (Target::Debug, Some(arch @ (Arch::X86_64 | Arch::X86_32)), _) => Row::Primary(Flavor::TemplateDebug, arch),
    (Target::Editor, None | Some(Arch::X86_64), _) => Row::Primary(Flavor::Editor, Arch::X86_64),
    _ => return None,
  };
  Some(row)
}

/// Produce the jobs for a command, in execution order.
///
/// Returns `None` when there is no action or no table row matches.
pub fn plan_jobs(args: &ParsedArgs, config: &Config) -> Option<Vec<BuildJob>> {
  let action = args.action?;
  let row = select_row(args, config)?;

  let make = |platform: Platform, flavor: Flavor, arch: Arch| {
    BuildJob::new(platform, flavor, arch)
      .with_extra_flags(config.extra_flags.clone())
      .with_clean(action == Action::Clean)
  };

  let jobs = match row {
    Row::Primary(flavor, arch) => vec![make(PRIMARY_PLATFORM, flavor, arch)],
    Row::Secondary(flavor, platform) => vec![make(platform, flavor, platform.native_arch())],
    Row::All => {
      let mut jobs = vec![
        make(PRIMARY_PLATFORM, Flavor::Editor, Arch::X86_64),
        make(PRIMARY_PLATFORM, Flavor::TemplateRelease, Arch::X86_64),
        make(PRIMARY_PLATFORM, Flavor::TemplateRelease, Arch::X86_32),
        make(PRIMARY_PLATFORM, Flavor::TemplateDebug, Arch::X86_64),
        make(PRIMARY_PLATFORM, Flavor::TemplateDebug, Arch::X86_32),
      ];
      for flavor in [Flavor::TemplateRelease, Flavor::TemplateDebug] {
        jobs.extend(
          config
            .secondary_platforms
            .iter()
            .map(|s| make(s.platform, flavor, s.platform.native_arch())),
        );
      }
      jobs
    }
  };

  Some(jobs)
}

/// Usage help listing every accepted command.
pub fn usage(program: &str, config: &Config) -> String {
  let mut rows: Vec<(String, String)> = Vec::new();
  for action in [Action::Build, Action::Clean] {
    let cmd = action.as_str();
    rows.push((format!("To {} ALL:", cmd), cmd.to_string()));
    for (target, arch) in [("release", "64"), ("release", "32"), ("debug", "64"), ("debug", "32")] {
      rows.push((
        format!("To {} {} {}:", cmd, target.to_uppercase(), arch),
        format!("{} {} {}", cmd, target, arch),
      ));
    }
    rows.push((format!("To {} EDITOR:", cmd), format!("{} tools 64", cmd)));
    for secondary in &config.secondary_platforms {
      for target in ["release", "debug"] {
        rows.push((
          format!("To {} {} ({}):", cmd, target.to_uppercase(), secondary.platform),
          format!("{} {} 64 {}", cmd, target, secondary.tag),
        ));
      }
    }
  }

  let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
  let mut out = format!("{} - Usage:\n", program);
  for (label, cmd) in rows {
    out.push_str(&format!("  {:<width$}  $ {} {}\n", label, program, cmd, width = width));
  }
  out
}
