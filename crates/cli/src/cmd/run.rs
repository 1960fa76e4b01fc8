//! Implementation of the `txbuild <action> [target] [arch] [variant]` command.
//!
//! Parses the positional tokens, looks up the matching jobs and runs them one
//! after another, exporting finished binaries under their release names.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use txbuild_lib::args::{Action, parse_args};
use txbuild_lib::config::Config;
use txbuild_lib::consts::APP_NAME;
use txbuild_lib::dispatch::{plan_jobs, usage};
use txbuild_lib::execute::{BatchReport, JobOutcome, JobStatus, run_batch};
use txbuild_lib::job::BuildJob;
use txbuild_lib::tool::ShellTool;

use crate::output::{
  OutputFormat, format_duration, print_error, print_info, print_json, print_stat, print_success, print_warning,
  symbols,
};

pub struct RunOptions {
  pub root: PathBuf,
  pub dry_run: bool,
  pub output: OutputFormat,
  pub timeout: Option<Duration>,
}

/// Execute the dispatcher.
///
/// Returns whether every job succeeded. An unrecognized command prints the
/// usage help and counts as success.
pub fn cmd_run(tokens: &[&str], options: &RunOptions) -> Result<bool> {
  let config = Config::load(&options.root)
    .with_context(|| format!("Failed to load configuration for {}", options.root.display()))?;

  let json = options.output.is_json();
  if !json {
    print_banner(&config.editor_name);
  }

  let args = parse_args(tokens);
  let (Some(action), Some(jobs)) = (args.action, plan_jobs(&args, &config)) else {
    let help = usage(APP_NAME, &config);
    if json {
      print_json(&serde_json::json!({ "usage": help }))?;
    } else {
      print!("{}", help);
    }
    return Ok(true);
  };

  let tool = ShellTool::from_config(&config)
    .with_timeout(options.timeout.or(config.timeout))
    .with_stdout_to_stderr(json);

  if options.dry_run {
    print_plan(action, &jobs, &config, &tool, json)?;
    return Ok(true);
  }

  if !json {
    match action {
      Action::Build => print_info(&format!("Building {} job(s), exporting to {}", jobs.len(), config.export_dir.display())),
      Action::Clean => print_info(&format!("Cleaning {} job(s)", jobs.len())),
    }
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(run_batch(action, jobs, &config, &tool, |outcome| {
      if !json {
        print_outcome(outcome);
      }
    }))
    .context("Failed to prepare the build batch")?;

  if json {
    print_json(&report)?;
  } else {
    print_summary(&report);
  }

  if report.was_interrupted() {
    anyhow::bail!("Interrupted");
  }
  Ok(report.is_success())
}

fn print_banner(product: &str) {
  let title = format!("{} build script", product);
  let rule = format!(" +{}+", "-".repeat(title.len() + 12));
  println!();
  println!("{}", rule);
  println!(" |      {}      |", title);
  println!("{}", rule);
  println!();
}

fn print_plan(action: Action, jobs: &[BuildJob], config: &Config, tool: &ShellTool, json: bool) -> Result<()> {
  if json {
    let items: Vec<_> = jobs
      .iter()
      .map(|job| {
        let artifact = job.artifact(&config.editor_name, &config.export_dir);
        serde_json::json!({
          "job": job,
          "command": tool.command_line(&job.tool_flags(config.jobs)),
          "release_override": job.flavor().needs_release_override(),
          "artifact": artifact,
        })
      })
      .collect();
    return print_json(&serde_json::json!({ "action": action, "dry_run": true, "jobs": items }));
  }

  print_info(&format!("Dry run - {} job(s) would run:", jobs.len()));
  for job in jobs {
    println!();
    println!("  {}", job.to_string().if_supports_color(Stream::Stdout, |s| s.bold()));
    print_stat("Command", &tool.command_line(&job.tool_flags(config.jobs)));
    if job.flavor().needs_release_override() {
      print_stat("Override", &config.override_target.display().to_string());
    }
    if let Some(artifact) = job.artifact(&config.editor_name, &config.export_dir) {
      print_stat(
        "Export",
        &format!(
          "{} {} {}",
          artifact.source_path(&config.bin_dir).display(),
          symbols::ARROW,
          artifact.target_path().display()
        ),
      );
    }
  }
  Ok(())
}

fn print_outcome(outcome: &JobOutcome) {
  let took = format_duration(outcome.duration);
  let label = outcome.job.label();
  match &outcome.status {
    JobStatus::Exported { artifact } => {
      print_success(&format!("{} {} {} ({})", label, symbols::ARROW, artifact.display(), took))
    }
    JobStatus::Cleaned => print_success(&format!("{} cleaned ({})", label, took)),
    JobStatus::NoArtifact => print_info(&format!("{} finished, nothing to export ({})", label, took)),
    JobStatus::Failed { error } => print_error(&format!("{} failed: {} ({})", label, error, took)),
    JobStatus::Interrupted => print_warning(&format!("{} interrupted ({})", label, took)),
  }
}

fn print_summary(report: &BatchReport) {
  println!();
  if report.stale_override_removed {
    print_warning("Removed a release override left behind by an earlier run");
  }
  if report.was_interrupted() {
    print_warning("Interrupted, remaining jobs were skipped");
  }
  if report.is_success() {
    print_success(&format!("{} complete!", capitalize(report.action.as_str())));
  } else {
    print_error(&format!("{} job(s) failed", report.failed_count()));
  }
  print_stat("Jobs", &report.outcomes.len().to_string());
  if report.action == Action::Build {
    print_stat("Exported", &report.exported_count().to_string());
  }
  print_stat("Failed", &report.failed_count().to_string());
  print_stat("Duration", &format_duration(report.total_duration()));
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
