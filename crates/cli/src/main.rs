mod cmd;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cmd::{RunOptions, cmd_run};
use crate::output::OutputFormat;

/// txbuild - build, clean and export engine binaries for every supported target
///
/// Positional tokens are matched case-insensitively; a token that is not
/// recognized in its position is ignored.
#[derive(Parser)]
#[command(name = "txbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// build or clean
  action: Option<String>,

  /// release, debug, tools (or editor), all; omit to select everything
  target: Option<String>,

  /// Architecture: 32 or 64
  arch: Option<String>,

  /// Secondary platform tag, e.g. uwp or uwp_arm
  variant: Option<String>,

  /// Extra tokens, ignored
  #[arg(hide = true)]
  extra: Vec<String>,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,

  /// Project root (defaults to the current directory)
  #[arg(long)]
  root: Option<PathBuf>,

  /// Show the jobs and tool command lines without running anything
  #[arg(long)]
  dry_run: bool,

  /// Output format for the report
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Kill the build tool if a single job runs longer than this (e.g. 45m)
  #[arg(long, value_parser = humantime::parse_duration)]
  timeout: Option<Duration>,

  /// Exit with status 1 when any job failed
  #[arg(long)]
  fail_on_error: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if !cli.extra.is_empty() {
    tracing::debug!(extra = ?cli.extra, "ignoring extra tokens");
  }

  let root = match cli.root {
    Some(root) => root,
    None => std::env::current_dir().context("Failed to determine current directory")?,
  };
  let root = dunce::canonicalize(&root).with_context(|| format!("Project root not found: {}", root.display()))?;

  let tokens: Vec<&str> = [&cli.action, &cli.target, &cli.arch, &cli.variant]
    .into_iter()
    .map(|token| token.as_deref().unwrap_or(""))
    .collect();

  let options = RunOptions {
    root,
    dry_run: cli.dry_run,
    output: cli.output,
    timeout: cli.timeout,
  };

  let all_succeeded = cmd_run(&tokens, &options)?;
  if !all_succeeded && cli.fail_on_error {
    std::process::exit(1);
  }

  Ok(())
}
