//! External build tool invocation.
//!
//! The tool is opaque: it is run as one shell command line made of the tool
//! name followed by the job's flags, in the project root. Only its exit
//! status is inspected.
//!
//! On unix the tool gets its own process group, so a timeout or Ctrl-C
//! stops the compilers it started along with the shell.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::{Config, ScriptKey};
use crate::consts::TOOL_SCRIPT_KEY_VAR;
use crate::job::BuildJob;

#[derive(Debug, Error)]
pub enum ToolError {
  #[error("failed to start `{command}`: {source}")]
  Spawn { command: String, source: io::Error },

  #[error("failed waiting for `{command}`: {source}")]
  Wait { command: String, source: io::Error },

  #[error("`{command}` exited with code {code:?}")]
  Failed { command: String, code: Option<i32> },

  #[error("`{command}` timed out after {}", humantime::format_duration(*timeout))]
  TimedOut { command: String, timeout: Duration },

  #[error("`{command}` was interrupted")]
  Interrupted { command: String },
}

/// Something that can carry out a build job.
///
/// The executor only needs to know whether the run succeeded; artifacts are
/// discovered on disk afterwards.
#[allow(async_fn_in_trait)]
pub trait BuildTool {
  async fn run(&self, job: &BuildJob, flags: &[String]) -> Result<(), ToolError>;
}

/// Runs the configured tool through the platform shell.
#[derive(Debug, Clone)]
pub struct ShellTool {
  program: String,
  root: PathBuf,
  script_key: Option<ScriptKey>,
  timeout: Option<Duration>,
  stdout_to_stderr: bool,
}

impl ShellTool {
  pub fn new(program: impl Into<String>, root: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      root: root.into(),
      script_key: None,
      timeout: None,
      stdout_to_stderr: false,
    }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(config.tool.clone(), config.root.clone())
      .with_script_key(config.script_key.clone())
      .with_timeout(config.timeout)
  }

  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_script_key(mut self, key: Option<ScriptKey>) -> Self {
    self.script_key = key;
    self
  }

  /// Send the tool's stdout to our stderr, keeping stdout free for a report.
  pub fn with_stdout_to_stderr(mut self, redirect: bool) -> Self {
    self.stdout_to_stderr = redirect;
    self
  }

  /// The exact command line handed to the shell.
  pub fn command_line(&self, flags: &[String]) -> String {
    if flags.is_empty() {
      return self.program.clone();
    }
    format!("{} {}", self.program, flags.join(" "))
  }

  async fn wait(&self, command_line: &str, mut child: Child) -> Result<ExitStatus, ToolError> {
    let deadline = async {
      match self.timeout {
        Some(limit) => {
          tokio::time::sleep(limit).await;
          limit
        }
        None => std::future::pending().await,
      }
    };

    let stopped = tokio::select! {
      waited = child.wait() => {
        return waited.map_err(|source| ToolError::Wait {
          command: command_line.to_string(),
          source,
        });
      }
      limit = deadline => ToolError::TimedOut {
        command: command_line.to_string(),
        timeout: limit,
      },
      Ok(()) = tokio::signal::ctrl_c() => ToolError::Interrupted {
        command: command_line.to_string(),
      },
    };

    warn!(cmd = %command_line, "stopping build tool");
    kill_tool(&mut child).await;
    Err(stopped)
  }
}

impl BuildTool for ShellTool {
  async fn run(&self, job: &BuildJob, flags: &[String]) -> Result<(), ToolError> {
    let command_line = self.command_line(flags);
    info!(job = %job, cmd = %command_line, "invoking build tool");

    let (shell, shell_args) = get_shell();
    let mut command = Command::new(shell);
    command
      .args(shell_args)
      .arg(&command_line)
      .current_dir(&self.root)
      .kill_on_drop(true);

    #[cfg(unix)]
    command.process_group(0);

    if self.stdout_to_stderr {
      command.stdout(Stdio::from(io::stderr()));
    }

    if let Some(key) = &self.script_key {
      command.env(TOOL_SCRIPT_KEY_VAR, key.expose());
    }

    let child = command.spawn().map_err(|source| ToolError::Spawn {
      command: command_line.clone(),
      source,
    })?;

    let status = self.wait(&command_line, child).await?;
    debug!(status = %status, "build tool finished");

    if !status.success() {
      return Err(ToolError::Failed {
        command: command_line,
        code: status.code(),
      });
    }
    Ok(())
  }
}

/// Kill the tool and every process it started, then reap it.
async fn kill_tool(child: &mut Child) {
  kill_group(child);
  if let Err(err) = child.kill().await {
    debug!(error = %err, "failed to kill build tool");
  }
}

#[cfg(unix)]
fn kill_group(child: &Child) {
  use rustix::process::{Pid, Signal, kill_process_group};

  let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()).and_then(Pid::from_raw) else {
    return;
  };
  if let Err(err) = kill_process_group(pid, Signal::KILL) {
    debug!(error = %err, "failed to kill build tool process group");
  }
}

// TODO: assign the tool to a job object so its children die with it on windows.
#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

/// Shell used to run the tool's command line.
#[cfg(unix)]
fn get_shell() -> (&'static str, [&'static str; 1]) {
  ("/bin/sh", ["-c"])
}

#[cfg(windows)]
fn get_shell() -> (&'static str, [&'static str; 1]) {
  ("cmd.exe", ["/C"])
}
