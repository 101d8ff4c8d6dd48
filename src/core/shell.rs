//! Shell command construction and execution
//!
//! A [`ShellCommand`] is one line handed to a POSIX shell. It is built
//! in one of three ways, each with its own trust level:
//!
//! - [`ShellCommand::fixed`]: a literal compiled into the binary
//! - [`ShellCommand::configured`]: operator-supplied text, checked against
//!   the deny-list in [`crate::core::security`]
//! - [`ShellCommand::program`] + [`ShellCommand::arg`]: each argument is
//!   quoted for `sh`, so arbitrary prose is passed through verbatim
//!
//! Execution goes through the [`CommandRunner`] trait so the release
//! pipeline can be exercised without spawning processes.

use crate::core::error::{VersioningError, VersioningResult};
use crate::core::security;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// One shell line plus extra environment variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellCommand {
  line: String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  env: Vec<(String, String)>,
}

impl ShellCommand {
  /// A command compiled into the binary
  pub fn fixed(line: &'static str) -> Self {
    Self {
      line: line.to_string(),
      env: Vec::new(),
    }
  }

  /// Operator-configured command text, rejected if it contains a shell metacharacter
  pub fn configured(text: &str) -> VersioningResult<Self> {
    security::validate_command(text)?;
    Ok(Self {
      line: text.to_string(),
      env: Vec::new(),
    })
  }

  /// Start a command from a program name; add arguments with [`arg`](Self::arg)
  pub fn program(program: &'static str) -> Self {
    Self::fixed(program)
  }

  /// Append one quoted argument
  pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
    self.line.push(' ');
    self.line.push_str(&shell_words::quote(arg.as_ref()));
    self
  }

  /// Append several quoted arguments
  pub fn args<I, S>(self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    args.into_iter().fold(self, |cmd, arg| cmd.arg(arg))
  }

  /// Append a file path argument: deny-list checked, then quoted
  pub fn path_arg(self, path: &str) -> VersioningResult<Self> {
    security::validate_file_path(path)?;
    Ok(self.arg(path))
  }

  /// Set an environment variable for this command
  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.push((key.into(), value.into()));
    self
  }

  pub fn line(&self) -> &str {
    &self.line
  }

  pub fn envs(&self) -> &[(String, String)] {
    &self.env
  }
}

impl std::fmt::Display for ShellCommand {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (key, value) in &self.env {
      write!(f, "{}={} ", key, value)?;
    }
    write!(f, "{}", self.line)
  }
}

/// How a command's output is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
  /// Stream straight to the terminal
  Inherit,
  /// Collect stdout and stderr into [`CommandOutput::output`]
  Capture,
}

/// Exit status and (when captured) combined output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  /// Exit code; `None` if the process was killed by a signal
  pub status: Option<i32>,
  pub output: String,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.status == Some(0)
  }
}

/// Runs shell commands synchronously
pub trait CommandRunner {
  /// Run `cmd` to completion. An `Err` means the command could not be started
  /// at all; a non-zero exit is reported through [`CommandOutput::status`].
  fn run(&mut self, cmd: &ShellCommand, mode: OutputMode) -> VersioningResult<CommandOutput>;
}

/// Run a command and turn a non-zero exit into a `Subprocess` error named `step`
pub fn run_checked<R: CommandRunner + ?Sized>(
  runner: &mut R,
  step: &str,
  cmd: &ShellCommand,
  mode: OutputMode,
) -> VersioningResult<CommandOutput> {
  let result = runner.run(cmd, mode)?;
  if !result.success() {
    return Err(VersioningError::Subprocess {
      step: step.to_string(),
      command: cmd.to_string(),
      status: result.status,
      output: result.output,
    });
  }
  Ok(result)
}

/// Runner backed by `sh -c`
///
/// Arguments are quoted with POSIX rules, so `sh` is used on every platform
/// (on Windows the one shipped with Git for Windows). No timeout is applied:
/// a hung command blocks the run.
pub struct SystemShell {
  work_dir: PathBuf,
}

impl SystemShell {
  pub fn new(work_dir: &Path) -> Self {
    Self {
      work_dir: work_dir.to_path_buf(),
    }
  }

  fn shell_cmd(&self, cmd: &ShellCommand) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(cmd.line());
    command.current_dir(&self.work_dir);
    for (key, value) in cmd.envs() {
      command.env(key, value);
    }
    command
  }
}

impl CommandRunner for SystemShell {
  fn run(&mut self, cmd: &ShellCommand, mode: OutputMode) -> VersioningResult<CommandOutput> {
    tracing::debug!(command = %cmd, dir = %self.work_dir.display(), ?mode, "running shell command");

    let spawn_error = |e: std::io::Error| VersioningError::Subprocess {
      step: "Spawn".to_string(),
      command: cmd.to_string(),
      status: None,
      output: e.to_string(),
    };

    let result = match mode {
      OutputMode::Inherit => {
        let status = self.shell_cmd(cmd).stdin(Stdio::inherit()).status().map_err(spawn_error)?;
        CommandOutput {
          status: status.code(),
          output: String::new(),
        }
      }
      OutputMode::Capture => {
        let out = self.shell_cmd(cmd).stdin(Stdio::null()).output().map_err(spawn_error)?;
        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));
        CommandOutput {
          status: out.status.code(),
          output,
        }
      }
    };

    tracing::debug!(command = %cmd, status = ?result.status, "shell command finished");
    Ok(result)
  }
}
