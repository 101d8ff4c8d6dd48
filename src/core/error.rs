//! Error types for svc-versioning with contextual messages and exit codes
//!
//! Every failure the release pipeline can hit is one variant of
//! [`VersioningError`]. Validation failures (format, range, injection) are
//! raised before the affected stage has any side effect; subprocess failures
//! carry the captured output so the operator can see what the tool printed.

use crate::release::Stage;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for svc-versioning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, malformed version file)
  User = 1,
  /// System error (subprocess, I/O)
  System = 2,
  /// Validation failure (unsafe command, broken error-tracker document)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Which kind of configured input failed the shell-metacharacter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
  Command,
  FilePath,
}

impl fmt::Display for InputKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InputKind::Command => write!(f, "Command"),
      InputKind::FilePath => write!(f, "File path"),
    }
  }
}

/// Main error type for svc-versioning
#[derive(Debug)]
pub enum VersioningError {
  /// Version string does not match `major.minor.patch`
  Format { input: String },

  /// A version component is negative
  Range { major: i64, minor: i64, patch: i64 },

  /// Incrementing a component would exceed its numeric limit
  Overflow { version: String, component: &'static str },

  /// A required file could not be read or written
  Io { path: PathBuf, source: io::Error },

  /// A configured command or path contains a shell metacharacter
  Injection {
    kind: InputKind,
    value: String,
    found: char,
  },

  /// An external command could not be started or exited non-zero
  Subprocess {
    step: String,
    command: String,
    status: Option<i32>,
    output: String,
  },

  /// The error-tracker configuration document is missing or malformed
  ConfigDocument { path: PathBuf, message: String },

  /// Tool configuration errors
  Config(ConfigError),

  /// Failure of one pipeline stage
  Stage { stage: Stage, source: Box<VersioningError> },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl VersioningError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    VersioningError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    VersioningError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// I/O failure on a specific file
  pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    VersioningError::Io {
      path: path.into(),
      source,
    }
  }

  /// Tag this error with the pipeline stage it happened in
  pub fn in_stage(self, stage: Stage) -> Self {
    match self {
      VersioningError::Stage { .. } => self,
      other => VersioningError::Stage {
        stage,
        source: Box::new(other),
      },
    }
  }

  /// Stage this error was raised in, if any
  pub fn stage(&self) -> Option<Stage> {
    match self {
      VersioningError::Stage { stage, .. } => Some(*stage),
      _ => None,
    }
  }

  /// Innermost error, with any stage tag removed
  pub fn root(&self) -> &VersioningError {
    match self {
      VersioningError::Stage { source, .. } => source.root(),
      other => other,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      VersioningError::Message { message, context, help } => VersioningError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self.root() {
      VersioningError::Format { .. } | VersioningError::Range { .. } | VersioningError::Overflow { .. } => {
        ExitCode::User
      }
      VersioningError::Io { .. } => ExitCode::System,
      VersioningError::Injection { .. } => ExitCode::Validation,
      VersioningError::Subprocess { .. } => ExitCode::System,
      VersioningError::ConfigDocument { .. } => ExitCode::Validation,
      VersioningError::Config(_) => ExitCode::User,
      VersioningError::Stage { .. } | VersioningError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self.root() {
      VersioningError::Format { .. } | VersioningError::Overflow { .. } => {
        Some("Fix the .version file by hand, or start over with `svc-versioning new --init`.".to_string())
      }
      VersioningError::Injection { kind, .. } => Some(format!(
        "{} values in versioning.toml must not contain any of ; & | ` $ ( ) < >. Wrap complex logic in a script and configure the script path instead.",
        kind
      )),
      VersioningError::ConfigDocument { path, .. } => Some(format!(
        "Check that {} is valid YAML, or set create_sentry_release = false.",
        path.display()
      )),
      VersioningError::Config(e) => e.help_message(),
      VersioningError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for VersioningError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersioningError::Format { input } => write!(
        f,
        "Invalid version format: '{}'. Expected format: 'major.minor.patch' (e.g., '1.2.3')",
        input
      ),
      VersioningError::Range { major, minor, patch } => write!(
        f,
        "Version numbers must be non-negative (got {}.{}.{})",
        major, minor, patch
      ),
      VersioningError::Overflow { version, component } => write!(
        f,
        "Cannot increase the {} version of {}: the number is already at its maximum",
        component, version
      ),
      VersioningError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
      VersioningError::Injection { kind, value, found } => write!(
        f,
        "{} contains potentially unsafe characters ('{}'): {}",
        kind, found, value
      ),
      VersioningError::Subprocess {
        step,
        command,
        status,
        output,
      } => {
        match status {
          Some(code) => write!(f, "{} failed (exit code {}): {}", step, code, command)?,
          None => write!(f, "{} failed: {}", step, command)?,
        }
        let output = output.trim();
        if !output.is_empty() {
          write!(f, "\n{}", output)?;
        }
        Ok(())
      }
      VersioningError::ConfigDocument { path, message } => {
        write!(f, "Cannot update error-tracker configuration {}: {}", path.display(), message)
      }
      VersioningError::Config(e) => write!(f, "{}", e),
      VersioningError::Stage { stage, source } => write!(f, "[{}] {}", stage, source),
      VersioningError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for VersioningError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      VersioningError::Io { source, .. } => Some(source),
      VersioningError::Stage { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for VersioningError {
  fn from(err: io::Error) -> Self {
    VersioningError::Message {
      message: format!("I/O error: {}", err),
      context: None,
      help: None,
    }
  }
}

impl From<serde_json::Error> for VersioningError {
  fn from(err: serde_json::Error) -> Self {
    VersioningError::message(format!("JSON error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicitly requested config file does not exist
  NotFound { path: PathBuf },

  /// Config file exists but is not valid
  Invalid { path: PathBuf, message: String },

  /// Refusing to overwrite an existing config file
  AlreadyExists { path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Run `svc-versioning init-config` to create a configuration file.".to_string())
      }
      ConfigError::AlreadyExists { path } => Some(format!("Edit {} directly instead.", path.display())),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Configuration file not found: {}", path.display()),
      ConfigError::Invalid { path, message } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), message)
      }
      ConfigError::AlreadyExists { path } => {
        write!(f, "Configuration file already exists: {}", path.display())
      }
    }
  }
}

/// Result type alias for svc-versioning
pub type VersioningResult<T> = Result<T, VersioningError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> VersioningResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> VersioningResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<VersioningError>,
{
  fn context(self, ctx: impl Into<String>) -> VersioningResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> VersioningResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &VersioningError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
