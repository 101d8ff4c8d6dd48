//! Shell-metacharacter deny-list for configured commands and paths
//!
//! Commands and file paths read from versioning.toml end up inside a shell
//! line. Before that happens they are checked against a fixed set of
//! characters that chain, substitute or redirect commands. This is a
//! best-effort guard, not a sandbox.
//!
//! Free-text prose (commit and tag messages) is never passed through here;
//! it is quoted instead, see [`crate::core::shell::ShellCommand::arg`].

use crate::core::error::{InputKind, VersioningError, VersioningResult};

/// Characters rejected in configured commands and paths
///
/// Newlines are included because `sh -c` treats them as command separators.
pub const DENIED_CHARS: &[char] = &[';', '&', '|', '`', '$', '(', ')', '<', '>', '\n', '\r'];

/// First denied character in `text`, if any
pub fn find_unsafe_char(text: &str) -> Option<char> {
  text.chars().find(|c| DENIED_CHARS.contains(c))
}

/// Validate a free-form command (pre command, deploy command)
pub fn validate_command(command: &str) -> VersioningResult<()> {
  validate(command, InputKind::Command)
}

/// Validate a file path handed to an external tool (inventory, playbook)
pub fn validate_file_path(path: &str) -> VersioningResult<()> {
  validate(path, InputKind::FilePath)
}

fn validate(value: &str, kind: InputKind) -> VersioningResult<()> {
  match find_unsafe_char(value) {
    Some(found) => {
      tracing::debug!(%kind, value, %found, "rejected unsafe input");
      Err(VersioningError::Injection {
        kind,
        value: value.to_string(),
        found,
      })
    }
    None => Ok(()),
  }
}
