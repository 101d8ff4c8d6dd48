//! Source-control publish: add, signed commit, push, signed tag, push tag
//!
//! Commit and tag messages are operator prose, so they are quoted rather
//! than deny-list checked.

use crate::core::error::VersioningResult;
use crate::core::shell::{CommandRunner, OutputMode, ShellCommand, run_checked};
use crate::core::version::Version;

/// Tag name for a release
pub fn tag_name(version: Version) -> String {
  format!("v{}", version)
}

/// The git commands of one publish, in order, each with its step name
pub fn publish_steps(version: Version, message: &str) -> Vec<(&'static str, ShellCommand)> {
  let tag = tag_name(version);

  vec![
    ("Git add", ShellCommand::program("git").args(["add", "."])),
    (
      "Git commit",
      ShellCommand::program("git").args(["commit", "-S", "-m"]).arg(message),
    ),
    ("Git push", ShellCommand::program("git").arg("push")),
    (
      "Git tag creation",
      ShellCommand::program("git")
        .args(["tag", "-a", "-s"])
        .arg(&tag)
        .arg("-m")
        .arg(message),
    ),
    (
      "Git push tag",
      ShellCommand::program("git").args(["push", "origin"]).arg(&tag),
    ),
  ]
}

/// Run every publish step; the first non-zero exit stops the sequence
///
/// `on_step` sees each command right before it runs.
pub fn publish<R, F>(runner: &mut R, version: Version, message: &str, mut on_step: F) -> VersioningResult<()>
where
  R: CommandRunner + ?Sized,
  F: FnMut(&ShellCommand),
{
  for (step, command) in publish_steps(version, message) {
    on_step(&command);
    run_checked(runner, step, &command, OutputMode::Capture)?;
  }
  Ok(())
}
