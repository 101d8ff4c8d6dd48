//! Production cache clear check

use crate::core::error::{VersioningError, VersioningResult};
use crate::core::shell::{CommandRunner, OutputMode, ShellCommand, run_checked};
use std::fs;
use std::path::Path;

/// Clears the production cache without debug mode
pub const CACHE_CLEAR_COMMAND: &str = "bin/console cache:clear --env=prod --no-debug";

/// Production cache directory, relative to the project directory
pub const CACHE_DIR: &str = "var/cache/prod";

/// The cache clear command, run in the production environment
pub fn cache_clear_command() -> ShellCommand {
  ShellCommand::fixed(CACHE_CLEAR_COMMAND).env("APP_ENV", "prod")
}

/// Result of a successful check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheCheckReport {
  pub output: String,
  /// Whether the cache directory was deleted afterwards
  pub cleaned_up: bool,
}

/// Run the cache clear command; delete the cache directory afterwards if asked
///
/// The directory is only touched after the command succeeded. A failing
/// command returns a `Subprocess` error carrying its captured output.
pub fn check_production_cache_clear<R: CommandRunner + ?Sized>(
  runner: &mut R,
  project_dir: &Path,
  cleanup: bool,
) -> VersioningResult<CacheCheckReport> {
  let result = run_checked(runner, "Production cache clear", &cache_clear_command(), OutputMode::Capture)?;

  let cache_dir = project_dir.join(CACHE_DIR);
  let cleaned_up = cleanup && cache_dir.is_dir();
  if cleaned_up {
    tracing::debug!(dir = %cache_dir.display(), "removing production cache directory");
    // remove_dir_all does not follow symlinks inside the tree.
    fs::remove_dir_all(&cache_dir).map_err(|e| VersioningError::io(&cache_dir, e))?;
  }

  Ok(CacheCheckReport {
    output: result.output,
    cleaned_up,
  })
}
