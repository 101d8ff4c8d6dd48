//! CLI commands for svc-versioning
//!
//! - **new**: run the release pipeline (or show its plan with `--dry-run`)
//! - **current**: print the current version
//! - **init-config**: write a starter versioning.toml

pub mod current;
pub mod init_config;
pub mod new;

pub use current::run_current;
pub use init_config::run_init_config;
pub use new::{NewOptions, run_new};

use crate::core::config::VersioningConfig;
use crate::core::error::VersioningResult;
use std::path::Path;

/// Load configuration from `--config`, or search the project directory
fn load_config(project_dir: &Path, explicit: Option<&Path>) -> VersioningResult<VersioningConfig> {
  match explicit {
    Some(path) => VersioningConfig::load_file(path),
    None => VersioningConfig::load(project_dir),
  }
}
