//! Version template and changelog entries
//!
//! Both artifacts are plain write targets: the template is replaced on every
//! release, the changelog only ever grows.

use crate::core::error::VersioningResult;
use crate::core::version::Version;
use crate::core::version_file::{VersionStore, WriteMode};
use chrono::{DateTime, Local};
use std::path::Path;

/// Snippet rendered into the version template
///
/// The zone is written as the local UTC offset (`+02:00`); the local clock
/// carries no zone name.
pub fn render_template(version: Version, now: &DateTime<Local>) -> String {
  format!(
    "<span title='Release {}'>Version: {}</span>",
    now.format("%d.%m.%Y %H:%M:%S %:z"),
    version
  )
}

/// Block appended to the changelog for one release
pub fn render_changelog_entry(version: Version, message: &str, now: &DateTime<Local>) -> String {
  format!("\n## Version {}\n*{}*\n- {}\n", version, now.to_rfc2822(), message)
}

/// Overwrite the version template
pub fn write_template(path: &Path, version: Version, now: &DateTime<Local>) -> VersioningResult<()> {
  VersionStore::write(path, &render_template(version, now), WriteMode::Overwrite)
}

/// Append a release block to the changelog
pub fn append_changelog(path: &Path, version: Version, message: &str, now: &DateTime<Local>) -> VersioningResult<()> {
  VersionStore::write(path, &render_changelog_entry(version, message, now), WriteMode::Append)
}
