use crate::core::config::VersioningConfig;
use crate::core::error::VersioningResult;
use std::path::Path;

/// Write a starter versioning.toml into the project directory
pub fn run_init_config(project_dir: &Path) -> VersioningResult<()> {
  let path = VersioningConfig::write_template(project_dir)?;

  println!("✅ Created {}", path.display());
  println!();
  println!("Git and deploy are disabled in the starter file.");
  println!("Next steps:");
  println!("  1. Review {} and enable the stages you need", path.display());
  println!("  2. Preview a release: svc-versioning new --dry-run");

  Ok(())
}
