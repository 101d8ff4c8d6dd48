use crate::core::error::VersioningResult;
use crate::core::version_file::VersionStore;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct CurrentVersion {
  version: String,
  file: PathBuf,
}

/// Print the current version; creates `.version` with 0.0.1 on first use
pub fn run_current(project_dir: &Path, json: bool) -> VersioningResult<()> {
  let store = VersionStore::new(project_dir);
  let version = store.current()?;

  if json {
    let current = CurrentVersion {
      version: version.to_string(),
      file: store.filename(),
    };
    println!("{}", serde_json::to_string_pretty(&current)?);
  } else {
    println!("{}", version);
  }

  Ok(())
}
