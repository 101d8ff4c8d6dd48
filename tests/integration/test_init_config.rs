//! Tests for the `init-config` command and config loading

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_config_writes_starter_file() -> Result<()> {
  let project = TestProject::new()?;

  run_versioning(&project.path, &["init-config"])?;

  let config = project.read_file("versioning.toml")?;
  assert!(config.contains("run_git = false"));
  assert!(config.contains("run_deploy = false"));
  assert!(config.contains("# pre_command"));

  // The starter config is immediately usable without git or deploy.
  run_versioning(&project.path, &["new", "First release"])?;
  assert_eq!(project.version()?, "0.0.2");

  Ok(())
}

#[test]
fn test_init_config_refuses_to_overwrite() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config("run_git = true\n")?;

  let stderr = run_versioning_failing(&project.path, &["init-config"], 1)?;

  assert!(stderr.contains("already exists"));
  assert_eq!(project.read_file("versioning.toml")?, "run_git = true\n");

  Ok(())
}

#[test]
fn test_init_config_sees_hidden_config() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file(".config/versioning.toml", LOCAL_ONLY_CONFIG)?;

  run_versioning_failing(&project.path, &["init-config"], 1)?;
  assert!(!project.file_exists("versioning.toml"));

  Ok(())
}

#[test]
fn test_unknown_config_key_is_rejected() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config("run_git = false\nrun_deploy = false\nrun_gti = true\n")?;

  let stderr = run_versioning_failing(&project.path, &["new"], 1)?;

  assert!(stderr.contains("versioning.toml"));
  assert!(!project.file_exists(".version"));

  Ok(())
}

#[test]
fn test_explicit_config_path() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file("ci/release.toml", LOCAL_ONLY_CONFIG)?;
  project.set_version("1.0.0")?;

  let config = project.path.join("ci/release.toml").to_string_lossy().into_owned();
  run_versioning(&project.path, &["new", "--config", &config])?;
  assert_eq!(project.version()?, "1.0.1");

  Ok(())
}

#[test]
fn test_missing_explicit_config_is_error() -> Result<()> {
  let project = TestProject::new()?;

  let stderr = run_versioning_failing(&project.path, &["new", "--config", "nope.toml"], 1)?;

  assert!(stderr.contains("nope.toml"));
  assert!(!project.file_exists(".version"));

  Ok(())
}
