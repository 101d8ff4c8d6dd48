//! Tests for command and path validation

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_unsafe_pre_command_runs_nothing() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config("run_git = false\nrun_deploy = false\npre_command = \"touch a; touch b\"\n")?;

  let stderr = run_versioning_failing(&project.path, &["new"], 3)?;

  assert!(stderr.contains("[pre command] Command contains potentially unsafe characters (';')"));
  assert!(!project.file_exists("a"));
  assert!(!project.file_exists("b"));
  assert!(!project.file_exists(".version"));

  Ok(())
}

#[test]
fn test_unsafe_deploy_command_is_caught_before_any_stage() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config("run_git = false\nrun_deploy = false\ndeploy_command = \"./deploy.sh $(whoami)\"\n")?;
  project.set_version("1.0.0")?;

  let stderr = run_versioning_failing(&project.path, &["new"], 3)?;

  assert!(stderr.contains("[deploy]"));
  assert_eq!(project.version()?, "1.0.0");
  assert!(!project.file_exists("CHANGELOG.md"));

  Ok(())
}

#[test]
fn test_unsafe_playbook_path_is_rejected() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config(
    "run_git = false\nrun_deploy = false\nansible_deploy = true\nansible_playbook = \"deploy.yml`id`\"\n",
  )?;

  let stderr = run_versioning_failing(&project.path, &["new"], 3)?;

  assert!(stderr.contains("File path contains potentially unsafe characters ('`')"));
  assert!(!project.file_exists(".version"));

  Ok(())
}

#[test]
fn test_missing_playbook_aborts_before_anything_runs() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config(
    "run_git = true\nrun_deploy = false\npre_command = \"touch pre-command-ran\"\nansible_deploy = true\n",
  )?;

  let stderr = run_versioning_failing(&project.path, &["new"], 1)?;

  assert!(stderr.contains("no playbook defined"));
  assert!(stderr.contains("Help:"));
  assert!(!project.file_exists("pre-command-ran"));
  assert!(!project.file_exists(".version"));

  Ok(())
}

#[test]
fn test_commit_message_is_quoted_not_rejected() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config("run_git = true\nrun_deploy = false\n")?;

  let output = run_versioning(&project.path, &["new", "--dry-run", "Fix $PATH; see `docs`"])?;
  let out = stdout(&output);

  assert!(out.contains("$ git commit -S -m 'Fix $PATH; see `docs`'"));
  assert!(out.contains("$ git tag -a -s v0.0.2 -m 'Fix $PATH; see `docs`'"));

  Ok(())
}
