//! Tests for the `new` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_patch_bump_writes_state_and_artifacts() -> Result<()> {
  let project = TestProject::local()?;
  project.set_version("1.2.3")?;

  let output = run_versioning(&project.path, &["new", "Fix checkout rounding"])?;

  assert_eq!(project.version()?, "1.2.4");
  assert!(stdout(&output).contains("1.2.4"));

  let changelog = project.read_file("CHANGELOG.md")?;
  assert!(changelog.starts_with("\n## Version 1.2.4\n*"));
  assert!(changelog.ends_with("- Fix checkout rounding\n"));

  let template = project.read_file("templates/_version.html.twig")?;
  assert!(template.starts_with("<span title='Release "));
  assert!(template.ends_with("'>Version: 1.2.4</span>"));

  Ok(())
}

#[test]
fn test_fresh_project_bumps_from_initial() -> Result<()> {
  let project = TestProject::local()?;

  run_versioning(&project.path, &["new"])?;

  assert_eq!(project.version()?, "0.0.2");
  assert!(project.read_file("CHANGELOG.md")?.contains("- Increase version to 0.0.2"));

  Ok(())
}

#[test]
fn test_bump_flags() -> Result<()> {
  let cases: &[(&[&str], &str)] = &[
    (&["--major"], "2.0.0"),
    (&["--minor"], "1.3.0"),
    (&["-m"], "1.3.0"),
    (&["-p"], "1.2.4"),
    (&["--major", "--minor", "--patch"], "2.0.0"),
    (&["--minor", "--patch"], "1.3.0"),
  ];

  for (flags, expected) in cases {
    let project = TestProject::local()?;
    project.set_version("1.2.3")?;

    let mut args = vec!["new"];
    args.extend_from_slice(flags);
    run_versioning(&project.path, &args)?;

    assert_eq!(project.version()?, *expected, "flags: {:?}", flags);
  }

  Ok(())
}

#[test]
fn test_init_resets_version() -> Result<()> {
  let project = TestProject::local()?;
  project.set_version("garbage")?;

  run_versioning(&project.path, &["new", "--init", "--major"])?;

  assert_eq!(project.version()?, "0.0.1");
  assert!(project.read_file("CHANGELOG.md")?.contains("## Version 0.0.1"));

  Ok(())
}

#[test]
fn test_changelog_accumulates() -> Result<()> {
  let project = TestProject::local()?;
  project.set_version("0.1.0")?;

  run_versioning(&project.path, &["new", "First"])?;
  run_versioning(&project.path, &["new", "--minor", "Second"])?;

  let changelog = project.read_file("CHANGELOG.md")?;
  let first = changelog.find("## Version 0.1.1").unwrap_or(usize::MAX);
  let second = changelog.find("## Version 0.2.0").unwrap_or(usize::MAX);
  assert!(first < second, "entries out of order:\n{}", changelog);

  Ok(())
}

#[test]
fn test_malformed_state_aborts() -> Result<()> {
  let project = TestProject::local()?;
  project.set_version("1.2")?;

  let stderr = run_versioning_failing(&project.path, &["new"], 1)?;

  assert!(stderr.contains("[resolve version]"));
  assert!(stderr.contains("Invalid version format: '1.2'"));
  assert!(!project.file_exists("CHANGELOG.md"));

  Ok(())
}

#[test]
fn test_bump_past_maximum_aborts() -> Result<()> {
  let project = TestProject::local()?;
  project.set_version("18446744073709551615.0.0")?;

  let stderr = run_versioning_failing(&project.path, &["new", "--major"], 1)?;

  assert!(stderr.contains("[resolve version]"));
  assert!(stderr.contains("major version of 18446744073709551615.0.0"));
  assert!(!stderr.contains("panicked"));
  assert_eq!(project.version()?, "18446744073709551615.0.0");
  assert!(!project.file_exists("CHANGELOG.md"));

  let stderr = run_versioning_failing(&project.path, &["new", "--dry-run", "--major"], 1)?;
  assert!(stderr.contains("major version of 18446744073709551615.0.0"));

  Ok(())
}

#[test]
fn test_missing_template_dir_is_a_warning() -> Result<()> {
  let project = TestProject::local()?;
  std::fs::remove_dir(project.path.join("templates"))?;

  let output = run_versioning(&project.path, &["new"])?;

  assert!(stderr(&output).contains("⚠️"));
  assert_eq!(project.version()?, "0.0.2");
  assert!(project.file_exists("CHANGELOG.md"));

  Ok(())
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
  let project = TestProject::local()?;

  let output = run_versioning(&project.path, &["new", "--dry-run", "--minor"])?;
  let out = stdout(&output);

  assert!(out.contains("Next:     0.1.0"));
  assert!(out.contains("Dry-run mode"));
  assert!(!project.file_exists(".version"));
  assert!(!project.file_exists("CHANGELOG.md"));

  Ok(())
}

#[test]
fn test_dry_run_json_lists_stages() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config("run_git = true\nrun_deploy = true\ndeploy_command = \"./deploy.sh prod\"\n")?;
  project.set_version("4.1.0")?;

  let output = run_versioning(&project.path, &["new", "--dry-run", "--json", "Ship"])?;
  let json: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(json["current"], "4.1.0");
  assert_eq!(json["next"], "4.1.1");
  assert_eq!(json["message"], "Ship");

  let stages: Vec<&str> = json["plan"]["stages"]
    .as_array()
    .map(|stages| stages.iter().filter_map(|s| s["stage"].as_str()).collect())
    .unwrap_or_default();
  assert_eq!(
    stages,
    vec!["resolve_version", "write_artifacts", "source_control", "deploy"]
  );
  assert_eq!(json["plan"]["stages"][3]["deploy"]["strategy"], "command");
  assert_eq!(project.version()?, "4.1.0");

  Ok(())
}

#[test]
fn test_json_outcome() -> Result<()> {
  let project = TestProject::local()?;
  project.set_version("1.2.3")?;

  let output = run_versioning(&project.path, &["new", "--json", "--major"])?;
  let json: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  assert_eq!(json["previous_version"], "1.2.3");
  assert_eq!(json["version"], "2.0.0");
  assert_eq!(json["message"], "Increase version to 2.0.0");
  assert_eq!(json["completed"], serde_json::json!(["resolve_version", "write_artifacts"]));
  assert_eq!(json["warnings"], serde_json::json!([]));

  Ok(())
}

#[test]
fn test_sentry_release_is_written() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config(
    "run_git = false\nrun_deploy = false\ncreate_sentry_release = true\nsentry_app_name = \"Test App\"\n",
  )?;
  project.write_file(
    "config/packages/sentry.yaml",
    "when@prod:\n  sentry:\n    dsn: '%env(SENTRY_DSN)%'\n    options:\n      environment: prod\n",
  )?;
  project.set_version("1.9.9")?;

  run_versioning(&project.path, &["new"])?;

  let doc: serde_yaml::Value = serde_yaml::from_str(&project.read_file("config/packages/sentry.yaml")?)?;
  assert_eq!(
    doc["when@prod"]["sentry"]["options"]["release"].as_str(),
    Some("TestApp@1.9.10")
  );
  assert_eq!(doc["when@prod"]["sentry"]["options"]["environment"].as_str(), Some("prod"));

  Ok(())
}

#[test]
fn test_missing_sentry_config_aborts_before_git() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config("run_git = true\nrun_deploy = false\ncreate_sentry_release = true\n")?;

  let stderr = run_versioning_failing(&project.path, &["new"], 3)?;

  assert!(stderr.contains("[sentry release]"));
  assert!(!stderr.contains("Git add"));

  Ok(())
}

#[cfg(unix)]
mod shell {
  use crate::helpers::*;
  use anyhow::Result;

  #[test]
  fn test_pre_command_runs_first() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("run_git = false\nrun_deploy = false\npre_command = \"touch pre-command-ran\"\n")?;

    run_versioning(&project.path, &["new"])?;

    assert!(project.file_exists("pre-command-ran"));
    assert_eq!(project.version()?, "0.0.2");

    Ok(())
  }

  #[test]
  fn test_failing_pre_command_stops_everything() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("run_git = false\nrun_deploy = false\npre_command = \"false\"\n")?;
    project.set_version("1.0.0")?;

    let stderr = run_versioning_failing(&project.path, &["new"], 2)?;

    assert!(stderr.contains("[pre command] Pre command failed (exit code 1)"));
    assert_eq!(project.version()?, "1.0.0");
    assert!(!project.file_exists("CHANGELOG.md"));

    Ok(())
  }

  #[test]
  fn test_failing_cache_clear_reports_output() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("run_git = false\nrun_deploy = false\ncheck_cache_clear = true\n")?;
    project.write_file("bin/console", "#!/bin/sh\necho \"cache broken for $APP_ENV\"\nexit 1\n")?;
    make_executable(&project.path.join("bin/console"))?;

    let stderr = run_versioning_failing(&project.path, &["new"], 2)?;

    assert!(stderr.contains("[cache check] Production cache clear failed"));
    assert!(stderr.contains("cache broken for prod"));
    assert!(!project.file_exists(".version"));

    Ok(())
  }

  #[test]
  fn test_cache_clear_cleanup() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(
      "run_git = false\nrun_deploy = false\ncheck_cache_clear = true\ncleanup_cache_dir = true\n",
    )?;
    project.write_file("bin/console", "#!/bin/sh\nexit 0\n")?;
    make_executable(&project.path.join("bin/console"))?;
    project.write_file("var/cache/prod/pools/entry.php", "<?php")?;

    run_versioning(&project.path, &["new"])?;

    assert!(!project.file_exists("var/cache/prod"));
    assert!(project.file_exists("var/cache"));

    Ok(())
  }

  #[test]
  fn test_git_failure_is_tagged_with_stage() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("run_git = true\nrun_deploy = false\ndeploy_command = \"touch deployed\"\n")?;

    // Point git at a repository that does not exist
    let bin = env!("CARGO_BIN_EXE_svc-versioning");
    let output = std::process::Command::new(bin)
      .current_dir(&project.path)
      .arg("new")
      .env("GIT_DIR", project.path.join("no-such-repo"))
      .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("[source control] Git add failed"));
    assert!(!project.file_exists("deployed"));
    // The bump itself happened before git ran.
    assert_eq!(project.version()?, "0.0.2");

    Ok(())
  }

  #[test]
  fn test_deploy_command_runs_last() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("run_git = false\nrun_deploy = true\ndeploy_command = \"cp .version deployed-version\"\n")?;
    project.set_version("2.2.2")?;

    run_versioning(&project.path, &["new"])?;

    assert_eq!(project.read_file("deployed-version")?, "2.2.3");

    Ok(())
  }

  #[test]
  fn test_console_deploy_exit_status_is_checked() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config("run_git = false\nrun_deploy = true\n")?;
    project.write_file("bin/console", "#!/bin/sh\nexit 3\n")?;
    make_executable(&project.path.join("bin/console"))?;

    let stderr = run_versioning_failing(&project.path, &["new"], 2)?;
    assert!(stderr.contains("[deploy] Deploy failed (exit code 3): bin/console deploy"));

    Ok(())
  }

  fn make_executable(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
  }
}
