//! `svc-versioning new`: bump the version and run the release pipeline

use crate::commands::load_config;
use crate::core::error::{ResultExt, VersioningResult};
use crate::core::shell::SystemShell;
use crate::core::version::{BumpRequest, Version};
use crate::core::version_file::VERSION_FILE;
use crate::release::pipeline::default_message;
use crate::release::{PlannedStage, ReleaseOrchestrator, ReleaseOutcome, ReleasePlan, git, sentry};
use serde::Serialize;
use std::path::Path;

/// Options of one `new` invocation
#[derive(Debug, Clone, Default)]
pub struct NewOptions {
  pub message: Option<String>,
  pub request: BumpRequest,
  pub dry_run: bool,
  pub json: bool,
}

/// What a dry run would do
#[derive(Serialize)]
struct DryRunReport<'a> {
  /// Current version, `None` when the state file does not exist yet
  current: Option<Version>,
  next: Version,
  message: String,
  plan: &'a ReleasePlan,
}

/// Run the new command
pub fn run_new(project_dir: &Path, config_path: Option<&Path>, options: NewOptions) -> VersioningResult<()> {
  let config = load_config(project_dir, config_path)?;
  let mut orchestrator =
    ReleaseOrchestrator::new(config, project_dir, SystemShell::new(project_dir)).progress_on_stderr(options.json);

  if options.dry_run {
    return print_dry_run(&orchestrator, &options);
  }

  let outcome = orchestrator.run(&options.request, options.message.as_deref())?;

  if options.json {
    let json = serde_json::to_string_pretty(&outcome)
      .with_context(|| format!("Failed to render outcome of release {}", outcome.version))?;
    println!("{}", json);
  } else {
    print_outcome(&outcome);
  }

  Ok(())
}

fn print_dry_run(orchestrator: &ReleaseOrchestrator<SystemShell>, options: &NewOptions) -> VersioningResult<()> {
  let plan = orchestrator.plan(&options.request)?;

  // peek() never creates the state file
  let current = if options.request.init {
    None
  } else {
    orchestrator.store().peek()?
  };
  let next = if options.request.init {
    Version::initial()
  } else {
    options.request.apply(current.unwrap_or_else(Version::initial))?
  };
  let message = options
    .message
    .as_deref()
    .map(str::trim)
    .filter(|m| !m.is_empty())
    .map(String::from)
    .unwrap_or_else(|| default_message(next));

  if options.json {
    let report = DryRunReport {
      current,
      next,
      message,
      plan: &plan,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  println!("📦 Release plan");
  println!();
  match current {
    Some(current) => println!("  Current:  {}", current),
    None if options.request.init => println!("  Current:  (ignored, initializing)"),
    None => println!("  Current:  {} ({} would be created)", Version::initial(), VERSION_FILE),
  }
  println!("  Next:     {}", next);
  println!("  Message:  {}", message);
  println!();
  println!("  Stages:");

  for planned in &plan.stages {
    println!("    • {}", planned.stage());
    match planned {
      PlannedStage::PreCommand { command } => println!("        $ {}", command),
      PlannedStage::CacheCheck { command, cleanup } => {
        println!("        $ {}", command);
        if *cleanup {
          println!("        then remove {}", crate::release::cache::CACHE_DIR);
        }
      }
      PlannedStage::ResolveVersion { bump } => match bump {
        Some(bump) => println!("        {} bump", bump),
        None => println!("        reset to {}", Version::initial()),
      },
      PlannedStage::WriteArtifacts { template, changelog } => {
        println!("        write {}", template.display());
        println!("        append {}", changelog.display());
      }
      PlannedStage::SentryRelease { config, app_name } => {
        println!(
          "        set release {} in {}",
          sentry::release_name(next, app_name.as_deref()),
          config.display()
        );
      }
      PlannedStage::SourceControl => {
        for (_, command) in git::publish_steps(next, &message) {
          println!("        $ {}", command);
        }
      }
      PlannedStage::Deploy { command, .. } => println!("        $ {}", command),
    }
  }

  println!();
  println!("🔍 Dry-run mode (no changes applied)");
  Ok(())
}

fn print_outcome(outcome: &ReleaseOutcome) {
  println!();
  match outcome.previous_version {
    Some(previous) => println!("✅ Released {} (was {})", outcome.version, previous),
    None => println!("✅ Versioning initialized at {}", outcome.version),
  }

  if !outcome.warnings.is_empty() {
    println!("⚠️  Completed with {} warning(s):", outcome.warnings.len());
    for warning in &outcome.warnings {
      println!("   - {}", warning);
    }
  }
}
