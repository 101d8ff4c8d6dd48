//! Release pipeline
//!
//! A run has two phases:
//!
//! 1. **Plan**: turn the configuration into an ordered list of enabled
//!    stages. Every configured command and path is validated here, so an
//!    unsafe value or a missing playbook stops the run before any file is
//!    written or any process is started.
//! 2. **Execute**: run the planned stages in order. The first hard failure
//!    ends the run with an error tagged by its [`Stage`]. Template and
//!    changelog write failures are soft: they are reported and collected in
//!    [`ReleaseOutcome::warnings`].
//!
//! Nothing is retried.

use crate::core::config::VersioningConfig;
use crate::core::error::{VersioningError, VersioningResult};
use crate::core::shell::{CommandRunner, OutputMode, ShellCommand, run_checked};
use crate::core::version::{Bump, BumpRequest, Version};
use crate::core::version_file::VersionStore;
use crate::release::deploy::DeployStrategy;
use crate::release::{Stage, artifacts, cache, git, sentry};
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One enabled stage with everything it needs, validated up front
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PlannedStage {
  PreCommand { command: ShellCommand },
  CacheCheck { command: ShellCommand, cleanup: bool },
  ResolveVersion { bump: Option<Bump> },
  WriteArtifacts { template: PathBuf, changelog: PathBuf },
  SentryRelease { config: PathBuf, app_name: Option<String> },
  SourceControl,
  Deploy { deploy: DeployStrategy, command: ShellCommand },
}

impl PlannedStage {
  pub fn stage(&self) -> Stage {
    match self {
      PlannedStage::PreCommand { .. } => Stage::PreCommand,
      PlannedStage::CacheCheck { .. } => Stage::CacheCheck,
      PlannedStage::ResolveVersion { .. } => Stage::ResolveVersion,
      PlannedStage::WriteArtifacts { .. } => Stage::WriteArtifacts,
      PlannedStage::SentryRelease { .. } => Stage::SentryRelease,
      PlannedStage::SourceControl => Stage::SourceControl,
      PlannedStage::Deploy { .. } => Stage::Deploy,
    }
  }
}

/// Ordered, validated stages of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePlan {
  pub stages: Vec<PlannedStage>,
}

impl ReleasePlan {
  /// Build the plan for a configuration and bump request
  pub fn build(config: &VersioningConfig, request: &BumpRequest) -> VersioningResult<Self> {
    let mut stages = Vec::new();

    for stage in Stage::enabled(config) {
      let planned = Self::plan_stage(stage, config, request).map_err(|e| e.in_stage(stage))?;
      if let Some(planned) = planned {
        stages.push(planned);
      }
    }

    Ok(Self { stages })
  }

  fn plan_stage(
    stage: Stage,
    config: &VersioningConfig,
    request: &BumpRequest,
  ) -> VersioningResult<Option<PlannedStage>> {
    let planned = match stage {
      Stage::PreCommand => {
        let text = config.pre_command.as_deref().unwrap_or_default().trim();
        PlannedStage::PreCommand {
          command: ShellCommand::configured(text)?,
        }
      }
      Stage::CacheCheck => PlannedStage::CacheCheck {
        command: cache::cache_clear_command(),
        cleanup: config.cleanup_cache_dir,
      },
      Stage::ResolveVersion => PlannedStage::ResolveVersion { bump: request.bump() },
      Stage::WriteArtifacts => PlannedStage::WriteArtifacts {
        template: config.paths.template.clone(),
        changelog: config.paths.changelog.clone(),
      },
      Stage::SentryRelease => PlannedStage::SentryRelease {
        config: config.paths.sentry_config.clone(),
        app_name: config.sentry_app_name.clone(),
      },
      Stage::SourceControl => PlannedStage::SourceControl,
      Stage::Deploy => match DeployStrategy::resolve(config)? {
        Some(deploy) => PlannedStage::Deploy {
          command: deploy.command()?,
          deploy,
        },
        None => return Ok(None),
      },
    };
    Ok(Some(planned))
  }

  /// Stages in this plan, in order
  pub fn stage_names(&self) -> Vec<Stage> {
    self.stages.iter().map(PlannedStage::stage).collect()
  }
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseOutcome {
  /// Version before the bump; `None` when initializing
  pub previous_version: Option<Version>,
  pub version: Version,
  pub message: String,
  pub completed: Vec<Stage>,
  /// Soft failures (template or changelog could not be written)
  pub warnings: Vec<String>,
  /// Release identifier written to the Sentry configuration
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sentry_release: Option<String>,
}

/// Default commit message when none is given
pub fn default_message(version: Version) -> String {
  format!("Increase version to {}", version)
}

/// Mutable state threaded through one run
struct RunState<'m> {
  requested_message: Option<&'m str>,
  previous_version: Option<Version>,
  resolved: Option<(Version, String)>,
  completed: Vec<Stage>,
  warnings: Vec<String>,
  sentry_release: Option<String>,
}

impl RunState<'_> {
  fn release(&self) -> VersioningResult<(Version, &str)> {
    self
      .resolved
      .as_ref()
      .map(|(version, message)| (*version, message.as_str()))
      .ok_or_else(|| VersioningError::message("Version has not been resolved yet"))
  }
}

/// Drives one release: version bump, artifacts, and the external steps
pub struct ReleaseOrchestrator<R: CommandRunner> {
  config: VersioningConfig,
  project_dir: PathBuf,
  store: VersionStore,
  runner: R,
  progress_on_stderr: bool,
}

/// Print one progress line
fn report(on_stderr: bool, line: &str) {
  if on_stderr {
    eprintln!("{}", line);
  } else {
    println!("{}", line);
  }
}

impl<R: CommandRunner> ReleaseOrchestrator<R> {
  pub fn new(config: VersioningConfig, project_dir: &Path, runner: R) -> Self {
    Self {
      config,
      project_dir: project_dir.to_path_buf(),
      store: VersionStore::new(project_dir),
      runner,
      progress_on_stderr: false,
    }
  }

  /// Send progress lines to stderr, keeping stdout free for machine output
  pub fn progress_on_stderr(mut self, enabled: bool) -> Self {
    self.progress_on_stderr = enabled;
    self
  }

  fn status(&self, line: &str) {
    report(self.progress_on_stderr, line);
  }

  pub fn store(&self) -> &VersionStore {
    &self.store
  }

  #[cfg(test)]
  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// Validate the configuration and list the stages a run would execute
  pub fn plan(&self, request: &BumpRequest) -> VersioningResult<ReleasePlan> {
    ReleasePlan::build(&self.config, request)
  }

  /// Run the whole pipeline
  pub fn run(&mut self, request: &BumpRequest, message: Option<&str>) -> VersioningResult<ReleaseOutcome> {
    let plan = self.plan(request)?;
    tracing::debug!(stages = ?plan.stage_names(), "release plan built");

    let mut state = RunState {
      requested_message: message.map(str::trim).filter(|m| !m.is_empty()),
      previous_version: None,
      resolved: None,
      completed: Vec::new(),
      warnings: Vec::new(),
      sentry_release: None,
    };

    for planned in &plan.stages {
      let stage = planned.stage();
      tracing::debug!(%stage, "starting stage");
      self
        .run_stage(planned, request, &mut state)
        .map_err(|e| e.in_stage(stage))?;
      state.completed.push(stage);
    }

    let (version, message) = state.release()?;
    Ok(ReleaseOutcome {
      previous_version: state.previous_version,
      version,
      message: message.to_string(),
      completed: state.completed,
      warnings: state.warnings,
      sentry_release: state.sentry_release,
    })
  }

  fn run_stage(&mut self, planned: &PlannedStage, request: &BumpRequest, state: &mut RunState<'_>) -> VersioningResult<()> {
    match planned {
      PlannedStage::PreCommand { command } => {
        self.status(&format!("🔧 Running pre command: {}", command));
        run_checked(&mut self.runner, "Pre command", command, OutputMode::Inherit)?;
      }

      PlannedStage::CacheCheck { cleanup, .. } => {
        self.status("🧹 Checking production cache clear...");
        let checked = cache::check_production_cache_clear(&mut self.runner, &self.project_dir, *cleanup)?;
        tracing::debug!(output = %checked.output.trim(), "cache clear output");
        self.status("   Production cache cleared successfully");
        if checked.cleaned_up {
          self.status(&format!("   Cache directory {} has been cleaned up", cache::CACHE_DIR));
        }
      }

      PlannedStage::ResolveVersion { .. } => {
        let version = if request.init {
          self.status("📦 Initializing versioning...");
          Version::initial()
        } else {
          let current = self.store.current()?;
          self.status(&format!("📦 Current version: {}", current));
          state.previous_version = Some(current);
          request.apply(current)?
        };

        self.store.save(version)?;
        self.status(&format!("   New version: {}", version));

        let message = state
          .requested_message
          .map(String::from)
          .unwrap_or_else(|| default_message(version));
        state.resolved = Some((version, message));
      }

      PlannedStage::WriteArtifacts { template, changelog } => {
        let (version, message) = state.release()?;
        let now = Local::now();

        let mut warnings = Vec::new();
        if let Err(e) = artifacts::write_template(&self.project_dir.join(template), version, &now) {
          warnings.push(format!("Cannot write template file {}: {}", template.display(), e));
        }
        if let Err(e) = artifacts::append_changelog(&self.project_dir.join(changelog), version, message, &now) {
          warnings.push(format!("Cannot write {}: {}", changelog.display(), e));
        }

        for warning in &warnings {
          eprintln!("⚠️  {}", warning);
        }
        state.warnings.extend(warnings);
      }

      PlannedStage::SentryRelease { config, app_name } => {
        let (version, _) = state.release()?;
        let release = sentry::write_release(&self.project_dir.join(config), version, app_name.as_deref())?;
        self.status(&format!("🛰️  Sentry release set to {}", release));
        state.sentry_release = Some(release);
      }

      PlannedStage::SourceControl => {
        let (version, message) = state.release()?;
        self.status(&format!("🚀 Publishing {} to git...", git::tag_name(version)));
        let on_stderr = self.progress_on_stderr;
        git::publish(&mut self.runner, version, message, |command| {
          report(on_stderr, &format!("   {}", command))
        })?;
      }

      PlannedStage::Deploy { deploy, command } => {
        self.status(&format!("🚚 Running deploy: {}", command));
        run_checked(&mut self.runner, deploy.step_name(), command, OutputMode::Inherit)?;
      }
    }
    Ok(())
  }
}
