//! Pipeline stages and their enabling predicates

use crate::core::config::VersioningConfig;
use serde::Serialize;
use std::fmt;

/// One step of the release pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  PreCommand,
  CacheCheck,
  ResolveVersion,
  WriteArtifacts,
  SentryRelease,
  SourceControl,
  Deploy,
}

impl Stage {
  /// All stages in the fixed order they run
  pub const ALL: [Stage; 7] = [
    Stage::PreCommand,
    Stage::CacheCheck,
    Stage::ResolveVersion,
    Stage::WriteArtifacts,
    Stage::SentryRelease,
    Stage::SourceControl,
    Stage::Deploy,
  ];

  /// Whether this stage runs for the given configuration
  pub fn is_enabled(self, config: &VersioningConfig) -> bool {
    match self {
      Stage::PreCommand => config.pre_command.as_deref().is_some_and(|c| !c.trim().is_empty()),
      Stage::CacheCheck => config.check_cache_clear,
      Stage::ResolveVersion | Stage::WriteArtifacts => true,
      Stage::SentryRelease => config.create_sentry_release,
      Stage::SourceControl => config.run_git,
      Stage::Deploy => {
        config.ansible_deploy
          || config.deploy_command.as_deref().is_some_and(|c| !c.trim().is_empty())
          || config.run_deploy
      }
    }
  }

  /// Enabled stages, in order
  pub fn enabled(config: &VersioningConfig) -> Vec<Stage> {
    Self::ALL
      .into_iter()
      .filter(|stage| stage.is_enabled(config))
      .collect()
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::PreCommand => "pre command",
      Stage::CacheCheck => "cache check",
      Stage::ResolveVersion => "resolve version",
      Stage::WriteArtifacts => "write artifacts",
      Stage::SentryRelease => "sentry release",
      Stage::SourceControl => "source control",
      Stage::Deploy => "deploy",
    };
    write!(f, "{}", name)
  }
}
