//! Deployment strategies
//!
//! Exactly one strategy runs per release. Resolution order: ansible-playbook,
//! then a configured deploy command, then the fixed `bin/console deploy`
//! sub-command.

use crate::core::config::VersioningConfig;
use crate::core::error::{VersioningError, VersioningResult};
use crate::core::shell::ShellCommand;
use serde::Serialize;

/// Deploy sub-command run when no other strategy is configured
pub const CONSOLE_DEPLOY_COMMAND: &str = "bin/console deploy";

/// How the release gets deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DeployStrategy {
  /// `bin/console deploy`
  Console,
  /// Operator-configured command (deny-list checked)
  Command { command: String },
  /// `ansible-playbook [-i inventory] playbook`
  Playbook {
    inventory: Option<String>,
    playbook: String,
  },
}

impl DeployStrategy {
  /// Pick the strategy for this configuration, validating all its inputs
  ///
  /// Returns `None` when deployment is not configured at all. A playbook
  /// strategy without a playbook is an error.
  pub fn resolve(config: &VersioningConfig) -> VersioningResult<Option<Self>> {
    let non_blank = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from);

    if config.ansible_deploy {
      let playbook = non_blank(&config.ansible_playbook).ok_or_else(|| {
        VersioningError::with_help(
          "ansible_deploy is true - but no playbook defined (parameter ansible_playbook)",
          "Set ansible_playbook in versioning.toml, or set ansible_deploy = false.",
        )
      })?;
      let strategy = DeployStrategy::Playbook {
        inventory: non_blank(&config.ansible_inventory),
        playbook,
      };
      strategy.command()?;
      return Ok(Some(strategy));
    }

    if let Some(command) = non_blank(&config.deploy_command) {
      let strategy = DeployStrategy::Command { command };
      strategy.command()?;
      return Ok(Some(strategy));
    }

    if config.run_deploy {
      return Ok(Some(DeployStrategy::Console));
    }

    Ok(None)
  }

  /// Build the shell command for this strategy
  pub fn command(&self) -> VersioningResult<ShellCommand> {
    match self {
      DeployStrategy::Console => Ok(ShellCommand::fixed(CONSOLE_DEPLOY_COMMAND)),
      DeployStrategy::Command { command } => ShellCommand::configured(command),
      DeployStrategy::Playbook { inventory, playbook } => {
        let mut cmd = ShellCommand::program("ansible-playbook");
        if let Some(inventory) = inventory {
          cmd = cmd.arg("-i").path_arg(inventory)?;
        }
        cmd.path_arg(playbook)
      }
    }
  }

  /// Step name used in errors and progress output
  pub fn step_name(&self) -> &'static str {
    match self {
      DeployStrategy::Console => "Deploy",
      DeployStrategy::Command { .. } => "Deploy command",
      DeployStrategy::Playbook { .. } => "Ansible deploy",
    }
  }
}
