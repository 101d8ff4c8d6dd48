use crate::core::error::{ConfigError, VersioningError, VersioningResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for svc-versioning
/// Searched in order: versioning.toml, .versioning.toml, .config/versioning.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersioningConfig {
  /// Commit, push, tag and push the tag after the version bump
  #[serde(default = "default_true")]
  pub run_git: bool,

  /// Run the fixed `bin/console deploy` sub-command after git
  #[serde(default = "default_true")]
  pub run_deploy: bool,

  /// Command run before anything else; the run stops if it fails
  #[serde(default)]
  pub pre_command: Option<String>,

  /// Check that the production cache can be cleared
  #[serde(default)]
  pub check_cache_clear: bool,

  /// Delete var/cache/prod after a successful cache clear check
  #[serde(default)]
  pub cleanup_cache_dir: bool,

  /// Write the new release into the Sentry configuration
  #[serde(default)]
  pub create_sentry_release: bool,

  /// Prefix for the Sentry release (`{app}@{version}`), whitespace removed
  #[serde(default)]
  pub sentry_app_name: Option<String>,

  /// Deploy with this command instead of `bin/console deploy`
  #[serde(default)]
  pub deploy_command: Option<String>,

  /// Deploy with ansible-playbook
  #[serde(default)]
  pub ansible_deploy: bool,

  /// Inventory passed to ansible-playbook with `-i`
  #[serde(default = "default_ansible_inventory")]
  pub ansible_inventory: Option<String>,

  /// Playbook for ansible-playbook (required when ansible_deploy is set)
  #[serde(default)]
  pub ansible_playbook: Option<String>,

  #[serde(default)]
  pub paths: PathsConfig,
}

/// Locations of the generated artifacts, relative to the project directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
  #[serde(default = "default_template_path")]
  pub template: PathBuf,

  #[serde(default = "default_changelog_path")]
  pub changelog: PathBuf,

  #[serde(default = "default_sentry_config_path")]
  pub sentry_config: PathBuf,
}

fn default_true() -> bool {
  true
}

fn default_ansible_inventory() -> Option<String> {
  Some("inventory.yaml".to_string())
}

fn default_template_path() -> PathBuf {
  PathBuf::from("templates/_version.html.twig")
}

fn default_changelog_path() -> PathBuf {
  PathBuf::from("CHANGELOG.md")
}

fn default_sentry_config_path() -> PathBuf {
  PathBuf::from("config/packages/sentry.yaml")
}

impl Default for PathsConfig {
  fn default() -> Self {
    Self {
      template: default_template_path(),
      changelog: default_changelog_path(),
      sentry_config: default_sentry_config_path(),
    }
  }
}

impl Default for VersioningConfig {
  fn default() -> Self {
    Self {
      run_git: true,
      run_deploy: true,
      pre_command: None,
      check_cache_clear: false,
      cleanup_cache_dir: false,
      create_sentry_release: false,
      sentry_app_name: None,
      deploy_command: None,
      ansible_deploy: false,
      ansible_inventory: default_ansible_inventory(),
      ansible_playbook: None,
      paths: PathsConfig::default(),
    }
  }
}

/// Starter file written by `svc-versioning init-config`
pub const CONFIG_TEMPLATE: &str = r#"# svc-versioning configuration

# Commit, push, tag and push the tag after the version bump (git must be set up first)
run_git = false

# Run `bin/console deploy` after git
run_deploy = false

# Command run before versioning starts; versioning stops if it fails
# pre_command = "composer run-script phpstan"

# Check that `bin/console cache:clear --env=prod` succeeds
# check_cache_clear = false
# Delete var/cache/prod after a successful check
# cleanup_cache_dir = false

# Write the new release into config/packages/sentry.yaml
# create_sentry_release = false
# sentry_app_name = "My App"

# Deploy with this command instead of `bin/console deploy`
# deploy_command = "./deploy.sh production"

# Deploy with ansible-playbook
# ansible_deploy = false
# ansible_inventory = "inventory.yaml"
# ansible_playbook = "deploy.yml"

# [paths]
# template = "templates/_version.html.twig"
# changelog = "CHANGELOG.md"
# sentry_config = "config/packages/sentry.yaml"
"#;

impl VersioningConfig {
  /// Find config file in search order: versioning.toml, .versioning.toml, .config/versioning.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("versioning.toml"),
      path.join(".versioning.toml"),
      path.join(".config").join("versioning.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config for a project directory; no config file means all defaults
  pub fn load(path: &Path) -> VersioningResult<Self> {
    match Self::find_config_path(path) {
      Some(config_path) => Self::load_file(&config_path),
      None => {
        tracing::debug!(dir = %path.display(), "no versioning.toml found, using defaults");
        Ok(Self::default())
      }
    }
  }

  /// Load config from an explicit file
  pub fn load_file(config_path: &Path) -> VersioningResult<Self> {
    if !config_path.exists() {
      return Err(VersioningError::Config(ConfigError::NotFound {
        path: config_path.to_path_buf(),
      }));
    }

    let content = fs::read_to_string(config_path).map_err(|e| VersioningError::io(config_path, e))?;
    let config = Self::parse(&content).map_err(|message| {
      VersioningError::Config(ConfigError::Invalid {
        path: config_path.to_path_buf(),
        message,
      })
    })?;

    tracing::debug!(path = %config_path.display(), "loaded configuration");
    Ok(config)
  }

  fn parse(content: &str) -> Result<Self, String> {
    toml_edit::de::from_str(content).map_err(|e| e.to_string())
  }

  /// Write the starter config into `path` (refuses to overwrite)
  pub fn write_template(path: &Path) -> VersioningResult<PathBuf> {
    if let Some(existing) = Self::find_config_path(path) {
      return Err(VersioningError::Config(ConfigError::AlreadyExists { path: existing }));
    }

    let config_path = path.join("versioning.toml");
    fs::write(&config_path, CONFIG_TEMPLATE).map_err(|e| VersioningError::io(&config_path, e))?;
    Ok(config_path)
  }
}
