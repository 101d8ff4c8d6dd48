//! Sentry release registration
//!
//! Rewrites `options.release` in the Symfony Sentry bundle configuration
//! (`config/packages/sentry.yaml`). Environment sections (`when@dev`,
//! `when@prod`, `when@test`) are updated when they contain a `sentry` block;
//! the top-level `sentry` block is updated when it declares a `dsn`. Sections
//! that are not present stay absent.

use crate::core::error::{VersioningError, VersioningResult};
use crate::core::version::Version;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Environment sections that may carry their own `sentry` block
pub const ENVIRONMENT_SECTIONS: [&str; 3] = ["when@dev", "when@prod", "when@test"];

const SENTRY_KEY: &str = "sentry";

/// Release identifier: `{app}@{version}`, or the bare version without an app name
///
/// All whitespace is removed from the app name.
pub fn release_name(version: Version, app_name: Option<&str>) -> String {
  let app: String = app_name
    .unwrap_or_default()
    .chars()
    .filter(|c| !c.is_whitespace())
    .collect();

  if app.is_empty() {
    version.to_string()
  } else {
    format!("{}@{}", app, version)
  }
}

/// Set `options.release` in every recognized sentry block of `doc`
///
/// Returns the number of blocks updated. `doc` is left untouched on error.
pub fn apply_release(doc: &mut Value, release: &str) -> Result<usize, String> {
  let root = doc
    .as_mapping_mut()
    .ok_or_else(|| "document root is not a mapping".to_string())?;

  let mut targets: Vec<Vec<&str>> = Vec::new();
  for env in ENVIRONMENT_SECTIONS {
    let has_sentry = root
      .get(env)
      .and_then(|section| section.get(SENTRY_KEY))
      .is_some_and(|block| !block.is_null());
    if has_sentry {
      targets.push(vec![env, SENTRY_KEY]);
    }
  }
  let has_dsn = root
    .get(SENTRY_KEY)
    .and_then(|block| block.get("dsn"))
    .is_some_and(|dsn| !dsn.is_null());
  if has_dsn {
    targets.push(vec![SENTRY_KEY]);
  }

  // Check every target before changing any of them.
  for path in &targets {
    check_block(root, path)?;
  }
  for path in &targets {
    options_mut(root, path)?.insert(Value::from("release"), Value::from(release));
  }

  Ok(targets.len())
}

/// Verify that `<path>` is a mapping whose `options`, if present, is a mapping too
fn check_block(root: &Mapping, path: &[&str]) -> Result<(), String> {
  let joined = path.join(".");
  let mut block = root;
  for key in path {
    block = block
      .get(*key)
      .and_then(Value::as_mapping)
      .ok_or_else(|| format!("'{}' is not a mapping", joined))?;
  }

  match block.get("options") {
    None => Ok(()),
    Some(options) if options.is_mapping() => Ok(()),
    Some(_) => Err(format!("'{}.options' is not a mapping", joined)),
  }
}

/// Resolve `<path>.options`, creating an empty options map if missing
fn options_mut<'a>(root: &'a mut Mapping, path: &[&str]) -> Result<&'a mut Mapping, String> {
  let joined = path.join(".");
  let mut block = root;
  for key in path {
    block = block
      .get_mut(*key)
      .and_then(Value::as_mapping_mut)
      .ok_or_else(|| format!("'{}' is not a mapping", joined))?;
  }

  if !block.contains_key("options") {
    block.insert(Value::from("options"), Value::Mapping(Mapping::new()));
  }

  block
    .get_mut("options")
    .and_then(Value::as_mapping_mut)
    .ok_or_else(|| format!("'{}.options' is not a mapping", joined))
}

/// Update the Sentry configuration file in place
pub fn write_release(path: &Path, version: Version, app_name: Option<&str>) -> VersioningResult<String> {
  let document_error = |message: String| VersioningError::ConfigDocument {
    path: path.to_path_buf(),
    message,
  };

  let content = fs::read_to_string(path).map_err(|e| document_error(e.to_string()))?;
  let mut doc: Value = serde_yaml::from_str(&content).map_err(|e| document_error(e.to_string()))?;

  let release = release_name(version, app_name);
  let updated = apply_release(&mut doc, &release).map_err(document_error)?;
  tracing::debug!(path = %path.display(), release, updated, "updated sentry release");

  let rendered = serde_yaml::to_string(&doc).map_err(|e| document_error(e.to_string()))?;
  fs::write(path, rendered).map_err(|e| document_error(e.to_string()))?;

  Ok(release)
}
