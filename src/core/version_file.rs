//! Persisted current version (`.version`)
//!
//! The state file holds a single trimmed version string and is owned by
//! [`VersionStore`]. Reading the current version creates the file with
//! `0.0.1` on first use, so callers must expect reads to write.

use crate::core::error::{VersioningError, VersioningResult};
use crate::core::version::Version;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the state file inside the project directory
pub const VERSION_FILE: &str = ".version";

/// Whether [`VersionStore::write`] replaces or extends the target file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
  Overwrite,
  Append,
}

/// Reads and writes the `.version` state file in one directory
#[derive(Debug, Clone)]
pub struct VersionStore {
  dir: PathBuf,
}

impl VersionStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  /// Path of the state file
  pub fn filename(&self) -> PathBuf {
    self.dir.join(VERSION_FILE)
  }

  /// Current version string (trimmed)
  ///
  /// A missing state file is created with [`Version::initial`]. A state file
  /// that exists but cannot be read is an error, never silently replaced.
  pub fn current_version(&self) -> VersioningResult<String> {
    let path = self.filename();
    if path.exists() {
      return Self::read(&path);
    }

    let initial = Version::initial().to_string();
    tracing::debug!(path = %path.display(), "version file missing, creating it");
    Self::write(&path, &initial, WriteMode::Overwrite)?;
    Ok(initial)
  }

  /// Current version, parsed
  pub fn current(&self) -> VersioningResult<Version> {
    Version::parse(&self.current_version()?)
  }

  /// Current version without creating the state file; `None` when it is missing
  pub fn peek(&self) -> VersioningResult<Option<Version>> {
    let path = self.filename();
    if !path.exists() {
      return Ok(None);
    }
    Version::parse(&Self::read(&path)?).map(Some)
  }

  /// Persist a new current version, replacing the old one
  pub fn save(&self, version: Version) -> VersioningResult<()> {
    Self::write(&self.filename(), &version.to_string(), WriteMode::Overwrite)
  }

  /// Read a file and trim surrounding whitespace
  pub fn read(path: &Path) -> VersioningResult<String> {
    fs::read_to_string(path)
      .map(|buffer| buffer.trim().to_string())
      .map_err(|e| VersioningError::io(path, e))
  }

  /// Create, overwrite or append to a file
  ///
  /// Failures are returned, not raised: the caller decides whether a failed
  /// write is fatal.
  pub fn write(path: &Path, content: &str, mode: WriteMode) -> VersioningResult<()> {
    tracing::debug!(path = %path.display(), ?mode, bytes = content.len(), "writing file");

    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
      WriteMode::Overwrite => options.write(true).truncate(true),
      WriteMode::Append => options.append(true),
    };

    options
      .open(path)
      .and_then(|mut file| file.write_all(content.as_bytes()))
      .map_err(|e| VersioningError::io(path, e))
  }
}
