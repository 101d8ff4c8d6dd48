//! Semantic version value and the increment policy
//!
//! A [`Version`] is an immutable `major.minor.patch` triple of non-negative
//! integers. There is no pre-release or build metadata: the only accepted
//! text form is three dot-separated runs of ASCII digits.

use crate::core::error::{VersioningError, VersioningResult};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// ASCII digits only; `\d` would also match other Unicode digits.
static VERSION_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)$").expect("version regex is valid"));

/// Semantic version (major.minor.patch)
///
/// Field order matters: the derived `Ord` compares major, then minor, then
/// patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
  pub major: u64,
  pub minor: u64,
  pub patch: u64,
}

impl Version {
  pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self { major, minor, patch }
  }

  /// Build a version from signed components, rejecting negatives
  #[allow(dead_code)]
  pub fn try_new(major: i64, minor: i64, patch: i64) -> VersioningResult<Self> {
    match (u64::try_from(major), u64::try_from(minor), u64::try_from(patch)) {
      (Ok(major), Ok(minor), Ok(patch)) => Ok(Self::new(major, minor, patch)),
      _ => Err(VersioningError::Range { major, minor, patch }),
    }
  }

  /// The version every project starts at: `0.0.1`
  pub const fn initial() -> Self {
    Self::new(0, 0, 1)
  }

  /// Parse `major.minor.patch`, reporting the input verbatim on failure
  pub fn parse(text: &str) -> VersioningResult<Self> {
    let format_error = || VersioningError::Format { input: text.to_string() };

    let caps = VERSION_RE.captures(text).ok_or_else(format_error)?;
    // Components too large for u64 are a format problem, not a range one.
    let component = |i: usize| caps[i].parse::<u64>().map_err(|_| format_error());

    Ok(Self::new(component(1)?, component(2)?, component(3)?))
  }

  pub fn increment_major(self) -> VersioningResult<Self> {
    Ok(Self::new(self.step(self.major, Bump::Major)?, 0, 0))
  }

  pub fn increment_minor(self) -> VersioningResult<Self> {
    Ok(Self::new(self.major, self.step(self.minor, Bump::Minor)?, 0))
  }

  pub fn increment_patch(self) -> VersioningResult<Self> {
    Ok(Self::new(self.major, self.minor, self.step(self.patch, Bump::Patch)?))
  }

  fn step(self, component: u64, bump: Bump) -> VersioningResult<u64> {
    component.checked_add(1).ok_or_else(|| VersioningError::Overflow {
      version: self.to_string(),
      component: bump.as_str(),
    })
  }

  #[allow(dead_code)]
  pub fn is_greater_than(&self, other: &Version) -> bool {
    self > other
  }

  /// Apply a single bump; fails instead of wrapping when a component is at `u64::MAX`
  pub fn bump(self, bump: Bump) -> VersioningResult<Self> {
    match bump {
      Bump::Major => self.increment_major(),
      Bump::Minor => self.increment_minor(),
      Bump::Patch => self.increment_patch(),
    }
  }
}

/// Serialized in its text form, e.g. `"1.2.3"`
impl Serialize for Version {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
  }
}

impl FromStr for Version {
  type Err = VersioningError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

/// Version component to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bump {
  Major,
  Minor,
  Patch,
}

impl Bump {
  pub fn as_str(self) -> &'static str {
    match self {
      Bump::Major => "major",
      Bump::Minor => "minor",
      Bump::Patch => "patch",
    }
  }
}

impl fmt::Display for Bump {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The raw `--major/--minor/--patch/--init` flags of one run
///
/// The flags are not mutually exclusive on the command line; [`BumpRequest::bump`]
/// resolves them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BumpRequest {
  pub major: bool,
  pub minor: bool,
  pub patch: bool,
  pub init: bool,
}

impl BumpRequest {
  /// Resolve the flags to the single bump that applies
  ///
  /// Returns `None` for `init`, which discards prior state entirely.
  /// Without `major` or `minor` the result is always `Patch`, even when
  /// `patch` itself was not given. Only the highest-priority flag counts.
  pub fn bump(&self) -> Option<Bump> {
    if self.init {
      None
    } else if self.major {
      Some(Bump::Major)
    } else if self.minor {
      Some(Bump::Minor)
    } else {
      Some(Bump::Patch)
    }
  }

  /// Compute the next version from the current one
  pub fn apply(&self, current: Version) -> VersioningResult<Version> {
    match self.bump() {
      Some(bump) => current.bump(bump),
      None => Ok(Version::initial()),
    }
  }
}
