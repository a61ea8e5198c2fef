//! Release classification from tag names
//!
//! A release tag is `v<major>.<minor>.<patch>` with an optional pre-release
//! suffix `a<n>`, `b<n>` or `rc<n>`. Numbers are ASCII digits only.
//!
//! Two matching modes exist:
//! - `anchored` (default): the whole tag name must be a release tag
//! - `loose`: the release pattern may appear anywhere in the tag, which is how
//!   the historical pipeline matched (e.g. `refs/tags/v1.2.0rc3`). The match must
//!   still not be followed by a letter or digit, so `v1.2.0x1` is never a release.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

// Compile-time literals; both are exercised by test_patterns_compile().
static ANCHORED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^v([0-9]+)\.([0-9]+)\.([0-9]+)(?:(a|b|rc)([0-9]+))?$")
    .expect("BUG: anchored release tag pattern is invalid")
});

static LOOSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"v([0-9]+)\.([0-9]+)\.([0-9]+)(?:(a|b|rc)([0-9]+))?(?:$|[^0-9A-Za-z])")
    .expect("BUG: loose release tag pattern is invalid")
});

/// How much of the tag name the release pattern must cover
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatching {
  /// The whole tag name is the release pattern
  #[default]
  Anchored,
  /// The release pattern may be embedded in a longer tag name
  Loose,
}

impl TagMatching {
  fn captures<'t>(self, tag_name: &'t str) -> Option<Captures<'t>> {
    match self {
      TagMatching::Anchored => ANCHORED_PATTERN.captures(tag_name),
      TagMatching::Loose => LOOSE_PATTERN.captures(tag_name),
    }
  }

  /// Classify a tag name under this matching mode
  pub fn classify(self, tag_name: &str) -> ReleaseClassification {
    match self.captures(tag_name) {
      None => ReleaseClassification::NotARelease,
      Some(caps) if caps.get(4).is_some() => ReleaseClassification::PreRelease,
      Some(_) => ReleaseClassification::Final,
    }
  }
}

/// What a tag name means for the publish stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseClassification {
  Final,
  #[serde(rename = "prerelease")]
  PreRelease,
  NotARelease,
}

impl ReleaseClassification {
  /// Whether this classification may be published at all
  pub fn is_release(self) -> bool {
    !matches!(self, ReleaseClassification::NotARelease)
  }

  /// Whether the host release entry should be flagged as a pre-release
  pub fn is_prerelease(self) -> bool {
    matches!(self, ReleaseClassification::PreRelease)
  }
}

impl fmt::Display for ReleaseClassification {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseClassification::Final => write!(f, "final"),
      ReleaseClassification::PreRelease => write!(f, "prerelease"),
      ReleaseClassification::NotARelease => write!(f, "not-a-release"),
    }
  }
}

/// Classify a tag name with anchored matching
///
/// Total over all strings: anything that is not exactly a release tag is
/// `NotARelease`.
pub fn classify(tag_name: &str) -> ReleaseClassification {
  TagMatching::Anchored.classify(tag_name)
}

/// Pre-release channel named by the tag suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreReleaseKind {
  Alpha,
  Beta,
  Rc,
}

impl PreReleaseKind {
  fn parse(suffix: &str) -> Option<Self> {
    match suffix {
      "a" => Some(PreReleaseKind::Alpha),
      "b" => Some(PreReleaseKind::Beta),
      "rc" => Some(PreReleaseKind::Rc),
      _ => None,
    }
  }

  /// Suffix as written in the tag
  pub fn suffix(self) -> &'static str {
    match self {
      PreReleaseKind::Alpha => "a",
      PreReleaseKind::Beta => "b",
      PreReleaseKind::Rc => "rc",
    }
  }
}

/// Parsed components of a release tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseTag {
  pub major: u64,
  pub minor: u64,
  pub patch: u64,
  /// Pre-release channel and number, if any
  pub pre: Option<(PreReleaseKind, u64)>,
}

impl ReleaseTag {
  /// Parse the release pattern out of a tag name
  ///
  /// Returns `None` when the tag is not a release, or when a component does not
  /// fit in a `u64` (classification itself never depends on the numbers).
  pub fn parse(tag_name: &str, matching: TagMatching) -> Option<Self> {
    let caps = matching.captures(tag_name)?;
    let number = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u64>().ok());

    let pre = match (caps.get(4), caps.get(5)) {
      (Some(kind), Some(_)) => Some((PreReleaseKind::parse(kind.as_str())?, number(5)?)),
      _ => None,
    };

    Some(Self {
      major: number(1)?,
      minor: number(2)?,
      patch: number(3)?,
      pre,
    })
  }

  /// Semver rendering, e.g. `v1.2.0rc3` becomes `1.2.0-rc.3`
  pub fn semver(&self) -> semver::Version {
    let mut version = semver::Version::new(self.major, self.minor, self.patch);
    if let Some((kind, n)) = self.pre {
      // "<suffix>.<digits>" is always a valid semver pre-release identifier
      version.pre = semver::Prerelease::new(&format!("{}.{}", kind.suffix(), n)).unwrap_or_default();
    }
    version
  }

  /// The classification these components imply
  pub fn classification(&self) -> ReleaseClassification {
    if self.pre.is_some() {
      ReleaseClassification::PreRelease
    } else {
      ReleaseClassification::Final
    }
  }
}

impl fmt::Display for ReleaseTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
    if let Some((kind, n)) = self.pre {
      write!(f, "{}{}", kind.suffix(), n)?;
    }
    Ok(())
  }
}
