use crate::core::error::{ConfigError, ShipError, ShipResult, ResultExt};
use crate::release::classify::TagMatching;
use crate::release::notes::DEFAULT_SIGNATURE_MARKERS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for shipgate
/// Searched in order: shipgate.toml, .shipgate.toml, .config/shipgate.toml
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipConfig {
  #[serde(default)]
  pub release: ReleaseSettings,
  #[serde(default)]
  pub gate: GateSettings,
  #[serde(default)]
  pub publish: PublishSettings,
}

/// How tags are read and classified
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSettings {
  /// Whole-name (`anchored`) or historical substring (`loose`) tag matching
  #[serde(default)]
  pub tag_matching: TagMatching,

  /// Lines that start a detached signature block in a tag message
  #[serde(default = "default_signature_markers")]
  pub signature_markers: Vec<String>,

  /// Remote to fetch tag objects from when fetching is requested
  #[serde(default = "default_remote")]
  pub remote: String,

  /// Run `git fetch --tags --force` before reading annotations
  #[serde(default)]
  pub fetch_tags: bool,

  /// Where the release notes file is written for the host release step
  #[serde(default = "default_notes_path")]
  pub notes_path: PathBuf,
}

fn default_signature_markers() -> Vec<String> {
  DEFAULT_SIGNATURE_MARKERS.iter().map(|m| m.to_string()).collect()
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_notes_path() -> PathBuf {
  PathBuf::from("target").join("shipgate").join("release_notes.md")
}

impl Default for ReleaseSettings {
  fn default() -> Self {
    Self {
      tag_matching: TagMatching::default(),
      signature_markers: default_signature_markers(),
      remote: default_remote(),
      fetch_tags: false,
      notes_path: default_notes_path(),
    }
  }
}

/// Pipeline gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
  /// Job name treated as the lint stage when reading an orchestrator `needs` file
  #[serde(default = "default_lint_job")]
  pub lint_job: String,

  /// Expected test matrix; every cell must report before the gate can allow
  #[serde(default)]
  pub matrix: MatrixConfig,
}

fn default_lint_job() -> String {
  "lint".to_string()
}

impl Default for GateSettings {
  fn default() -> Self {
    Self {
      lint_job: default_lint_job(),
      matrix: MatrixConfig::default(),
    }
  }
}

/// Test matrix declaration
///
/// # Example
///
/// ```toml
/// [gate.matrix]
/// platforms = ["ubuntu-latest", "windows-latest"]
/// versions = ["3.9", "3.12"]
/// cells = ["coverage"]
/// ```
///
/// expands to `ubuntu-latest/3.9`, `ubuntu-latest/3.12`, `windows-latest/3.9`,
/// `windows-latest/3.12` and `coverage`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatrixConfig {
  #[serde(default)]
  pub platforms: Vec<String>,
  #[serde(default)]
  pub versions: Vec<String>,
  /// Extra cells that are not part of the platform × version product
  #[serde(default)]
  pub cells: Vec<String>,
}

impl MatrixConfig {
  /// Whether any expected cell is declared
  pub fn is_declared(&self) -> bool {
    !self.platforms.is_empty() || !self.versions.is_empty() || !self.cells.is_empty()
  }

  /// Expand the declaration into cell names, in declaration order
  pub fn expected_cells(&self) -> Vec<String> {
    let mut cells = match (self.platforms.is_empty(), self.versions.is_empty()) {
      (false, false) => self
        .platforms
        .iter()
        .flat_map(|p| self.versions.iter().map(move |v| format!("{}/{}", p, v)))
        .collect(),
      (false, true) => self.platforms.clone(),
      (true, false) => self.versions.clone(),
      (true, true) => Vec::new(),
    };
    cells.extend(self.cells.iter().cloned());
    cells
  }

  /// Validate the matrix declaration
  pub fn validate(&self) -> ShipResult<()> {
    let mut seen = HashSet::new();
    for cell in self.expected_cells() {
      if cell.trim().is_empty() {
        return Err(invalid("gate.matrix", "cell names must not be empty"));
      }
      if !seen.insert(cell.clone()) {
        return Err(invalid("gate.matrix", format!("cell '{}' is declared twice", cell)));
      }
    }
    Ok(())
  }
}

/// External commands run by the publish stage
///
/// Each command is an argv array. Arguments may contain the placeholders
/// `{tag}` and `{version}`; an argument that is exactly `{artifacts}` expands
/// to one argument per collected artifact path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSettings {
  /// Directory the publish commands run in (relative to the repository root)
  #[serde(default = "default_workdir")]
  pub workdir: PathBuf,

  /// Glob selecting built artifacts (relative to `workdir`)
  #[serde(default = "default_artifacts")]
  pub artifacts: String,

  #[serde(default)]
  pub build: Option<Vec<String>>,

  /// Optional: artifacts are always collected and checksummed
  #[serde(default)]
  pub verify: Option<Vec<String>>,

  #[serde(default)]
  pub upload: Option<Vec<String>>,

  #[serde(default)]
  pub host: HostSettings,
}

fn default_workdir() -> PathBuf {
  PathBuf::from(".")
}

fn default_artifacts() -> String {
  "dist/*".to_string()
}

impl Default for PublishSettings {
  fn default() -> Self {
    Self {
      workdir: default_workdir(),
      artifacts: default_artifacts(),
      build: None,
      verify: None,
      upload: None,
      host: HostSettings::default(),
    }
  }
}

/// Hosting platform CLI used to create the release entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSettings {
  #[serde(default = "default_host_program")]
  pub program: String,
}

fn default_host_program() -> String {
  "gh".to_string()
}

impl Default for HostSettings {
  fn default() -> Self {
    Self {
      program: default_host_program(),
    }
  }
}

impl PublishSettings {
  /// Validate the publish configuration
  pub fn validate(&self) -> ShipResult<()> {
    glob::Pattern::new(&self.artifacts).map_err(|e| invalid("publish.artifacts", e.to_string()))?;

    for (field, argv) in [
      ("publish.build", &self.build),
      ("publish.verify", &self.verify),
      ("publish.upload", &self.upload),
    ] {
      if let Some(argv) = argv
        && argv.first().is_none_or(|program| program.trim().is_empty())
      {
        return Err(invalid(field, "command must name a program"));
      }
    }

    if self.host.program.trim().is_empty() {
      return Err(invalid("publish.host.program", "must not be empty"));
    }

    Ok(())
  }

  /// Commands required to actually publish (build and upload)
  pub fn require_commands(&self) -> ShipResult<(&[String], &[String])> {
    let build = self.build.as_deref().ok_or_else(|| {
      ShipError::Config(ConfigError::MissingField {
        field: "publish.build".to_string(),
      })
    })?;
    let upload = self.upload.as_deref().ok_or_else(|| {
      ShipError::Config(ConfigError::MissingField {
        field: "publish.upload".to_string(),
      })
    })?;
    Ok((build, upload))
  }
}

impl ReleaseSettings {
  /// Validate the release configuration
  pub fn validate(&self) -> ShipResult<()> {
    if self.signature_markers.is_empty() {
      return Err(invalid("release.signature_markers", "at least one marker is required"));
    }
    for marker in &self.signature_markers {
      if marker.trim().is_empty() {
        return Err(invalid("release.signature_markers", "markers must not be empty"));
      }
      if marker.contains('\n') || marker.contains('\r') {
        return Err(invalid(
          "release.signature_markers",
          format!("marker '{}' spans more than one line", marker.escape_debug()),
        ));
      }
    }
    if self.remote.trim().is_empty() {
      return Err(invalid("release.remote", "must not be empty"));
    }
    Ok(())
  }
}

fn invalid(field: &str, reason: impl Into<String>) -> ShipError {
  ShipError::Config(ConfigError::Invalid {
    field: field.to_string(),
    reason: reason.into(),
  })
}

impl ShipConfig {
  /// Default file name written by `shipgate init`
  pub const FILE_NAME: &'static str = "shipgate.toml";

  /// Find config file in search order: shipgate.toml, .shipgate.toml, .config/shipgate.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join(Self::FILE_NAME),
      path.join(".shipgate.toml"),
      path.join(".config").join(Self::FILE_NAME),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config (searches multiple locations, falls back to defaults)
  pub fn load(path: &Path) -> ShipResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!(root = %path.display(), "no shipgate config found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ShipConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate()?;
    tracing::debug!(path = %config_path.display(), "loaded shipgate config");

    Ok(config)
  }

  /// Validate every section
  pub fn validate(&self) -> ShipResult<()> {
    self.release.validate()?;
    self.gate.matrix.validate()?;
    self.publish.validate()?;
    Ok(())
  }
}
