//! Command-driven release backend
//!
//! Each publish step runs a configured argv in the publish working directory
//! with the inherited environment, so registry and host credentials come from
//! the CI job. Child stdout is redirected to stderr to keep `--json` output
//! clean.

use crate::core::config::ShipConfig;
use crate::core::error::{ResultExt, ShipResult};
use crate::release::artifact::{Artifact, collect_artifacts};
use crate::release::publisher::{PublishStep, ReleaseBackend, ReleaseEntry, StepError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Placeholder for the tag name
pub const TAG_PLACEHOLDER: &str = "{tag}";
/// Placeholder for the semver rendering of the tag
pub const VERSION_PLACEHOLDER: &str = "{version}";
/// Whole-argument placeholder expanding to one argument per artifact
pub const ARTIFACTS_PLACEHOLDER: &str = "{artifacts}";

/// Runs the configured publish commands
#[derive(Debug, Clone)]
pub struct CommandBackend {
  workdir: PathBuf,
  artifacts_glob: String,
  build: Vec<String>,
  verify: Option<Vec<String>>,
  upload: Vec<String>,
  host_program: String,
  notes_path: PathBuf,
  version: String,
}

impl CommandBackend {
  /// Build a backend from configuration
  ///
  /// Fails when `publish.build` or `publish.upload` is not configured.
  pub fn from_config(repo_root: &Path, config: &ShipConfig, version: impl Into<String>) -> ShipResult<Self> {
    let (build, upload) = config.publish.require_commands()?;
    Ok(Self {
      // Collecting components drops interior `.` segments before globbing
      workdir: repo_root.join(&config.publish.workdir).components().collect(),
      artifacts_glob: config.publish.artifacts.clone(),
      build: build.to_vec(),
      verify: config.publish.verify.clone(),
      upload: upload.to_vec(),
      host_program: config.publish.host.program.clone(),
      notes_path: repo_root.join(&config.release.notes_path),
      version: version.into(),
    })
  }

  /// The commands `publish` would run, in order, for a dry run
  ///
  /// Artifacts are not known yet, so `{artifacts}` renders as the glob.
  pub fn planned_commands(&self, entry: &ReleaseEntry) -> Vec<(PublishStep, Vec<String>)> {
    let placeholder = [self.artifacts_glob.clone()];
    let mut plan = vec![(PublishStep::Build, self.expand(&self.build, &entry.tag, &placeholder))];
    if let Some(verify) = &self.verify {
      plan.push((PublishStep::Verify, self.expand(verify, &entry.tag, &placeholder)));
    }
    plan.push((PublishStep::Upload, self.expand(&self.upload, &entry.tag, &placeholder)));
    plan.push((PublishStep::CreateRelease, self.release_command(entry)));
    plan
  }

  fn expand(&self, argv: &[String], tag: &str, artifacts: &[String]) -> Vec<String> {
    expand_placeholders(argv, tag, &self.version, artifacts)
  }

  fn release_command(&self, entry: &ReleaseEntry) -> Vec<String> {
    let mut argv = vec![
      self.host_program.clone(),
      "release".to_string(),
      "create".to_string(),
      entry.tag.clone(),
      "--title".to_string(),
      entry.title.clone(),
      "--notes-file".to_string(),
      self.notes_path.display().to_string(),
    ];
    if entry.draft {
      argv.push("--draft".to_string());
    }
    if entry.prerelease {
      argv.push("--prerelease".to_string());
    }
    argv
  }

  fn run(&self, argv: &[String]) -> Result<(), StepError> {
    let Some((program, args)) = argv.split_first() else {
      return Err(StepError::new(None, "empty command"));
    };

    tracing::info!(command = %argv.join(" "), workdir = %self.workdir.display(), "running command");
    let status = Command::new(program)
      .args(args)
      .current_dir(&self.workdir)
      .stdin(Stdio::null())
      .stdout(Stdio::from(std::io::stderr()))
      .status()
      .map_err(|e| StepError::new(None, format!("Failed to start `{}`: {}", program, e)))?;

    if status.success() {
      Ok(())
    } else {
      Err(StepError::new(status.code(), format!("Command: {}", argv.join(" "))))
    }
  }

  fn write_notes(&self, body: &str) -> ShipResult<()> {
    if let Some(parent) = self.notes_path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&self.notes_path, body).with_context(|| format!("Failed to write {}", self.notes_path.display()))
  }
}

impl ReleaseBackend for CommandBackend {
  fn build(&self, tag: &str) -> Result<(), StepError> {
    self.run(&self.expand(&self.build, tag, &[]))
  }

  fn verify(&self, tag: &str) -> Result<Vec<Artifact>, StepError> {
    let artifacts =
      collect_artifacts(&self.workdir, &self.artifacts_glob).map_err(|e| StepError::new(None, e.to_string()))?;
    if artifacts.is_empty() {
      return Err(StepError::new(
        None,
        format!("No artifacts match '{}' in {}", self.artifacts_glob, self.workdir.display()),
      ));
    }

    if let Some(verify) = &self.verify {
      self.run(&self.expand(verify, tag, &artifact_args(&artifacts)))?;
    }
    Ok(artifacts)
  }

  fn upload(&self, tag: &str, artifacts: &[Artifact]) -> Result<(), StepError> {
    self.run(&self.expand(&self.upload, tag, &artifact_args(artifacts)))
  }

  fn create_release(&self, entry: &ReleaseEntry) -> Result<(), StepError> {
    self
      .write_notes(&entry.body)
      .map_err(|e| StepError::new(None, e.to_string()))?;
    self.run(&self.release_command(entry))
  }
}

fn artifact_args(artifacts: &[Artifact]) -> Vec<String> {
  artifacts.iter().map(|a| a.path.display().to_string()).collect()
}

/// Substitute `{tag}` and `{version}` inside arguments, and expand a
/// standalone `{artifacts}` argument into `artifacts`
pub fn expand_placeholders(argv: &[String], tag: &str, version: &str, artifacts: &[String]) -> Vec<String> {
  let mut expanded = Vec::with_capacity(argv.len() + artifacts.len());
  for arg in argv {
    if arg == ARTIFACTS_PLACEHOLDER {
      expanded.extend(artifacts.iter().cloned());
    } else {
      expanded.push(arg.replace(TAG_PLACEHOLDER, tag).replace(VERSION_PLACEHOLDER, version));
    }
  }
  expanded
}
