//! Publish stage orchestration
//!
//! Runs build → verify → upload → create release, in that order, stopping at
//! the first failure. Every step is an irreversible external call, so nothing
//! is retried here; a failed publish is re-run by a human as a whole.

use crate::core::error::{ReleaseError, ShipResult};
use crate::release::artifact::Artifact;
use crate::release::classify::ReleaseClassification;
use crate::release::notes::ReleaseNote;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One external step of the publish stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishStep {
  Build,
  Verify,
  Upload,
  CreateRelease,
}

impl PublishStep {
  /// Execution order
  pub const ALL: [PublishStep; 4] = [
    PublishStep::Build,
    PublishStep::Verify,
    PublishStep::Upload,
    PublishStep::CreateRelease,
  ];

  pub fn name(self) -> &'static str {
    match self {
      PublishStep::Build => "build",
      PublishStep::Verify => "verify",
      PublishStep::Upload => "upload",
      PublishStep::CreateRelease => "create-release",
    }
  }
}

impl fmt::Display for PublishStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Failure reported by an external step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepError {
  /// Exit code of the external command, if it exited normally
  pub code: Option<i32>,
  pub detail: String,
}

impl StepError {
  pub fn new(code: Option<i32>, detail: impl Into<String>) -> Self {
    Self {
      code,
      detail: detail.into(),
    }
  }
}

/// The release entry created on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseEntry {
  pub tag: String,
  pub title: String,
  pub body: String,
  pub draft: bool,
  pub prerelease: bool,
}

impl ReleaseEntry {
  pub fn new(tag: &str, note: &ReleaseNote, classification: ReleaseClassification) -> Self {
    Self {
      tag: tag.to_string(),
      title: tag.to_string(),
      body: note.body.clone(),
      draft: false,
      prerelease: classification.is_prerelease(),
    }
  }
}

/// External collaborators behind the publish stage
///
/// Implementations must not retry on their own.
pub trait ReleaseBackend {
  /// Build the distributable artifact(s)
  fn build(&self, tag: &str) -> Result<(), StepError>;

  /// Check integrity and metadata of what was built, returning the artifacts
  fn verify(&self, tag: &str) -> Result<Vec<Artifact>, StepError>;

  /// Upload verified artifacts to the package registry
  fn upload(&self, tag: &str, artifacts: &[Artifact]) -> Result<(), StepError>;

  /// Create the release entry on the hosting platform
  fn create_release(&self, entry: &ReleaseEntry) -> Result<(), StepError>;
}

impl<T: ReleaseBackend + ?Sized> ReleaseBackend for &T {
  fn build(&self, tag: &str) -> Result<(), StepError> {
    (**self).build(tag)
  }

  fn verify(&self, tag: &str) -> Result<Vec<Artifact>, StepError> {
    (**self).verify(tag)
  }

  fn upload(&self, tag: &str, artifacts: &[Artifact]) -> Result<(), StepError> {
    (**self).upload(tag, artifacts)
  }

  fn create_release(&self, entry: &ReleaseEntry) -> Result<(), StepError> {
    (**self).create_release(entry)
  }
}

/// Receives step progress (used for the terminal progress bar)
pub trait StepObserver {
  fn started(&mut self, _step: PublishStep) {}
  fn finished(&mut self, _step: PublishStep, _succeeded: bool) {}
}

impl StepObserver for () {}

/// Timing of one completed step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
  pub step: PublishStep,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
}

/// Outcome of a successful publish
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
  pub tag: String,
  pub classification: ReleaseClassification,
  pub artifacts: Vec<Artifact>,
  pub release: ReleaseEntry,
  pub steps: Vec<StepRecord>,
  pub published_at: DateTime<Utc>,
}

/// Drives the publish steps for one tag
pub struct ReleasePublisher<B> {
  backend: B,
  tag: String,
}

impl<B: ReleaseBackend> ReleasePublisher<B> {
  pub fn new(backend: B, tag: impl Into<String>) -> Self {
    Self {
      backend,
      tag: tag.into(),
    }
  }

  /// Publish the tag
  ///
  /// The caller must already hold an `Allow` gate decision. A `NotARelease`
  /// classification is refused before any step runs.
  pub fn publish(&self, classification: ReleaseClassification, note: &ReleaseNote) -> ShipResult<PublishResult> {
    self.publish_observed(classification, note, &mut ())
  }

  /// `publish`, reporting step progress to `observer`
  pub fn publish_observed(
    &self,
    classification: ReleaseClassification,
    note: &ReleaseNote,
    observer: &mut dyn StepObserver,
  ) -> ShipResult<PublishResult> {
    if !classification.is_release() {
      return Err(
        ReleaseError::InvalidClassification {
          tag: self.tag.clone(),
        }
        .into(),
      );
    }

    let entry = ReleaseEntry::new(&self.tag, note, classification);
    let mut steps = Vec::with_capacity(PublishStep::ALL.len());
    tracing::info!(tag = %self.tag, %classification, "publishing release");

    self.run_step(PublishStep::Build, observer, &mut steps, || self.backend.build(&self.tag))?;
    let artifacts = self.run_step(PublishStep::Verify, observer, &mut steps, || self.backend.verify(&self.tag))?;
    self.run_step(PublishStep::Upload, observer, &mut steps, || {
      self.backend.upload(&self.tag, &artifacts)
    })?;
    self.run_step(PublishStep::CreateRelease, observer, &mut steps, || {
      self.backend.create_release(&entry)
    })?;

    Ok(PublishResult {
      tag: self.tag.clone(),
      classification,
      artifacts,
      release: entry,
      steps,
      published_at: Utc::now(),
    })
  }

  fn run_step<T>(
    &self,
    step: PublishStep,
    observer: &mut dyn StepObserver,
    records: &mut Vec<StepRecord>,
    call: impl FnOnce() -> Result<T, StepError>,
  ) -> ShipResult<T> {
    tracing::info!(tag = %self.tag, %step, "running publish step");
    observer.started(step);
    let started_at = Utc::now();

    match call() {
      Ok(value) => {
        observer.finished(step, true);
        records.push(StepRecord {
          step,
          started_at,
          finished_at: Utc::now(),
        });
        Ok(value)
      }
      Err(err) => {
        observer.finished(step, false);
        tracing::error!(tag = %self.tag, %step, code = ?err.code, "publish step failed, aborting remaining steps");
        Err(
          ReleaseError::StepFailed {
            step: step.name().to_string(),
            code: err.code,
            detail: err.detail,
          }
          .into(),
        )
      }
    }
  }
}
