//! Progress bar for the publish steps
//!
//! Uses `linya`, which draws to stderr and leaves stdout untouched.

use crate::release::publisher::{PublishStep, StepObserver};
use linya::{Bar, Progress};

/// One bar advancing once per completed publish step
pub struct StepProgress {
  progress: Progress,
  bar: Bar,
}

impl StepProgress {
  pub fn new(label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(PublishStep::ALL.len(), label.into());
    Self { progress, bar }
  }
}

impl StepObserver for StepProgress {
  fn finished(&mut self, step: PublishStep, succeeded: bool) {
    if succeeded {
      self.progress.inc_and_draw(&self.bar, 1);
    } else {
      eprintln!("❌ {} failed", step);
    }
  }
}
