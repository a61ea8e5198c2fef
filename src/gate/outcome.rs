//! Stage outcomes reported by the orchestrator

use crate::core::error::{GateError, ShipError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Terminal outcome of one pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageOutcome {
  Success,
  Failure,
  Skipped,
}

impl fmt::Display for StageOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StageOutcome::Success => write!(f, "success"),
      StageOutcome::Failure => write!(f, "failure"),
      StageOutcome::Skipped => write!(f, "skipped"),
    }
  }
}

impl FromStr for StageOutcome {
  type Err = ShipError;

  /// Parse an orchestrator status string
  ///
  /// A cancelled job counts as a failure, never as skipped.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "success" => Ok(StageOutcome::Success),
      "failure" => Ok(StageOutcome::Failure),
      "skipped" => Ok(StageOutcome::Skipped),
      "cancelled" | "canceled" => Ok(StageOutcome::Failure),
      _ => Err(GateError::InvalidOutcome { input: s.to_string() }.into()),
    }
  }
}

/// Which stage an outcome belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase", tag = "stage", content = "cell")]
pub enum StageId {
  Lint,
  /// One cell of the test matrix
  Test(String),
}

impl fmt::Display for StageId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StageId::Lint => write!(f, "lint"),
      StageId::Test(cell) => write!(f, "test[{}]", cell),
    }
  }
}
