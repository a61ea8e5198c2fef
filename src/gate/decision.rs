//! The publish gate
//!
//! `Allow` iff lint succeeded and every test cell succeeded. Anything else
//! blocks and names the stages responsible. The gate is a pure function of its
//! inputs and makes no assumption about how the run was triggered.

use crate::gate::outcome::{StageId, StageOutcome};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Why a stage blocks publishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockReason {
  /// Stage failed or was cancelled
  Failed,
  /// Stage was skipped; a skip is never treated as success
  Skipped,
  /// Expected matrix cell never reported
  Missing,
}

impl fmt::Display for BlockReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BlockReason::Failed => write!(f, "failed"),
      BlockReason::Skipped => write!(f, "skipped"),
      BlockReason::Missing => write!(f, "missing"),
    }
  }
}

/// A stage that prevents publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blocker {
  #[serde(flatten)]
  pub stage: StageId,
  pub reason: BlockReason,
}

impl fmt::Display for Blocker {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.stage, self.reason)
  }
}

/// Result of evaluating the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "decision")]
pub enum GateDecision {
  Allow,
  /// Never empty
  Block { blockers: Vec<Blocker> },
}

impl GateDecision {
  pub fn is_allowed(&self) -> bool {
    matches!(self, GateDecision::Allow)
  }

  pub fn blockers(&self) -> &[Blocker] {
    match self {
      GateDecision::Allow => &[],
      GateDecision::Block { blockers } => blockers,
    }
  }

  fn from_blockers(blockers: Vec<Blocker>) -> Self {
    if blockers.is_empty() {
      GateDecision::Allow
    } else {
      GateDecision::Block { blockers }
    }
  }
}

fn blocker_for(stage: StageId, outcome: StageOutcome) -> Option<Blocker> {
  let reason = match outcome {
    StageOutcome::Success => return None,
    StageOutcome::Failure => BlockReason::Failed,
    StageOutcome::Skipped => BlockReason::Skipped,
  };
  Some(Blocker { stage, reason })
}

fn stage_blockers(lint: StageOutcome, tests: &[(String, StageOutcome)]) -> Vec<Blocker> {
  blocker_for(StageId::Lint, lint)
    .into_iter()
    .chain(
      tests
        .iter()
        .filter_map(|(cell, outcome)| blocker_for(StageId::Test(cell.clone()), *outcome)),
    )
    .collect()
}

/// Decide whether the publish stage may run
///
/// An empty `tests` list imposes no test condition; declare a matrix and use
/// [`evaluate_matrix`] to require specific cells.
pub fn evaluate(lint: StageOutcome, tests: &[(String, StageOutcome)]) -> GateDecision {
  let decision = GateDecision::from_blockers(stage_blockers(lint, tests));
  log_decision(&decision, tests.len());
  decision
}

/// `evaluate`, additionally blocking on every `expected` cell without an outcome
///
/// This is the join barrier: a partial set of results can never allow.
pub fn evaluate_matrix(lint: StageOutcome, tests: &[(String, StageOutcome)], expected: &[String]) -> GateDecision {
  let reported: BTreeSet<&str> = tests.iter().map(|(cell, _)| cell.as_str()).collect();
  let missing = expected
    .iter()
    .filter(|cell| !reported.contains(cell.as_str()))
    .map(|cell| Blocker {
      stage: StageId::Test(cell.clone()),
      reason: BlockReason::Missing,
    });

  let mut blockers = stage_blockers(lint, tests);
  blockers.extend(missing);

  tracing::debug!(expected = expected.len(), reported = reported.len(), "matrix barrier evaluated");
  let decision = GateDecision::from_blockers(blockers);
  log_decision(&decision, tests.len());
  decision
}

fn log_decision(decision: &GateDecision, cells: usize) {
  match decision {
    GateDecision::Allow => tracing::info!(cells, "gate allows publishing"),
    GateDecision::Block { blockers } => {
      for blocker in blockers {
        tracing::warn!(stage = %blocker.stage, reason = %blocker.reason, "gate blocked");
      }
    }
  }
}
