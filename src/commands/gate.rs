//! `shipgate gate`: evaluate the pipeline gate

use crate::core::config::ShipConfig;
use crate::core::error::{GateError, ShipError, ShipResult};
use crate::gate::{GateDecision, OutcomeReport};
use std::env;
use std::path::PathBuf;

/// Where stage outcomes come from
#[derive(Debug, Clone)]
pub enum GateInput {
  /// `--lint <outcome>` plus repeated `--test <cell>=<outcome>`
  Flags { lint: String, tests: Vec<String> },
  /// `--report <path>`
  Report(PathBuf),
  /// `--needs <path>`
  Needs(PathBuf),
}

impl GateInput {
  pub fn load(&self, config: &ShipConfig) -> ShipResult<OutcomeReport> {
    match self {
      GateInput::Flags { lint, tests } => OutcomeReport::from_flags(lint, tests),
      GateInput::Report(path) => OutcomeReport::from_report_file(path),
      GateInput::Needs(path) => OutcomeReport::from_needs_file(path, &config.gate.lint_job),
    }
  }
}

/// Evaluate the gate for `input` under `config`
pub fn decide(config: &ShipConfig, input: &GateInput) -> ShipResult<GateDecision> {
  Ok(input.load(config)?.evaluate(&config.gate.matrix))
}

/// Error returned for a blocking decision
pub fn blocked_error(decision: &GateDecision) -> ShipError {
  GateError::Blocked {
    blockers: decision.blockers().iter().map(ToString::to_string).collect(),
  }
  .into()
}

pub fn print_decision(decision: &GateDecision) {
  match decision {
    GateDecision::Allow => println!("✅ Gate: allow"),
    GateDecision::Block { blockers } => {
      println!("🚫 Gate: block");
      for blocker in blockers {
        println!("   - {}", blocker);
      }
    }
  }
}

/// Run the gate command
pub fn run_gate(input: GateInput, json: bool) -> ShipResult<()> {
  let current_dir = env::current_dir()?;
  let config = ShipConfig::load(&current_dir)?;
  let decision = decide(&config, &input)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&decision)?);
  } else {
    print_decision(&decision);
  }

  if decision.is_allowed() {
    Ok(())
  } else {
    Err(blocked_error(&decision))
  }
}
