//! Collecting stage outcomes from the CLI, a report file, or the orchestrator
//!
//! Report file:
//!
//! ```json
//! { "lint": "success", "tests": { "linux/3.12": "success", "macos/3.12": "failure" } }
//! ```
//!
//! Orchestrator `needs` context (one entry per upstream job):
//!
//! ```json
//! { "lint": { "result": "success" }, "test-linux": { "result": "cancelled", "outputs": {} } }
//! ```

use crate::core::config::MatrixConfig;
use crate::core::error::{GateError, ResultExt, ShipError, ShipResult};
use crate::gate::decision::{GateDecision, evaluate, evaluate_matrix};
use crate::gate::outcome::StageOutcome;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

/// Every outcome the gate needs for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeReport {
  pub lint: StageOutcome,
  pub tests: Vec<(String, StageOutcome)>,
}

#[derive(Deserialize)]
struct ReportFile {
  lint: String,
  #[serde(default)]
  tests: Entries<String>,
}

#[derive(Deserialize)]
struct NeedsJob {
  result: String,
}

/// A JSON object read as its entries in document order
///
/// Map types keep only the last value of a repeated key, which would let a
/// later `success` hide an earlier `failure`. Entries keep every key so
/// duplicates can be rejected.
struct Entries<V>(Vec<(String, V)>);

impl<V> Default for Entries<V> {
  fn default() -> Self {
    Self(Vec::new())
  }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Entries<V> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
      type Value = Entries<V>;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a JSON object")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry()? {
          entries.push(entry);
        }
        Ok(Entries(entries))
      }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
  }
}

/// Record `name` as reported, failing if it already was
fn claim(seen: &mut BTreeSet<String>, name: &str) -> ShipResult<()> {
  if seen.insert(name.to_string()) {
    Ok(())
  } else {
    Err(ShipError::message(format!("'{}' reported more than once", name)))
  }
}

impl OutcomeReport {
  /// Build from `--lint <outcome>` and repeated `--test <cell>=<outcome>`
  pub fn from_flags(lint: &str, tests: &[String]) -> ShipResult<Self> {
    let lint: StageOutcome = lint.parse()?;
    let mut seen = BTreeSet::new();
    let mut parsed = Vec::with_capacity(tests.len());

    for entry in tests {
      let Some((cell, outcome)) = entry.split_once('=') else {
        return Err(ShipError::with_help(
          format!("Invalid --test value '{}'", entry),
          "Use --test <cell>=<outcome>, e.g. --test linux/3.12=success",
        ));
      };
      let cell = cell.trim();
      if cell.is_empty() {
        return Err(ShipError::message(format!("Invalid --test value '{}': empty cell name", entry)));
      }
      claim(&mut seen, cell)?;
      parsed.push((cell.to_string(), outcome.parse::<StageOutcome>()?));
    }

    Ok(Self { lint, tests: parsed })
  }

  /// Parse a report file body
  pub fn from_report_json(text: &str) -> ShipResult<Self> {
    let raw: ReportFile = serde_json::from_str(text).context("Invalid gate report")?;
    let mut seen = BTreeSet::new();
    let mut tests = Vec::with_capacity(raw.tests.0.len());
    for (cell, outcome) in raw.tests.0 {
      claim(&mut seen, &cell)?;
      tests.push((cell, outcome.parse::<StageOutcome>()?));
    }
    tests.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Self {
      lint: raw.lint.parse()?,
      tests,
    })
  }

  /// Parse an orchestrator `needs` context
  ///
  /// `lint_job` is the lint stage; every other job is a test cell.
  pub fn from_needs_json(text: &str, lint_job: &str) -> ShipResult<Self> {
    let Entries(jobs) = serde_json::from_str::<Entries<NeedsJob>>(text).context("Invalid needs context")?;

    let mut seen = BTreeSet::new();
    let mut lint = None;
    let mut tests = Vec::new();
    for (job, NeedsJob { result }) in jobs {
      claim(&mut seen, &job)?;
      let outcome: StageOutcome = result.parse().map_err(|_| {
        ShipError::Gate(GateError::InvalidOutcome {
          input: format!("{}: {}", job, result),
        })
      })?;
      if job == lint_job {
        lint = Some(outcome);
      } else {
        tests.push((job, outcome));
      }
    }

    tests.sort_by(|a, b| a.0.cmp(&b.0));
    let lint = lint.ok_or_else(|| {
      ShipError::with_help(
        format!("Needs context has no '{}' job", lint_job),
        "Set `gate.lint_job` in shipgate.toml to the name of the lint job.",
      )
    })?;
    Ok(Self { lint, tests })
  }

  pub fn from_report_file(path: &Path) -> ShipResult<Self> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Self::from_report_json(&text)
  }

  pub fn from_needs_file(path: &Path, lint_job: &str) -> ShipResult<Self> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Self::from_needs_json(&text, lint_job)
  }

  /// Evaluate the gate, applying the matrix barrier when a matrix is declared
  pub fn evaluate(&self, matrix: &MatrixConfig) -> GateDecision {
    tracing::debug!(lint = %self.lint, cells = self.tests.len(), "evaluating gate");
    if matrix.is_declared() {
      evaluate_matrix(self.lint, &self.tests, &matrix.expected_cells())
    } else {
      evaluate(self.lint, &self.tests)
    }
  }
}
