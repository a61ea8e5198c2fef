//! Tests for the `gate` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_gate_allows_when_everything_succeeded() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = run_shipgate(
    &repo.path,
    &["gate", "--lint", "success", "--test", "linux=success", "--test", "macos=success", "--json"],
  )?;
  assert_eq!(json_stdout(&output)?["decision"], "allow");
  Ok(())
}

#[test]
fn test_gate_blocks_and_names_the_cell() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = shipgate(
    &repo.path,
    &["gate", "--lint", "success", "--test", "linux=success", "--test", "macos=failure", "--json"],
  )?;

  assert_eq!(exit_code(&output), 4);
  let json = json_stdout(&output)?;
  assert_eq!(json["decision"], "block");
  assert_eq!(json["blockers"][0]["cell"], "macos");
  assert_eq!(json["blockers"][0]["reason"], "failed");
  Ok(())
}

#[test]
fn test_gate_lint_skipped_blocks() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = shipgate(&repo.path, &["gate", "--lint", "skipped"])?;
  assert_eq!(exit_code(&output), 4);
  assert!(stdout(&output).contains("lint skipped"));
  Ok(())
}

#[test]
fn test_gate_needs_context_with_cancelled_job() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file(
    "needs.json",
    r#"{"lint": {"result": "success"}, "test-linux": {"result": "success"}, "test-macos": {"result": "cancelled"}}"#,
  )?;

  let output = shipgate(&repo.path, &["gate", "--needs", "needs.json", "--json"])?;
  assert_eq!(exit_code(&output), 4);
  let json = json_stdout(&output)?;
  assert_eq!(json["blockers"][0]["cell"], "test-macos");
  assert_eq!(json["blockers"][0]["reason"], "failed");
  Ok(())
}

#[test]
fn test_gate_matrix_requires_every_cell() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_config("[gate.matrix]\nplatforms = [\"linux\", \"macos\"]\nversions = [\"3.12\"]\n")?;
  repo.write_file("report.json", r#"{"lint": "success", "tests": {"linux/3.12": "success"}}"#)?;

  let output = shipgate(&repo.path, &["gate", "--report", "report.json", "--json"])?;
  assert_eq!(exit_code(&output), 4);
  let json = json_stdout(&output)?;
  assert_eq!(json["blockers"][0]["cell"], "macos/3.12");
  assert_eq!(json["blockers"][0]["reason"], "missing");
  Ok(())
}

#[test]
fn test_gate_rejects_unknown_outcome() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = shipgate(&repo.path, &["gate", "--lint", "green"])?;
  assert_eq!(exit_code(&output), 3);
  assert!(stderr(&output).contains("Unknown stage outcome"));
  Ok(())
}

#[test]
fn test_gate_rejects_repeated_needs_job() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_file(
    "needs.json",
    r#"{"lint": {"result": "failure"}, "lint": {"result": "success"}, "test": {"result": "success"}}"#,
  )?;

  let output = shipgate(&repo.path, &["gate", "--needs", "needs.json", "--json"])?;
  assert_eq!(exit_code(&output), 1);
  assert!(stderr(&output).contains("reported more than once"));
  assert!(stdout(&output).trim().is_empty());
  Ok(())
}
