//! Tests for the `classify` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_classify_prerelease_json() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = run_shipgate(&repo.path, &["classify", "v1.2.0rc3", "--json"])?;
  let json = json_stdout(&output)?;

  assert_eq!(json["classification"], "prerelease");
  assert_eq!(json["prerelease"], true);
  assert_eq!(json["version"], "1.2.0-rc.3");
  Ok(())
}

#[test]
fn test_classify_never_fails() -> Result<()> {
  let repo = TestRepo::new()?;
  for tag in ["v1.2.3", "not-a-version", "", "v1.2", "refs/tags/v1.0.0"] {
    let output = run_shipgate(&repo.path, &["classify", tag, "--json"])?;
    assert!(json_stdout(&output)?["classification"].is_string());
  }
  Ok(())
}

#[test]
fn test_anchored_by_default_loose_on_request() -> Result<()> {
  let repo = TestRepo::new()?;

  let anchored = json_stdout(&run_shipgate(&repo.path, &["classify", "refs/tags/v1.0.0", "--json"])?)?;
  assert_eq!(anchored["classification"], "not-a-release");

  let loose = json_stdout(&run_shipgate(
    &repo.path,
    &["classify", "refs/tags/v1.0.0", "--loose", "--json"],
  )?)?;
  assert_eq!(loose["classification"], "final");
  Ok(())
}

#[test]
fn test_loose_from_config() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_config("[release]\ntag_matching = \"loose\"\n")?;

  let json = json_stdout(&run_shipgate(&repo.path, &["classify", "release-v2.0.0b1", "--json"])?)?;
  assert_eq!(json["classification"], "prerelease");
  assert_eq!(json["matching"], "loose");
  Ok(())
}

#[test]
fn test_invalid_config_is_validation_error() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_config("[publish]\nartifacts = \"dist/[\"\n")?;

  let output = shipgate(&repo.path, &["classify", "v1.0.0"])?;
  assert_eq!(exit_code(&output), 3, "stderr: {}", stderr(&output));
  Ok(())
}
