//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_creates_config() -> Result<()> {
  let repo = TestRepo::new()?;
  run_shipgate(&repo.path, &["init"])?;

  assert!(repo.file_exists("shipgate.toml"));
  let config = repo.read_file("shipgate.toml")?;
  assert!(config.contains("[release]"));
  assert!(config.contains("[gate.matrix]"));
  assert!(config.contains("[publish.host]"));

  // The written template must load cleanly
  run_shipgate(&repo.path, &["classify", "v1.0.0"])?;
  Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_config("[gate]\nlint_job = \"check\"\n")?;

  let output = shipgate(&repo.path, &["init"])?;
  assert_eq!(exit_code(&output), 1);
  assert!(repo.read_file("shipgate.toml")?.contains("check"));

  run_shipgate(&repo.path, &["init", "--force"])?;
  assert!(!repo.read_file("shipgate.toml")?.contains("check"));
  Ok(())
}
