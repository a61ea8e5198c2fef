//! Tests for the `route` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_route_tag_and_branch() -> Result<()> {
  let repo = TestRepo::new()?;

  let tag = json_stdout(&run_shipgate(&repo.path, &["route", "--ref", "refs/tags/v1.0.0", "--json"])?)?;
  assert_eq!(tag["route"], "tag");
  assert_eq!(tag["name"], "v1.0.0");

  let branch = json_stdout(&run_shipgate(&repo.path, &["route", "--ref", "refs/heads/main", "--json"])?)?;
  assert_eq!(branch["route"], "branch");
  Ok(())
}

#[test]
fn test_route_skip_ci() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = run_shipgate(
    &repo.path,
    &["route", "--ref", "refs/tags/v1.0.0", "--message", "chore: bump [ci skip]"],
  )?;
  assert!(stdout(&output).contains("skipped"));
  Ok(())
}
