//! Tests for the `notes` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_notes_strip_signature() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v1.2.0rc3", SIGNED_MESSAGE)?;

  let output = run_shipgate(&repo.path, &["notes", "v1.2.0rc3"])?;
  assert_eq!(stdout(&output), "Fixed bug X\n");
  Ok(())
}

#[test]
fn test_notes_without_signature_kept_verbatim() -> Result<()> {
  let repo = TestRepo::new()?;
  let message = "Release 2.0\n\n- new parser\n- faster startup\n";
  repo.tag_annotated("v2.0.0", message)?;

  let output = run_shipgate(&repo.path, &["notes", "v2.0.0"])?;
  assert_eq!(stdout(&output), message);
  Ok(())
}

#[test]
fn test_notes_written_to_file() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v1.0.0", SIGNED_MESSAGE)?;

  run_shipgate(&repo.path, &["notes", "v1.0.0", "--output", "out/notes.md"])?;
  assert_eq!(repo.read_file("out/notes.md")?, "Fixed bug X\n");
  Ok(())
}

#[test]
fn test_lightweight_tag_is_shallow_history() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_lightweight("v1.0.0")?;

  let output = shipgate(&repo.path, &["notes", "v1.0.0"])?;
  assert_eq!(exit_code(&output), 2);
  assert!(stdout(&output).is_empty());
  assert!(stderr(&output).contains("annotated tag object"));
  Ok(())
}

#[test]
fn test_missing_tag_is_shallow_history() -> Result<()> {
  let repo = TestRepo::new()?;

  let output = shipgate(&repo.path, &["notes", "v9.9.9"])?;
  assert_eq!(exit_code(&output), 2);
  assert!(stderr(&output).contains("does not exist locally"));
  Ok(())
}

#[test]
fn test_shallow_clone_is_refused() -> Result<()> {
  let origin = TestRepo::new()?;
  origin.tag_annotated("v1.0.0", SIGNED_MESSAGE)?;

  let clone_root = tempfile::TempDir::new()?;
  let url = format!("file://{}", origin.path.display());
  git(clone_root.path(), &["clone", "--depth", "1", &url, "shallow"])?;
  let shallow = clone_root.path().join("shallow");

  let output = shipgate(&shallow, &["notes", "v1.0.0"])?;
  assert_eq!(exit_code(&output), 2);
  assert!(stdout(&output).is_empty());
  assert!(stderr(&output).contains("shallow clone"));
  Ok(())
}

#[test]
fn test_fetch_recovers_tag_objects() -> Result<()> {
  let origin = TestRepo::new()?;
  origin.tag_annotated("v1.0.0", SIGNED_MESSAGE)?;

  let clone_root = tempfile::TempDir::new()?;
  let url = format!("file://{}", origin.path.display());
  git(clone_root.path(), &["clone", "--no-tags", &url, "full"])?;
  let clone = clone_root.path().join("full");

  let before = shipgate(&clone, &["notes", "v1.0.0"])?;
  assert_eq!(exit_code(&before), 2);

  let after = run_shipgate(&clone, &["notes", "v1.0.0", "--fetch"])?;
  assert_eq!(stdout(&after), "Fixed bug X\n");
  Ok(())
}

#[test]
fn test_notes_outside_repository() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  let output = shipgate(dir.path(), &["notes", "v1.0.0"])?;
  assert_ne!(exit_code(&output), 0);
  Ok(())
}

#[test]
fn test_non_utf8_annotation_is_reported() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v1.0.0", b"Caf\xe9 release\n")?;

  let output = shipgate(&repo.path, &["notes", "v1.0.0"])?;
  assert_eq!(exit_code(&output), 2);
  assert!(stderr(&output).contains("is not UTF-8"));
  assert!(stdout(&output).is_empty());
  Ok(())
}
