//! Tests for the `ship` command (the publish stage)

use crate::helpers::*;
use anyhow::Result;

/// Config whose build, upload and host release steps leave marker files behind
#[cfg(unix)]
fn publish_config(repo: &TestRepo, build: &str) -> Result<()> {
  let gh = repo.write_script("tools/gh", "echo \"$@\" > \"$(dirname \"$0\")/../gh-args.txt\"")?;
  repo.write_config(&format!(
    r#"[publish]
artifacts = "dist/*"
build = ["sh", "-c", '{build}']
verify = ["sh", "-c", 'test -f "$0"', "{{artifacts}}"]
upload = ["sh", "-c", 'echo "$@" > uploaded.txt', "upload", "{{artifacts}}"]

[publish.host]
program = "{gh}"
"#,
    build = build,
    gh = gh.display()
  ))
}

#[cfg(unix)]
const BUILD_OK: &str = "mkdir -p dist && echo {version} > dist/pkg-{version}.tar.gz && touch built.marker";

#[cfg(unix)]
#[test]
fn test_prerelease_is_published_as_prerelease() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v1.2.0rc3", SIGNED_MESSAGE)?;
  publish_config(&repo, BUILD_OK)?;

  let output = run_shipgate(
    &repo.path,
    &[
      "ship", "v1.2.0rc3", "--lint", "success", "--test", "linux=success", "--test", "macos=success", "--apply",
      "--json",
    ],
  )?;

  let json = json_stdout(&output)?;
  assert_eq!(json["classification"], "prerelease");
  assert_eq!(json["release"]["prerelease"], true);
  assert_eq!(json["release"]["body"], "Fixed bug X\n");
  assert_eq!(json["artifacts"][0]["path"], "dist/pkg-1.2.0-rc.3.tar.gz");
  assert_eq!(json["steps"].as_array().map(Vec::len), Some(4));

  assert!(repo.file_exists("built.marker"));
  assert_eq!(repo.read_file("uploaded.txt")?.trim(), "dist/pkg-1.2.0-rc.3.tar.gz");

  let gh_args = repo.read_file("gh-args.txt")?;
  assert!(gh_args.starts_with("release create v1.2.0rc3 --title v1.2.0rc3 --notes-file "));
  assert!(gh_args.trim_end().ends_with("--prerelease"));
  assert_eq!(repo.read_file("target/shipgate/release_notes.md")?, "Fixed bug X\n");
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_final_release_from_tag_ref() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v2.0.0", "Release 2.0.0\n")?;
  publish_config(&repo, BUILD_OK)?;

  run_shipgate(
    &repo.path,
    &["ship", "--ref", "refs/tags/v2.0.0", "--lint", "success", "--apply"],
  )?;

  let gh_args = repo.read_file("gh-args.txt")?;
  assert!(gh_args.contains("release create v2.0.0"));
  assert!(!gh_args.contains("--prerelease"));
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_blocked_gate_never_publishes() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v2.0.0", "Release 2.0.0\n")?;
  publish_config(&repo, BUILD_OK)?;

  let output = shipgate(
    &repo.path,
    &["ship", "v2.0.0", "--lint", "success", "--test", "linux=success", "--test", "macos=failure", "--apply"],
  )?;

  assert_eq!(exit_code(&output), 4);
  assert!(!repo.file_exists("built.marker"));
  assert!(!repo.file_exists("gh-args.txt"));
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_non_release_tag_is_refused() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("not-a-version", "oops\n")?;
  publish_config(&repo, BUILD_OK)?;

  let output = shipgate(&repo.path, &["ship", "not-a-version", "--lint", "success", "--apply"])?;
  assert_eq!(exit_code(&output), 1);
  assert!(stderr(&output).contains("not a release tag"));
  assert!(!repo.file_exists("built.marker"));
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_failed_step_exit_code_passes_through() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v1.0.0", "Release\n")?;
  publish_config(&repo, "exit 7")?;

  let output = shipgate(&repo.path, &["ship", "v1.0.0", "--lint", "success", "--apply"])?;
  assert_eq!(exit_code(&output), 7);
  assert!(stderr(&output).contains("'build'"));
  assert!(!repo.file_exists("uploaded.txt"));
  assert!(!repo.file_exists("gh-args.txt"));
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_missing_artifacts_stop_before_upload() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v1.0.0", "Release\n")?;
  publish_config(&repo, "true")?;

  let output = shipgate(&repo.path, &["ship", "v1.0.0", "--lint", "success", "--apply"])?;
  assert_eq!(exit_code(&output), 2);
  assert!(stderr(&output).contains("No artifacts match"));
  assert!(!repo.file_exists("uploaded.txt"));
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_dry_run_runs_nothing() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v1.2.0rc3", SIGNED_MESSAGE)?;
  publish_config(&repo, BUILD_OK)?;

  let output = run_shipgate(&repo.path, &["ship", "v1.2.0rc3", "--lint", "success", "--json"])?;
  let json = json_stdout(&output)?;
  assert_eq!(json["applied"], false);
  assert_eq!(json["release"]["prerelease"], true);

  let steps: Vec<_> = json["steps"]
    .as_array()
    .map(|s| s.iter().map(|step| step["step"].as_str().unwrap_or_default().to_string()).collect())
    .unwrap_or_default();
  assert_eq!(steps, vec!["build", "verify", "upload", "create-release"]);

  assert!(!repo.file_exists("built.marker"));
  assert!(!repo.file_exists("gh-args.txt"));
  Ok(())
}

#[test]
fn test_branch_ref_has_nothing_to_publish() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = run_shipgate(&repo.path, &["ship", "--ref", "refs/heads/main", "--lint", "success"])?;
  assert!(stdout(&output).contains("nothing to publish"));
  Ok(())
}

#[test]
fn test_apply_requires_publish_commands() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.tag_annotated("v1.0.0", "Release\n")?;

  let output = shipgate(&repo.path, &["ship", "v1.0.0", "--lint", "success", "--apply"])?;
  assert_eq!(exit_code(&output), 1);
  assert!(stderr(&output).contains("publish.build"));
  Ok(())
}
