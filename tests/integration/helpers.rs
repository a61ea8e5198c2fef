//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Tag message of a signed release tag, signature block included
pub const SIGNED_MESSAGE: &str =
  "Fixed bug X\n-----BEGIN PGP SIGNATURE-----\n\niQEzBAABCAAdFiEE\n=abcd\n-----END PGP SIGNATURE-----\n";

/// A scratch repository with one commit
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create a new repository with an initial commit
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgSign", "false"])?;
    git(&path, &["config", "tag.gpgSign", "false"])?;

    std::fs::write(path.join("README.md"), "# demo\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;

    Ok(Self { _root: root, path })
  }

  /// Create an annotated tag whose message is stored exactly as given
  pub fn tag_annotated(&self, name: &str, message: impl AsRef<[u8]>) -> Result<()> {
    let message_file = self.path.join(".git").join("TAG_MSG_TEST");
    std::fs::write(&message_file, message)?;
    let message_file = message_file.to_string_lossy().to_string();
    git(
      &self.path,
      &["tag", "-a", name, "--cleanup=verbatim", "-F", &message_file],
    )?;
    Ok(())
  }

  /// Create a lightweight tag (no tag object)
  pub fn tag_lightweight(&self, name: &str) -> Result<()> {
    git(&self.path, &["tag", name])?;
    Ok(())
  }

  /// Write shipgate.toml
  pub fn write_config(&self, content: &str) -> Result<()> {
    self.write_file("shipgate.toml", content)
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(full, content)?;
    Ok(())
  }

  /// Install an executable shell script
  #[cfg(unix)]
  pub fn write_script(&self, path: &str, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    self.write_file(path, &format!("#!/bin/sh\n{}\n", body))?;
    let full = self.path.join(path);
    std::fs::set_permissions(&full, std::fs::Permissions::from_mode(0o755))?;
    Ok(full)
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run shipgate and return its output whatever the exit status
pub fn shipgate(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_shipgate"))
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run shipgate")
}

/// Run shipgate, failing on a non-zero exit
pub fn run_shipgate(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = shipgate(cwd, args)?;

  if !output.status.success() {
    anyhow::bail!(
      "shipgate command failed: shipgate {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout(&output),
      stderr(&output)
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}

/// Exit code, or -1 when killed by a signal
pub fn exit_code(output: &Output) -> i32 {
  output.status.code().unwrap_or(-1)
}

/// Parse stdout as JSON
pub fn json_stdout(output: &Output) -> Result<serde_json::Value> {
  serde_json::from_slice(&output.stdout).with_context(|| format!("stdout is not JSON:\n{}", stdout(output)))
}
