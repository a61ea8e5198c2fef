//! System git backend
//!
//! Uses git plumbing commands for every read. Tag objects are read raw with
//! `cat-file` so signature blocks and trailing whitespace survive untouched.

use crate::core::error::{GitError, ShipError, ShipResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Kind of object a revision resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
  /// Annotated tag object
  Tag,
  Commit,
  Tree,
  Blob,
}

impl ObjectKind {
  fn parse(s: &str) -> Option<Self> {
    match s.trim() {
      "tag" => Some(ObjectKind::Tag),
      "commit" => Some(ObjectKind::Commit),
      "tree" => Some(ObjectKind::Tree),
      "blob" => Some(ObjectKind::Blob),
      _ => None,
    }
  }
}

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Working tree root
  repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> ShipResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ShipError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ShipError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Self {
      repo_path: PathBuf::from(stdout.trim()),
    })
  }

  /// Whether the clone is shallow (grafted history, tag objects likely missing)
  pub fn is_shallow(&self) -> ShipResult<bool> {
    let output = self.run(&["rev-parse", "--is-shallow-repository"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
  }

  /// Type of the object a revision names, or `None` if it does not resolve
  pub fn object_kind(&self, rev: &str) -> ShipResult<Option<ObjectKind>> {
    let output = self
      .git_cmd()
      .args(["cat-file", "-t", rev])
      .output()
      .context("Failed to run git cat-file -t")?;

    if !output.status.success() {
      return Ok(None);
    }

    Ok(ObjectKind::parse(&String::from_utf8_lossy(&output.stdout)))
  }

  /// Read a raw annotated tag object (headers, blank line, message)
  ///
  /// Bytes are returned undecoded; the message may carry its own `encoding` header.
  pub fn read_tag_object(&self, tag_name: &str) -> ShipResult<Vec<u8>> {
    let rev = format!("refs/tags/{}", tag_name);
    let output = self.run(&["cat-file", "tag", &rev])?;
    Ok(output.stdout)
  }

  /// Fetch tag objects from a remote, overwriting local tag refs
  ///
  /// Needed when the checkout fetched the tag ref without its tag object.
  pub fn fetch_tags(&self, remote: &str) -> ShipResult<()> {
    tracing::info!(remote, "fetching tag objects");

    let output = self
      .git_cmd()
      .args(["fetch", "--tags", "--force", remote])
      .output()
      .context("Failed to run git fetch")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::FetchFailed {
        remote: remote.to_string(),
        reason: stderr.trim().to_string(),
      }));
    }

    Ok(())
  }

  /// Run a git command, mapping a non-zero exit to `GitError::CommandFailed`
  fn run(&self, args: &[&str]) -> ShipResult<Output> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.to_string(),
      }));
    }

    Ok(output)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}
