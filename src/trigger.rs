//! Routing a pipeline event to the stages it may reach
//!
//! Only a tag push can ever reach the gate and the publish stage. Branch pushes
//! and pull requests run lint and test only.

use serde::Serialize;
use std::fmt;

const SKIP_MARKERS: &[&str] = &["[skip ci]", "[ci skip]"];

/// Where a triggering event leads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "route", content = "name")]
pub enum Route {
  /// Tag push: lint, test, then gate and publish
  Tag(String),
  /// Branch push: lint and test only
  Branch(String),
  /// Pull request: lint and test only
  PullRequest(String),
  /// The commit opted out of CI
  Skip,
}

impl Route {
  /// Route an event from its ref (`refs/tags/v1.0.0`, `refs/heads/main`,
  /// `refs/pull/7/merge`, or a bare name) and head commit message
  pub fn from_event(git_ref: &str, commit_message: Option<&str>) -> Self {
    if let Some(message) = commit_message
      && SKIP_MARKERS.iter().any(|marker| message.contains(marker))
    {
      return Route::Skip;
    }

    let git_ref = git_ref.trim();
    if let Some(tag) = git_ref.strip_prefix("refs/tags/") {
      Route::Tag(tag.to_string())
    } else if let Some(branch) = git_ref.strip_prefix("refs/heads/") {
      Route::Branch(branch.to_string())
    } else if let Some(pr) = git_ref.strip_prefix("refs/pull/") {
      Route::PullRequest(pr.split('/').next().unwrap_or_default().to_string())
    } else if git_ref.starts_with('v') {
      Route::Tag(git_ref.to_string())
    } else {
      Route::Branch(git_ref.to_string())
    }
  }

  /// The tag name, when this route may reach the publish stage
  pub fn tag(&self) -> Option<&str> {
    match self {
      Route::Tag(name) => Some(name),
      _ => None,
    }
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Route::Tag(name) => write!(f, "tag {}", name),
      Route::Branch(name) => write!(f, "branch {}", name),
      Route::PullRequest(number) => write!(f, "pull request #{}", number),
      Route::Skip => write!(f, "skipped by commit message"),
    }
  }
}
