//! `shipgate classify`: classify a tag name

use crate::core::config::ShipConfig;
use crate::core::error::ShipResult;
use crate::release::classify::{ReleaseClassification, ReleaseTag, TagMatching};
use serde::Serialize;
use std::env;

/// Classification of one tag, as printed by `classify --json`
#[derive(Debug, Serialize)]
pub struct ClassifyReport {
  pub tag: String,
  pub classification: ReleaseClassification,
  pub prerelease: bool,
  /// Semver rendering, when the tag is a release
  pub version: Option<String>,
  pub matching: TagMatching,
}

impl ClassifyReport {
  pub fn new(tag: &str, matching: TagMatching) -> Self {
    let classification = matching.classify(tag);
    Self {
      tag: tag.to_string(),
      classification,
      prerelease: classification.is_prerelease(),
      version: ReleaseTag::parse(tag, matching).map(|t| t.semver().to_string()),
      matching,
    }
  }
}

/// Resolve the matching mode: `--loose` wins over the configured mode
pub fn tag_matching(config: &ShipConfig, loose: bool) -> TagMatching {
  let matching = if loose {
    TagMatching::Loose
  } else {
    config.release.tag_matching
  };
  if matching == TagMatching::Loose {
    tracing::warn!("loose tag matching enabled: release versions may be embedded in longer tag names");
  }
  matching
}

/// Run the classify command
///
/// Always succeeds: every string has a classification.
pub fn run_classify(tag: String, loose: bool, json: bool) -> ShipResult<()> {
  let current_dir = env::current_dir()?;
  let config = ShipConfig::load(&current_dir)?;
  let report = ClassifyReport::new(&tag, tag_matching(&config, loose));

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  let icon = match report.classification {
    ReleaseClassification::Final => "🚀",
    ReleaseClassification::PreRelease => "🧪",
    ReleaseClassification::NotARelease => "⏭️ ",
  };
  println!("{} {}: {}", icon, report.tag, report.classification);
  if let Some(version) = &report.version {
    println!("   version: {}", version);
  }
  Ok(())
}
