//! `shipgate ship`: the publish stage
//!
//! Order of checks, each stopping the run:
//!
//! 1. route (only with `--ref`): non-tag events have nothing to publish
//! 2. gate: blocks unless lint and every test cell succeeded
//! 3. classification: `NotARelease` is refused before any side effect
//! 4. annotation: a shallow or tag-less clone is an error
//!
//! Without `--apply` the planned publish commands are printed and nothing runs.

use crate::commands::classify::tag_matching;
use crate::commands::gate::{GateInput, blocked_error, decide, print_decision};
use crate::commands::notes::read_release_note;
use crate::core::config::ShipConfig;
use crate::core::error::{ReleaseError, ShipResult};
use crate::release::backend::CommandBackend;
use crate::release::classify::{ReleaseClassification, ReleaseTag};
use crate::release::publisher::{PublishStep, ReleaseEntry, ReleasePublisher};
use crate::trigger::Route;
use crate::ui::StepProgress;
use serde::Serialize;
use std::env;

/// Options for one `ship` invocation
#[derive(Debug, Clone)]
pub struct ShipOptions {
  pub tag: Option<String>,
  pub git_ref: Option<String>,
  pub message: Option<String>,
  pub input: GateInput,
  pub apply: bool,
  pub fetch: bool,
  pub json: bool,
}

#[derive(Debug, Serialize)]
struct PlannedStep {
  step: PublishStep,
  command: Vec<String>,
}

/// Dry-run output
#[derive(Debug, Serialize)]
struct ShipPlan {
  tag: String,
  classification: ReleaseClassification,
  version: String,
  release: ReleaseEntry,
  steps: Vec<PlannedStep>,
  applied: bool,
}

/// Run the ship command
pub fn run_ship(options: ShipOptions) -> ShipResult<()> {
  let Some(tag) = resolve_tag(&options)? else {
    return Ok(());
  };

  let current_dir = env::current_dir()?;
  let config = ShipConfig::load(&current_dir)?;

  let decision = decide(&config, &options.input)?;
  if !decision.is_allowed() {
    if options.json {
      println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
      print_decision(&decision);
    }
    return Err(blocked_error(&decision));
  }

  let matching = tag_matching(&config, false);
  let classification = matching.classify(&tag);
  if !classification.is_release() {
    return Err(ReleaseError::InvalidClassification { tag }.into());
  }
  let version = ReleaseTag::parse(&tag, matching)
    .map(|t| t.semver().to_string())
    .unwrap_or_else(|| tag.trim_start_matches('v').to_string());
  tracing::info!(tag, %classification, version, "release classified");

  let note = read_release_note(&current_dir, &config, &tag, options.fetch)?;
  let backend = CommandBackend::from_config(&current_dir, &config, version.clone())?;

  if !options.apply {
    let release = ReleaseEntry::new(&tag, &note, classification);
    let steps = backend
      .planned_commands(&release)
      .into_iter()
      .map(|(step, command)| PlannedStep { step, command })
      .collect();
    let plan = ShipPlan {
      tag,
      classification,
      version,
      release,
      steps,
      applied: false,
    };
    if options.json {
      println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
      print_plan(&plan);
    }
    return Ok(());
  }

  let publisher = ReleasePublisher::new(backend, tag.clone());
  let result = if options.json {
    publisher.publish(classification, &note)?
  } else {
    println!("🚀 Publishing {} ({})", tag, classification);
    let mut progress = StepProgress::new(format!("Publishing {}", tag));
    publisher.publish_observed(classification, &note, &mut progress)?
  };

  if options.json {
    println!("{}", serde_json::to_string_pretty(&result)?);
  } else {
    println!();
    println!("✅ Published {} ({})", result.tag, result.classification);
    for artifact in &result.artifacts {
      println!("   📦 {} ({} bytes, sha256 {})", artifact.path.display(), artifact.size, artifact.sha256);
    }
    if result.release.prerelease {
      println!("   Release entry marked as pre-release");
    }
  }
  Ok(())
}

/// The tag to publish, or `None` when the event has nothing to publish
fn resolve_tag(options: &ShipOptions) -> ShipResult<Option<String>> {
  let Some(git_ref) = &options.git_ref else {
    return Ok(options.tag.clone());
  };

  let route = Route::from_event(git_ref, options.message.as_deref());
  if let Some(tag) = route.tag() {
    return Ok(Some(tag.to_string()));
  }

  tracing::info!(git_ref, %route, "event does not reach the publish stage");
  if options.json {
    println!("{}", serde_json::to_string_pretty(&route)?);
  } else {
    println!("⏭️  {}: nothing to publish", route);
  }
  Ok(None)
}

fn print_plan(plan: &ShipPlan) {
  println!("📦 Release plan for {}", plan.tag);
  println!();
  println!("  Classification: {}", plan.classification);
  println!("  Version:        {}", plan.version);
  println!("  Pre-release:    {}", plan.release.prerelease);
  println!();
  println!("  Notes:");
  if plan.release.body.trim().is_empty() {
    println!("    (empty)");
  }
  for line in plan.release.body.lines() {
    println!("    {}", line);
  }
  println!();
  println!("  Steps:");
  for (i, planned) in plan.steps.iter().enumerate() {
    println!("    {}. {:<15} {}", i + 1, planned.step.name(), planned.command.join(" "));
  }
  println!();
  println!("🔍 Dry-run mode (re-run with --apply to publish)");
}
