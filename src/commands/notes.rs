//! `shipgate notes`: print or write the release notes of a tag

use crate::core::config::ShipConfig;
use crate::core::error::{ResultExt, ShipResult};
use crate::core::vcs::SystemGit;
use crate::release::annotation::TagAnnotationReader;
use crate::release::notes::ReleaseNote;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Read the annotation of `tag` and strip its signature block
///
/// Fetches tags first when `fetch` is set or `release.fetch_tags` is enabled.
pub fn read_release_note(root: &Path, config: &ShipConfig, tag: &str, fetch: bool) -> ShipResult<ReleaseNote> {
  let git = SystemGit::open(root)?;
  let mut reader = TagAnnotationReader::new(&git);
  if fetch || config.release.fetch_tags {
    reader = reader.fetching_from(config.release.remote.clone());
  }

  let tag_ref = reader.read(tag)?;
  let note = ReleaseNote::from_annotation_with(&tag_ref.annotation_text, &config.release.signature_markers);
  if note.is_empty() {
    tracing::warn!(tag, "tag annotation has no release notes");
  }
  Ok(note)
}

/// Run the notes command
pub fn run_notes(tag: String, output: Option<PathBuf>, fetch: bool) -> ShipResult<()> {
  let current_dir = env::current_dir()?;
  let config = ShipConfig::load(&current_dir)?;
  let note = read_release_note(&current_dir, &config, &tag, fetch)?;

  match output {
    Some(path) => {
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
      }
      fs::write(&path, &note.body).with_context(|| format!("Failed to write {}", path.display()))?;
      eprintln!("📝 Wrote release notes for {} to {}", tag, path.display());
    }
    None => print!("{}", note.body),
  }
  Ok(())
}
