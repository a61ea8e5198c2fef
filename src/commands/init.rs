//! `shipgate init`: write a starter configuration

use crate::core::config::ShipConfig;
use crate::core::error::{ConfigError, ResultExt, ShipError, ShipResult};
use std::env;
use std::fs;
use std::path::Path;

/// Starter configuration; every value shown is the default unless noted
pub const TEMPLATE: &str = r#"# shipgate configuration

[release]
# "anchored": the whole tag must look like v1.2.3, v1.2.3a1, v1.2.3b1 or v1.2.3rc1
# "loose": the version may appear anywhere in the tag name (legacy behavior)
tag_matching = "anchored"
signature_markers = [
  "-----BEGIN PGP SIGNATURE-----",
  "-----BEGIN SSH SIGNATURE-----",
  "-----BEGIN SIGNED MESSAGE-----",
]
remote = "origin"
# Run `git fetch --tags --force <remote>` before reading the tag annotation
fetch_tags = false
notes_path = "target/shipgate/release_notes.md"

[gate]
# Job name holding the lint result in an orchestrator `needs` context
lint_job = "lint"

# Every declared cell must report success before publishing
[gate.matrix]
platforms = []
versions = []
cells = []

[publish]
workdir = "."
artifacts = "dist/*"
# Required for `ship --apply`. Placeholders: {tag}, {version}, {artifacts}
# build = ["python", "-m", "build"]
# verify = ["twine", "check", "{artifacts}"]
# upload = ["twine", "upload", "{artifacts}"]

[publish.host]
program = "gh"
"#;

/// Run the init command
pub fn run_init(force: bool) -> ShipResult<()> {
  let current_dir = env::current_dir()?;
  write_template(&current_dir, force)
}

fn write_template(root: &Path, force: bool) -> ShipResult<()> {
  if let Some(existing) = ShipConfig::find_config_path(root)
    && !force
  {
    return Err(ShipError::Config(ConfigError::AlreadyExists { path: existing }));
  }

  let path = root.join(ShipConfig::FILE_NAME);
  fs::write(&path, TEMPLATE).with_context(|| format!("Failed to write {}", path.display()))?;

  println!("✅ Created {}", path.display());
  println!();
  println!("Next steps:");
  println!("  1. Set publish.build and publish.upload");
  println!("  2. Declare your test matrix under [gate.matrix]");
  println!("  3. Preview a release: shipgate ship v1.0.0 --lint success");
  Ok(())
}
