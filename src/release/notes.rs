//! Release notes from tag annotations
//!
//! Signed tags carry the detached signature inside the tag message, after the
//! human-written text. Notes are everything before the first line that is
//! exactly a signature start marker.

use serde::Serialize;

/// Start markers for the signature formats git writes into signed tags
pub const DEFAULT_SIGNATURE_MARKERS: &[&str] = &[
  "-----BEGIN PGP SIGNATURE-----",
  "-----BEGIN SSH SIGNATURE-----",
  "-----BEGIN SIGNED MESSAGE-----",
];

/// Return the prefix of `raw` that precedes the first signature marker line
///
/// A line matches when, without its `\n` or `\r\n` terminator, it equals one of
/// `markers`. Without a matching line the input comes back unchanged; a marker
/// on the first line yields an empty string. Lines before the marker keep their
/// terminators.
pub fn strip_signature<S: AsRef<str>>(raw: &str, markers: &[S]) -> String {
  let mut offset = 0;
  for line in raw.split_inclusive('\n') {
    let content = line.strip_suffix('\n').unwrap_or(line);
    let content = content.strip_suffix('\r').unwrap_or(content);
    if markers.iter().any(|m| m.as_ref() == content) {
      return raw[..offset].to_string();
    }
    offset += line.len();
  }
  raw.to_string()
}

/// Human-authored release notes, free of signature content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseNote {
  pub body: String,
}

impl ReleaseNote {
  /// Build notes from a raw tag annotation with the default markers
  pub fn from_annotation(raw: &str) -> Self {
    Self::from_annotation_with(raw, DEFAULT_SIGNATURE_MARKERS)
  }

  /// Build notes from a raw tag annotation with custom markers
  pub fn from_annotation_with<S: AsRef<str>>(raw: &str, markers: &[S]) -> Self {
    let body = strip_signature(raw, markers);
    if body.len() != raw.len() {
      tracing::debug!(
        stripped_bytes = raw.len() - body.len(),
        "removed signature block from tag annotation"
      );
    }
    Self { body }
  }

  pub fn is_empty(&self) -> bool {
    self.body.trim().is_empty()
  }
}
