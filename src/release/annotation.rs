//! Reading tag annotations from the local object database

use crate::core::error::{ReleaseError, ShallowReason, ShipError, ShipResult};
use crate::core::vcs::{ObjectKind, SystemGit};
use serde::Serialize;

/// A version tag and its raw annotation text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRef {
  pub name: String,
  /// Raw tag message, signature block included
  pub annotation_text: String,
}

/// Reads annotated tag messages, refusing to guess when history is incomplete
pub struct TagAnnotationReader<'a> {
  git: &'a SystemGit,
  /// Remote to fetch tag objects from before reading
  fetch_from: Option<String>,
}

impl<'a> TagAnnotationReader<'a> {
  pub fn new(git: &'a SystemGit) -> Self {
    Self { git, fetch_from: None }
  }

  /// Fetch tag objects from `remote` before the first read
  pub fn fetching_from(mut self, remote: impl Into<String>) -> Self {
    self.fetch_from = Some(remote.into());
    self
  }

  /// Read the full annotation of `tag_name`
  ///
  /// Fails with `ShallowHistory` when the clone is shallow, when the tag is not
  /// present locally, or when the local ref points at a commit instead of a tag
  /// object. Missing history never reads as "no notes". A message that is not
  /// UTF-8 fails with `UndecodableAnnotation` naming the tag's `encoding` header.
  pub fn read_annotation(&self, tag_name: &str) -> ShipResult<String> {
    if let Some(remote) = &self.fetch_from {
      self.git.fetch_tags(remote)?;
    }

    if self.git.is_shallow()? {
      return Err(shallow(tag_name, ShallowReason::ShallowClone));
    }

    let rev = format!("refs/tags/{}", tag_name);
    match self.git.object_kind(&rev)? {
      Some(ObjectKind::Tag) => {}
      Some(kind) => {
        tracing::warn!(tag = tag_name, ?kind, "tag ref does not point at a tag object");
        return Err(shallow(tag_name, ShallowReason::NotAnnotated));
      }
      None => return Err(shallow(tag_name, ShallowReason::TagMissing)),
    }

    let raw = decode_tag_object(tag_name, self.git.read_tag_object(tag_name)?)?;
    let message = tag_message(&raw).to_string();
    tracing::debug!(tag = tag_name, bytes = message.len(), "read tag annotation");
    Ok(message)
  }

  /// Read the tag as a `TagRef`
  pub fn read(&self, tag_name: &str) -> ShipResult<TagRef> {
    Ok(TagRef {
      name: tag_name.to_string(),
      annotation_text: self.read_annotation(tag_name)?,
    })
  }
}

fn shallow(tag: &str, reason: ShallowReason) -> ShipError {
  ReleaseError::ShallowHistory {
    tag: tag.to_string(),
    reason,
  }
  .into()
}

/// Decode a raw tag object, naming its declared encoding when it is not UTF-8
fn decode_tag_object(tag: &str, raw: Vec<u8>) -> ShipResult<String> {
  String::from_utf8(raw).map_err(|err| {
    let raw = err.into_bytes();
    let headers = String::from_utf8_lossy(&raw);
    let encoding = headers
      .lines()
      .take_while(|line| !line.is_empty())
      .find_map(|line| line.strip_prefix("encoding "))
      .map(|value| value.trim().to_string());
    tracing::warn!(tag, ?encoding, "tag annotation is not UTF-8");
    ReleaseError::UndecodableAnnotation {
      tag: tag.to_string(),
      encoding,
    }
    .into()
  })
}

/// Message part of a raw tag object: everything after the first blank line
///
/// A tag object is a block of `key value` headers, an empty line, then the
/// message verbatim. A header-only object has an empty message.
pub fn tag_message(raw: &str) -> &str {
  match raw.find("\n\n") {
    Some(idx) => &raw[idx + 2..],
    None => "",
  }
}
