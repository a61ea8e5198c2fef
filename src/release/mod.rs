//! Release stage: tag classification, release notes and publishing
//!
//! # Flow
//!
//! 1. `classify`: decide from the tag name alone whether the tag is a final
//!    release, a pre-release, or not a release.
//! 2. `annotation` + `notes`: read the tag's annotation from the local object
//!    database and strip any signature block. A shallow clone is an error,
//!    never an empty note.
//! 3. `publisher`: once the gate allows it, run build → verify → upload →
//!    create release, stopping at the first failure. `backend` runs those
//!    steps as configured commands.

pub mod annotation;
pub mod artifact;
pub mod backend;
pub mod classify;
pub mod notes;
pub mod publisher;
