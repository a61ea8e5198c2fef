//! Core building blocks shared by every shipgate command
//!
//! - **config**: shipgate.toml parsing and validation
//! - **error**: Error types with contextual help messages and exit codes
//! - **vcs**: Git plumbing (SystemGit)

pub mod config;
pub mod error;
pub mod vcs;
