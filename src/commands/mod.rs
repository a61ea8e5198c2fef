//! CLI commands for shipgate
//!
//! ## Setup
//! - **init**: Write a starter shipgate.toml
//!
//! ## Inspection
//! - **classify**: Classify a tag name as final, pre-release or not a release
//! - **notes**: Print the release notes of an annotated tag
//! - **route**: Show which stages a triggering event reaches
//!
//! ## Publish stage
//! - **gate**: Decide from stage outcomes whether publishing may proceed
//! - **ship**: Gate, classify, read notes, then plan or run the publish steps

pub mod classify;
pub mod gate;
pub mod init;
pub mod notes;
pub mod route;
pub mod ship;

pub use classify::run_classify;
pub use gate::{GateInput, run_gate};
pub use init::run_init;
pub use notes::run_notes;
pub use route::run_route;
pub use ship::{ShipOptions, run_ship};
