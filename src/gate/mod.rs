//! Pipeline gate: may the publish stage run?

pub mod decision;
pub mod outcome;
pub mod report;

pub use decision::GateDecision;
pub use report::OutcomeReport;
