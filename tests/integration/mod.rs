//! CLI integration tests for shipgate

mod helpers;
mod test_classify;
mod test_gate;
mod test_init;
mod test_notes;
mod test_route;
mod test_ship;
