//! `shipgate route`: show where a triggering event leads

use crate::core::error::ShipResult;
use crate::trigger::Route;

/// Run the route command
pub fn run_route(git_ref: String, message: Option<String>, json: bool) -> ShipResult<()> {
  let route = Route::from_event(&git_ref, message.as_deref());
  tracing::debug!(git_ref, %route, "routed event");

  if json {
    println!("{}", serde_json::to_string_pretty(&route)?);
    return Ok(());
  }

  match &route {
    Route::Tag(_) => println!("🏷️  {}: lint, test, gate, publish", route),
    Route::Branch(_) | Route::PullRequest(_) => println!("🔧 {}: lint, test", route),
    Route::Skip => println!("⏭️  {}", route),
  }
  Ok(())
}
