//! `codecrew status` — print the project progress record.

use codecrew_agent::ProgressTracker;
use std::path::Path;

pub fn run(workspace: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ProgressTracker::new(workspace);

    match tracker.get() {
        Some(state) => {
            println!("Goal:    {}", state.project_goal);
            println!("Status:  {}", state.status);
            println!(
                "Current: {}",
                state.current_item.as_deref().unwrap_or("none")
            );

            println!("\nCompleted:");
            if state.completed_items.is_empty() {
                println!("  (none yet)");
            }
            for item in &state.completed_items {
                println!("  [x] {item}");
            }

            println!("\nPending:");
            if state.pending_items.is_empty() {
                println!("  (none)");
            }
            for item in &state.pending_items {
                println!("  [ ] {item}");
            }
        }
        None => println!("{}", tracker.display()),
    }

    Ok(())
}
