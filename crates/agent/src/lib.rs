//! The codecrew agent loops — the heart of the engine.
//!
//! Every role follows the same **THINKING → ACTING → THINKING** cycle:
//!
//! 1. Refresh the workspace snapshot (if dirty) into the system prompt
//! 2. Trim conversation memory under the role's budget
//! 3. Send the conversation to the model via the completion gateway
//! 4. If tool calls come back: execute the batch, append results, loop
//! 5. Terminate per the role's contract — open-ended roles stop on the
//!    first plain-text response, goal-directed roles only on `finish_task`
//!
//! The coordinator runs the same machine with a restricted tool set,
//! spawning one blocking worker loop per delegation and reconciling the
//! durable progress record when it returns.

pub mod coordinator;
pub mod prompts;
pub mod react;
pub mod tracker;

pub use coordinator::{reconcile, Coordinator, ReconcilePolicy};
pub use react::{ReactLoop, RoleProfile, Termination};
pub use tracker::{ProgressState, ProgressTracker, PROGRESS_FILE};

#[cfg(test)]
pub(crate) mod test_helpers;
