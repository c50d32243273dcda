//! Operator approval — the gate in front of mutating tool calls.
//!
//! The gate is an explicit capability object passed by reference into the
//! dispatcher, never a free-standing global. It starts in `Interactive`
//! mode and makes a one-way transition to `Auto` the first time the
//! operator answers "approve all"; the transition lasts for the rest of
//! the session.

use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Sentinel returned through the tool channel when the operator aborts
/// the current task during a clarification prompt.
pub const TASK_ABORTED: &str = "Task aborted by user.";

/// The operator's answer to an approval prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    /// Approve this action and every later one in the session.
    ApproveAll,
}

/// How the gate currently decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalMode {
    /// Prompt the operator for every mutating call.
    Interactive,
    /// Approve everything without prompting.
    Auto,
}

/// The interactive surface the engine suspends on: approval prompts and
/// clarification questions. The CLI implements this over stdin; tests use
/// scripted answers.
pub trait Operator: Send + Sync {
    /// Ask the operator to confirm a mutating action.
    fn confirm(&self, message: &str) -> Confirmation;

    /// Ask the operator a free-form clarification question.
    /// Implementations return the raw reply; "exit"/"quit" means abort.
    fn ask(&self, question: &str) -> String;
}

/// The approval gate itself.
pub struct ApprovalGate {
    mode: Mutex<ApprovalMode>,
    operator: Arc<dyn Operator>,
}

impl ApprovalGate {
    pub fn new(operator: Arc<dyn Operator>, mode: ApprovalMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            operator,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> ApprovalMode {
        *self.mode.lock().unwrap()
    }

    /// Request approval for a described action. Returns `true` when the
    /// action may proceed. "Approve all" flips the gate to Auto for the
    /// remainder of the session.
    pub fn request(&self, action: &str) -> bool {
        if self.mode() == ApprovalMode::Auto {
            debug!(action, "Auto-approved");
            return true;
        }

        match self.operator.confirm(action) {
            Confirmation::Yes => true,
            Confirmation::No => false,
            Confirmation::ApproveAll => {
                *self.mode.lock().unwrap() = ApprovalMode::Auto;
                info!("Approve-all enabled for this session");
                true
            }
        }
    }

    /// Route a clarification question to the operator. Returns the
    /// formatted reply, or [`TASK_ABORTED`] when the operator answers
    /// "exit"/"quit".
    pub fn clarify(&self, question: &str) -> String {
        let reply = self.operator.ask(question);
        let lowered = reply.trim().to_lowercase();
        if lowered == "exit" || lowered == "quit" {
            return TASK_ABORTED.to_string();
        }
        format!("USER RESPONSE: {reply}")
    }
}
