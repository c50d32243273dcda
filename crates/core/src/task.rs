//! Task depth — bounds the delegation hierarchy.
//!
//! Delegation is nested composition, not concurrency: a lead blocks on
//! its worker, a worker blocks on its subagent. The depth tag caps the
//! nesting at two so a subagent can never spawn further agents.

use serde::{Deserialize, Serialize};

/// Where in the delegation hierarchy a loop is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskDepth {
    /// Top-level agent or coordinator (depth 0).
    Top,
    /// A delegated worker (depth 1).
    Worker,
    /// A worker's subagent (depth 2) — may not spawn anything.
    Subagent,
}

impl TaskDepth {
    /// Whether a loop at this depth may spawn a nested agent.
    pub fn can_spawn(self) -> bool {
        !matches!(self, TaskDepth::Subagent)
    }

    /// The depth one level down, if spawning is allowed here.
    pub fn child(self) -> Option<TaskDepth> {
        match self {
            TaskDepth::Top => Some(TaskDepth::Worker),
            TaskDepth::Worker => Some(TaskDepth::Subagent),
            TaskDepth::Subagent => None,
        }
    }

    /// Numeric depth (0 = top).
    pub fn level(self) -> u8 {
        match self {
            TaskDepth::Top => 0,
            TaskDepth::Worker => 1,
            TaskDepth::Subagent => 2,
        }
    }
}

impl std::fmt::Display for TaskDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TaskDepth::Top => "top",
            TaskDepth::Worker => "worker",
            TaskDepth::Subagent => "subagent",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_capability_by_depth() {
        assert!(TaskDepth::Top.can_spawn());
        assert!(TaskDepth::Worker.can_spawn());
        assert!(!TaskDepth::Subagent.can_spawn());
    }

    #[test]
    fn child_chain_bottoms_out() {
        assert_eq!(TaskDepth::Top.child(), Some(TaskDepth::Worker));
        assert_eq!(TaskDepth::Worker.child(), Some(TaskDepth::Subagent));
        assert_eq!(TaskDepth::Subagent.child(), None);
    }

    #[test]
    fn levels() {
        assert_eq!(TaskDepth::Top.level(), 0);
        assert_eq!(TaskDepth::Subagent.level(), 2);
    }
}
