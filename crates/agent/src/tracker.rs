//! Progress tracker — the durable goal/milestone record.
//!
//! A small JSON record at a fixed path under the workspace root. It
//! outlives any single conversation and survives process restarts. No
//! locking: the coordinator is the only writer, strictly between worker
//! invocations; concurrent external mutation is undefined behavior.

use codecrew_core::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fixed filename of the progress record under the workspace root.
pub const PROGRESS_FILE: &str = "PROGRESS.json";

/// Shown in the lead's context while no record exists yet.
const PLACEHOLDER: &str =
    "No progress record exists yet. Use the `update_plan` tool to initialize project tracking.";

/// The persisted plan state.
///
/// Invariant: `pending_items` and `completed_items` are disjoint; both
/// are ordered and duplicate-free. Maintained by the coordinator's
/// reconciliation, not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    #[serde(default)]
    pub project_goal: String,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_item: Option<String>,

    #[serde(default)]
    pub pending_items: Vec<String>,

    #[serde(default)]
    pub completed_items: Vec<String>,
}

fn default_status() -> String {
    "in_progress".into()
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            project_goal: String::new(),
            status: default_status(),
            current_item: None,
            pending_items: Vec::new(),
            completed_items: Vec::new(),
        }
    }
}

/// File-backed accessor for the progress record.
pub struct ProgressTracker {
    path: PathBuf,
}

impl ProgressTracker {
    /// Track progress at the fixed path under `workspace_root`.
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            path: workspace_root.as_ref().join(PROGRESS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted record, or `None` when absent or unreadable.
    pub fn get(&self) -> Option<ProgressState> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt progress record");
                None
            }
        }
    }

    /// Human-readable rendering for the lead's system context: the raw
    /// record, or a placeholder inviting plan initialization.
    pub fn display(&self) -> String {
        match self.get() {
            Some(state) => {
                serde_json::to_string_pretty(&state).unwrap_or_else(|_| PLACEHOLDER.to_string())
            }
            None => PLACEHOLDER.to_string(),
        }
    }

    /// Idempotent full overwrite of the record.
    pub fn set(&self, state: &ProgressState) -> Result<(), TrackerError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| TrackerError::Corrupt(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TrackerError::Storage(e.to_string()))?;
        }
        std::fs::write(&self.path, json).map_err(|e| TrackerError::Storage(e.to_string()))?;

        debug!(path = %self.path.display(), "Progress record saved");
        Ok(())
    }
}
