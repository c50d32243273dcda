//! Tool dispatcher — routes a named call to its collaborator.
//!
//! The dispatcher never raises toward the loop: unknown names, argument
//! text that won't parse, denied approvals, and collaborator failures all
//! come back as human-readable result strings suitable for direct
//! insertion as a tool-result message. Mutating calls pass the approval
//! gate first, and a successful mutation marks the cached workspace
//! listing dirty so the next THINKING step rescans the filesystem.

use crate::workspace::WorkspaceSnapshot;
use codecrew_core::approval::ApprovalGate;
use codecrew_core::message::MessageToolCall;
use codecrew_core::provider::ToolDefinition;
use codecrew_core::tool::{ToolCall, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool names that mutate the workspace and therefore require approval.
pub const MUTATING_TOOLS: &[&str] = &[
    "write_file",
    "edit_file",
    "delete_file",
    "create_directory",
    "run_script",
    "install_package",
];

/// Name of the operator-clarification pseudo-tool, handled by the
/// dispatcher itself rather than a registry entry.
pub const ASK_USER: &str = "ask_user";

pub struct Dispatcher {
    registry: ToolRegistry,
    gate: Arc<ApprovalGate>,
    snapshot: Arc<WorkspaceSnapshot>,
}

impl Dispatcher {
    pub fn new(
        registry: ToolRegistry,
        gate: Arc<ApprovalGate>,
        snapshot: Arc<WorkspaceSnapshot>,
    ) -> Self {
        Self {
            registry,
            gate,
            snapshot,
        }
    }

    /// Definitions of every registered tool, for the model request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    /// The shared workspace snapshot (refreshed by the loop, dirtied here).
    pub fn snapshot(&self) -> &Arc<WorkspaceSnapshot> {
        &self.snapshot
    }

    /// The shared approval gate.
    pub fn gate(&self) -> &Arc<ApprovalGate> {
        &self.gate
    }

    /// Execute one tool call and return the result text.
    pub async fn dispatch(&self, call: &MessageToolCall) -> String {
        // Malformed argument text degrades to an empty object; the tool
        // reports whatever is missing back into the conversation.
        let arguments: serde_json::Value = serde_json::from_str(&call.arguments)
            .unwrap_or_else(|e| {
                warn!(tool = %call.name, error = %e, "Tool arguments failed to parse, using empty object");
                serde_json::json!({})
            });

        if call.name == ASK_USER {
            let question = arguments["question"].as_str().unwrap_or("").to_string();
            return self.gate.clarify(&question);
        }

        if self.registry.get(&call.name).is_none() {
            return format!(
                "SYSTEM ERROR: Unknown tool '{}' was called. This tool does not exist. \
                 Use only the tools listed in your system prompt.",
                call.name
            );
        }

        let mutating = MUTATING_TOOLS.contains(&call.name.as_str());
        if mutating && !self.gate.request(&describe_action(&call.name, &arguments)) {
            return format!(
                "SYSTEM ERROR: User denied permission to {}.",
                action_verb_phrase(&call.name, &arguments)
            );
        }

        let tool_call = ToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments,
        };

        debug!(tool = %call.name, "Dispatching tool call");
        match self.registry.execute(&tool_call).await {
            Ok(result) => {
                if mutating && result.success {
                    self.snapshot.mark_dirty();
                }
                result.output
            }
            Err(e) => format!("Error: {e}"),
        }
    }
}

/// The approval-prompt description of a mutating action.
fn describe_action(name: &str, args: &serde_json::Value) -> String {
    format!("Agent wants to {}.", action_verb_phrase(name, args))
}

fn action_verb_phrase(name: &str, args: &serde_json::Value) -> String {
    let path = args["file_path"].as_str().unwrap_or("?");
    match name {
        "write_file" => format!("WRITE '{path}'"),
        "edit_file" => format!("EDIT '{path}'"),
        "delete_file" => format!("DELETE '{path}'"),
        "create_directory" => format!(
            "CREATE DIRECTORY '{}'",
            args["directory_path"].as_str().unwrap_or("?")
        ),
        "run_script" => format!("EXECUTE '{path}'"),
        "install_package" => format!(
            "INSTALL PACKAGE '{}'",
            args["package_name"].as_str().unwrap_or("?")
        ),
        other => other.to_string(),
    }
}
