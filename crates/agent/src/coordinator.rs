//! Delegation coordinator — the lead role.
//!
//! Runs the same state machine as [`crate::react`] with a restricted
//! tool surface (`get_file_content`, `update_plan`, `delegate_to_worker`).
//! Planning
//! and delegation are intercepted in-loop: `update_plan` rewrites the
//! durable progress record, `delegate_to_worker` marks the target item
//! current, blocks on one fresh worker loop, and then deterministically
//! reconciles the record — regardless of whether the report sounds like
//! success. Delegation is nested composition, not concurrency: the
//! coordinator is fully blocked while its worker runs.

use crate::prompts::{LEAD_SYSTEM_PROMPT, MAX_ITERATIONS_MESSAGE};
use crate::react::{ReactLoop, RoleProfile};
use crate::tracker::{ProgressState, ProgressTracker};
use codecrew_core::error::Error;
use codecrew_core::message::{Conversation, Message, MessageToolCall};
use codecrew_core::provider::{Provider, ProviderRequest, ToolDefinition};
use codecrew_memory::{MemoryTrimmer, TrimPolicy};
use codecrew_tools::Dispatcher;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const UPDATE_PLAN: &str = "update_plan";
pub const DELEGATE_TO_WORKER: &str = "delegate_to_worker";

/// How the progress record is updated after a delegation returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Move exactly the delegated item from pending to completed.
    Incremental,
    /// Move every pending item to completed: one delegation is expected
    /// to satisfy the whole plan, and the report's free text is not
    /// parsed for partial success. A deliberate simplification, not a
    /// correctness guarantee.
    Monolithic,
}

/// Deterministically fold a finished delegation into the record.
///
/// Both policies clear `current_item`, keep the item lists ordered and
/// duplicate-free, and leave pending ∩ completed empty.
pub fn reconcile(state: &mut ProgressState, policy: ReconcilePolicy, target_item: &str) {
    match policy {
        ReconcilePolicy::Incremental => {
            state.pending_items.retain(|item| item != target_item);
            if !state.completed_items.iter().any(|item| item == target_item) {
                state.completed_items.push(target_item.to_string());
            }
        }
        ReconcilePolicy::Monolithic => {
            for item in std::mem::take(&mut state.pending_items) {
                if !state.completed_items.contains(&item) {
                    state.completed_items.push(item);
                }
            }
            if !state.completed_items.iter().any(|item| item == target_item) {
                state.completed_items.push(target_item.to_string());
            }
        }
    }
    state.current_item = None;
}

/// The lead agent: plans, delegates, reconciles.
pub struct Coordinator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    dispatcher: Arc<Dispatcher>,
    worker_dispatcher: Arc<Dispatcher>,
    trimmer: MemoryTrimmer,
    worker_trimmer: Option<MemoryTrimmer>,
    tracker: ProgressTracker,
    policy: ReconcilePolicy,
    max_iterations: u32,
}

impl Coordinator {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        dispatcher: Arc<Dispatcher>,
        worker_dispatcher: Arc<Dispatcher>,
        tracker: ProgressTracker,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            dispatcher,
            worker_dispatcher,
            trimmer: MemoryTrimmer::new(40_000, TrimPolicy::Summarize),
            worker_trimmer: None,
            tracker,
            policy,
            max_iterations: 40,
        }
    }

    pub fn with_trimmer(mut self, trimmer: MemoryTrimmer) -> Self {
        self.trimmer = trimmer;
        self
    }

    /// Override the memory configuration of spawned workers.
    pub fn with_worker_trimmer(mut self, trimmer: MemoryTrimmer) -> Self {
        self.worker_trimmer = Some(trimmer);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Seed a fresh lead conversation.
    pub fn new_conversation(&self) -> Conversation {
        Conversation::with_system(LEAD_SYSTEM_PROMPT)
    }

    /// Process one user turn. The inner loop chains tool actions until
    /// the lead answers with plain text (open-ended contract).
    pub async fn run_turn(&self, conversation: &mut Conversation, user_input: &str) -> String {
        conversation.push(Message::user(user_input));
        match self.drive(conversation).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "Coordinator loop aborted, returning partial history");
                format!("The coordinator loop hit an unrecoverable error: {e}")
            }
        }
    }

    async fn drive(&self, conversation: &mut Conversation) -> Result<String, Error> {
        let mut iterations = 0u32;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                warn!(iterations, "Coordinator hit iteration cap");
                return Ok(MAX_ITERATIONS_MESSAGE.to_string());
            }

            // The lead sees both the live file tree and the tracker.
            let listing = self.dispatcher.snapshot().listing();
            conversation.messages[0].content = format!(
                "{}\n\nCURRENT PROJECT FILES:\n{}\n\nCURRENT PROJECT TRACKER:\n{}",
                LEAD_SYSTEM_PROMPT,
                listing,
                self.tracker.display()
            );

            self.trimmer
                .trim(conversation, self.provider.as_ref(), &self.model)
                .await?;

            let mut tools = self.dispatcher.definitions();
            tools.push(update_plan_def());
            tools.push(delegate_def());

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.temperature,
                max_tokens: None,
                tools,
                stream: false,
            };

            debug!(iteration = iterations, "Coordinator THINKING");
            let response = self.provider.complete(request).await?;

            let content = response.message.content.clone();
            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            if tool_calls.is_empty() {
                // The lead is talking to the user: surrender control.
                return Ok(content);
            }

            for tc in &tool_calls {
                let result = match tc.name.as_str() {
                    UPDATE_PLAN => self.handle_update_plan(tc),
                    DELEGATE_TO_WORKER => self.handle_delegate(tc).await,
                    _ => self.dispatcher.dispatch(tc).await,
                };
                conversation.push(Message::tool_result(&tc.id, &tc.name, result));
            }
        }
    }

    fn handle_update_plan(&self, call: &MessageToolCall) -> String {
        let args: serde_json::Value = match serde_json::from_str(&call.arguments) {
            Ok(v) => v,
            Err(_) => {
                return format!(
                    "SYSTEM ERROR: Failed to parse tool arguments as JSON: {}",
                    call.arguments
                )
            }
        };

        // First plan-update call creates the record.
        let mut state = self.tracker.get().unwrap_or_default();

        if let Some(goal) = args["project_goal"].as_str() {
            state.project_goal = goal.to_string();
        }
        let milestones: Vec<String> = args["milestones"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        // Already-completed items stay completed; pending gets the new
        // list minus anything done, keeping the two sets disjoint.
        let mut pending: Vec<String> = Vec::new();
        for item in milestones {
            if !state.completed_items.contains(&item) && !pending.contains(&item) {
                pending.push(item);
            }
        }
        state.pending_items = pending;

        info!(
            goal = %state.project_goal,
            pending = state.pending_items.len(),
            "Project plan updated"
        );

        match self.tracker.set(&state) {
            Ok(()) => "Plan successfully updated. You may now proceed.".to_string(),
            Err(e) => format!("SYSTEM ERROR: Failed to save the project plan: {e}"),
        }
    }

    async fn handle_delegate(&self, call: &MessageToolCall) -> String {
        let args: serde_json::Value = match serde_json::from_str(&call.arguments) {
            Ok(v) => v,
            Err(_) => {
                return format!(
                    "SYSTEM ERROR: Failed to parse tool arguments as JSON: {}",
                    call.arguments
                )
            }
        };

        let target_item = args["target_item"].as_str().unwrap_or("unknown_item").to_string();
        let task = args["task_description"].as_str().unwrap_or("").to_string();
        if task.is_empty() {
            return "SYSTEM ERROR: delegate_to_worker requires a non-empty 'task_description'."
                .to_string();
        }

        // Mark what is in flight before the worker starts.
        let mut state = self.tracker.get().unwrap_or_default();
        state.current_item = Some(target_item.clone());
        if let Err(e) = self.tracker.set(&state) {
            return format!("SYSTEM ERROR: Failed to update the tracker: {e}");
        }

        // One fresh, isolated worker loop; the coordinator blocks here.
        info!(item = %target_item, "Delegating to worker");
        let mut profile = RoleProfile::worker();
        if let Some(trimmer) = &self.worker_trimmer {
            profile = profile.with_trimmer(trimmer.clone());
        }
        let worker = ReactLoop::new(
            self.provider.clone(),
            &self.model,
            self.worker_dispatcher.clone(),
            profile,
        )
        .with_temperature(self.temperature);

        let report = worker.run_task(&task).await;

        // Deterministic reconciliation, success or not.
        let mut state = self.tracker.get().unwrap_or_default();
        reconcile(&mut state, self.policy, &target_item);
        if let Err(e) = self.tracker.set(&state) {
            return format!(
                "WORKER REPORT:\n{report}\n\nSYSTEM ERROR: Failed to update the tracker: {e}"
            );
        }

        // The lead rescans the workspace the worker just mutated.
        self.dispatcher.snapshot().mark_dirty();

        match self.policy {
            ReconcilePolicy::Incremental => format!(
                "WORKER REPORT:\n{report}\n\nSYSTEM: Milestone '{target_item}' has been \
                 automatically marked as complete in the tracker."
            ),
            ReconcilePolicy::Monolithic => format!(
                "WORKER REPORT:\n{report}\n\nSYSTEM: Task '{target_item}' is complete. The \
                 project specification has been completed. Inform the user."
            ),
        }
    }
}

fn update_plan_def() -> ToolDefinition {
    ToolDefinition {
        name: UPDATE_PLAN.into(),
        description: "Update the project plan tracker. Call this whenever a new milestone plan \
            is approved by the user, or when the worker completes its task and the loop continues."
            .into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "project_goal": {
                    "type": "string",
                    "description": "The overall goal."
                },
                "milestones": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Chronological list of the remaining major milestones."
                }
            },
            "required": ["project_goal", "milestones"]
        }),
    }
}

fn delegate_def() -> ToolDefinition {
    ToolDefinition {
        name: DELEGATE_TO_WORKER.into(),
        description: "Delegate a coding task to the developer.".into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "target_item": {
                    "type": "string",
                    "description": "The exact name of the milestone from your plan that this task fulfills."
                },
                "task_description": {
                    "type": "string",
                    "description": "A detailed, step-by-step explanation of the work."
                }
            },
            "required": ["target_item", "task_description"]
        }),
    }
}
