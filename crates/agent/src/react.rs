//! The ReAct loop — THINKING/ACTING driver shared by every role.
//!
//! States: THINKING (awaiting a model decision) → ACTING (executing the
//! batch of tool calls) → THINKING, or THINKING → TERMINAL. Open-ended
//! roles terminate the instant the model emits no tool calls;
//! goal-directed roles terminate only through the `finish_task` call and
//! are nudged back to work when they emit bare text.

use crate::prompts::{
    AGENT_SYSTEM_PROMPT, MAX_ITERATIONS_MESSAGE, NUDGE_MESSAGE, SUBAGENT_SYSTEM_PROMPT,
    WORKER_SYSTEM_PROMPT,
};
use codecrew_core::approval::TASK_ABORTED;
use codecrew_core::error::Error;
use codecrew_core::message::{Conversation, Message, MessageToolCall};
use codecrew_core::provider::{Provider, ProviderRequest, ToolDefinition};
use codecrew_core::task::TaskDepth;
use codecrew_memory::{MemoryTrimmer, TailStrategy, TrimPolicy};
use codecrew_tools::Dispatcher;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Name of the goal-directed terminal call.
pub const FINISH_TASK: &str = "finish_task";

/// Name of the nested-delegation call.
pub const SPAWN_SUBAGENT: &str = "spawn_subagent";

/// How a role's loop terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Return control the instant the model answers with plain text.
    OpenEnded,
    /// Only `finish_task` ends the loop; bare text draws a nudge.
    FinishTool,
}

/// Per-role loop configuration: prompt, termination contract, memory
/// policy, delegation depth, and the pseudo-tools the role may call.
pub struct RoleProfile {
    pub name: &'static str,
    pub system_prompt: String,
    pub termination: Termination,
    pub depth: TaskDepth,
    pub trimmer: MemoryTrimmer,
    pub extra_tools: Vec<ToolDefinition>,
    pub max_iterations: u32,
}

impl RoleProfile {
    /// The top-level interactive agent.
    pub fn agent() -> Self {
        Self {
            name: "agent",
            system_prompt: AGENT_SYSTEM_PROMPT.to_string(),
            termination: Termination::OpenEnded,
            depth: TaskDepth::Top,
            trimmer: MemoryTrimmer::new(120_000, TrimPolicy::Summarize),
            extra_tools: vec![ask_user_def(), spawn_subagent_def()],
            max_iterations: 60,
        }
    }

    /// A delegated worker.
    pub fn worker() -> Self {
        Self {
            name: "worker",
            system_prompt: WORKER_SYSTEM_PROMPT.to_string(),
            termination: Termination::FinishTool,
            depth: TaskDepth::Worker,
            trimmer: MemoryTrimmer::new(120_000, TrimPolicy::Discard)
                .with_protected_head(2)
                .with_tail_strategy(TailStrategy::GreedyFill { margin: 2000 }),
            extra_tools: vec![ask_user_def(), spawn_subagent_def(), finish_task_def()],
            max_iterations: 60,
        }
    }

    /// A worker's (or the agent's) subagent. May not spawn anything.
    pub fn subagent() -> Self {
        Self {
            name: "subagent",
            system_prompt: SUBAGENT_SYSTEM_PROMPT.to_string(),
            termination: Termination::FinishTool,
            depth: TaskDepth::Subagent,
            trimmer: MemoryTrimmer::new(120_000, TrimPolicy::Summarize)
                .with_protected_head(2),
            extra_tools: vec![ask_user_def(), finish_task_def()],
            max_iterations: 60,
        }
    }

    pub fn with_trimmer(mut self, trimmer: MemoryTrimmer) -> Self {
        self.trimmer = trimmer;
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }
}

fn ask_user_def() -> ToolDefinition {
    ToolDefinition {
        name: "ask_user".into(),
        description: "Ask the user a question if you need clarification or are stuck.".into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question (and any options) to put to the user"
                }
            },
            "required": ["question"]
        }),
    }
}

fn spawn_subagent_def() -> ToolDefinition {
    ToolDefinition {
        name: SPAWN_SUBAGENT.into(),
        description: "Delegate a complex, self-contained subtask to a sub-agent. \
            The sub-agent runs in its own context and returns a summary."
            .into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "task_description": {
                    "type": "string",
                    "description": "Complete, self-contained description of the subtask"
                }
            },
            "required": ["task_description"]
        }),
    }
}

fn finish_task_def() -> ToolDefinition {
    ToolDefinition {
        name: FINISH_TASK.into(),
        description: "End your turn. Provide a clear summary of modifications and results.".into(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "What was done, what works, and anything left open"
                }
            },
            "required": ["summary"]
        }),
    }
}

/// One role's THINKING/ACTING driver.
pub struct ReactLoop {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    dispatcher: Arc<Dispatcher>,
    subagent_dispatcher: Option<Arc<Dispatcher>>,
    profile: RoleProfile,
}

impl ReactLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        dispatcher: Arc<Dispatcher>,
        profile: RoleProfile,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            dispatcher,
            subagent_dispatcher: None,
            profile,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Dispatcher handed to spawned subagents (defaults to this loop's own).
    pub fn with_subagent_dispatcher(mut self, dispatcher: Arc<Dispatcher>) -> Self {
        self.subagent_dispatcher = Some(dispatcher);
        self
    }

    /// Open-ended entry point: process one user turn against a session
    /// conversation. Returns the model's final text. Loop-level failures
    /// are logged and reported as text; the conversation keeps whatever
    /// partial history exists.
    pub async fn run_turn(&self, conversation: &mut Conversation, user_input: &str) -> String {
        conversation.push(Message::user(user_input));
        match self.drive(conversation).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(role = self.profile.name, error = %e, "Loop aborted, returning partial history");
                format!("The agent loop hit an unrecoverable error: {e}")
            }
        }
    }

    /// Goal-directed entry point: run one delegated task to completion in
    /// an isolated conversation and return the finish summary (or a
    /// termination/abort string).
    pub async fn run_task(&self, task_description: &str) -> String {
        let mut conversation = Conversation::with_system(&self.profile.system_prompt);
        conversation.push(Message::user(task_description));

        info!(role = self.profile.name, depth = %self.profile.depth, "Delegated task starting");
        match self.drive(&mut conversation).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(role = self.profile.name, error = %e, "Task loop aborted");
                format!("Task aborted by an internal error: {e}")
            }
        }
    }

    async fn drive(&self, conversation: &mut Conversation) -> Result<String, Error> {
        let mut iterations = 0u32;

        loop {
            iterations += 1;
            if iterations > self.profile.max_iterations {
                warn!(
                    role = self.profile.name,
                    iterations, "Max iterations reached, forcing terminal"
                );
                return Ok(MAX_ITERATIONS_MESSAGE.to_string());
            }

            // Refresh the workspace view (rescans only when dirty) and
            // splice it into the system message.
            let listing = self.dispatcher.snapshot().listing();
            conversation.messages[0].content = format!(
                "{}\n\nCURRENT PROJECT FILES:\n{}\n",
                self.profile.system_prompt, listing
            );

            self.profile
                .trimmer
                .trim(conversation, self.provider.as_ref(), &self.model)
                .await?;

            let mut tools = self.dispatcher.definitions();
            tools.extend(self.profile.extra_tools.clone());

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools,
                stream: false,
            };

            debug!(role = self.profile.name, iteration = iterations, "THINKING");
            let response = self.provider.complete(request).await?;

            let content = response.message.content.clone();
            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            if tool_calls.is_empty() {
                match self.profile.termination {
                    Termination::OpenEnded => return Ok(content),
                    Termination::FinishTool => {
                        // Bare text is not a valid terminal for this role.
                        debug!(role = self.profile.name, "No tool call, nudging");
                        conversation.push(Message::user(NUDGE_MESSAGE));
                        continue;
                    }
                }
            }

            debug!(
                role = self.profile.name,
                calls = tool_calls.len(),
                "ACTING"
            );

            for tc in &tool_calls {
                if tc.name == FINISH_TASK && self.profile.termination == Termination::FinishTool {
                    let args: serde_json::Value =
                        serde_json::from_str(&tc.arguments).unwrap_or_default();
                    let summary = args["summary"]
                        .as_str()
                        .unwrap_or("Task completed without summary.")
                        .to_string();
                    info!(role = self.profile.name, "Task finished");
                    return Ok(summary);
                }

                if tc.name == SPAWN_SUBAGENT {
                    let result = self.handle_spawn(tc).await;
                    conversation.push(Message::tool_result(&tc.id, SPAWN_SUBAGENT, result));
                    // Whatever the subagent did to the workspace, rescan.
                    self.dispatcher.snapshot().mark_dirty();
                    continue;
                }

                let result = self.dispatcher.dispatch(tc).await;
                let aborted = result == TASK_ABORTED;
                conversation.push(Message::tool_result(&tc.id, &tc.name, result));

                if aborted {
                    info!(role = self.profile.name, "Operator aborted the task");
                    return Ok(TASK_ABORTED.to_string());
                }
            }
        }
    }

    async fn handle_spawn(&self, call: &MessageToolCall) -> String {
        if !self.profile.depth.can_spawn() {
            warn!(
                role = self.profile.name,
                depth = %self.profile.depth,
                "Refusing spawn_subagent at capped depth"
            );
            return "SYSTEM ERROR: spawn_subagent is not available at this delegation depth."
                .to_string();
        }

        let args: serde_json::Value = serde_json::from_str(&call.arguments).unwrap_or_default();
        let task = args["task_description"].as_str().unwrap_or("").to_string();
        if task.is_empty() {
            return "SYSTEM ERROR: spawn_subagent requires a non-empty 'task_description'."
                .to_string();
        }

        let dispatcher = self
            .subagent_dispatcher
            .clone()
            .unwrap_or_else(|| self.dispatcher.clone());

        let child = ReactLoop::new(
            self.provider.clone(),
            &self.model,
            dispatcher,
            RoleProfile::subagent(),
        )
        .with_temperature(self.temperature);

        info!(parent = self.profile.name, "Sub-agent spawned");
        // Type-erased to break the async recursion cycle; depth is capped
        // at 2, so the nesting itself is bounded.
        let task_future: std::pin::Pin<Box<dyn std::future::Future<Output = String> + '_>> =
            Box::pin(child.run_task(&task));
        let summary = task_future.await;
        format!("SUB-AGENT RESULT:\n{summary}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use codecrew_core::approval::{ApprovalGate, ApprovalMode};
    use codecrew_core::message::Role;
    use codecrew_tools::{agent_registry, worker_registry, WorkspaceSnapshot};
    use std::time::Duration;

    fn dispatcher_for(dir: &tempfile::TempDir, registry: codecrew_core::tool::ToolRegistry) -> Arc<Dispatcher> {
        let gate = Arc::new(ApprovalGate::new(
            Arc::new(YesOperator),
            ApprovalMode::Auto,
        ));
        let snapshot = Arc::new(WorkspaceSnapshot::new(dir.path()));
        Arc::new(Dispatcher::new(registry, gate, snapshot))
    }

    fn agent_loop(dir: &tempfile::TempDir, provider: Arc<SequentialMockProvider>) -> ReactLoop {
        let dispatcher = dispatcher_for(dir, agent_registry(dir.path(), Duration::from_secs(5)));
        ReactLoop::new(provider, "mock-model", dispatcher, RoleProfile::agent())
    }

    fn worker_loop(dir: &tempfile::TempDir, provider: Arc<SequentialMockProvider>) -> ReactLoop {
        let dispatcher = dispatcher_for(dir, worker_registry(dir.path(), Duration::from_secs(5)));
        ReactLoop::new(provider, "mock-model", dispatcher, RoleProfile::worker())
    }

    #[tokio::test]
    async fn open_ended_terminates_on_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(SequentialMockProvider::single_text("All done!"));
        let agent = agent_loop(&dir, provider);

        let mut conv = Conversation::with_system("placeholder");
        let answer = agent.run_turn(&mut conv, "hello").await;

        assert_eq!(answer, "All done!");
        // system + user + assistant
        assert_eq!(conv.messages.len(), 3);
        assert!(conv.is_well_formed());
    }

    #[tokio::test]
    async fn tool_call_batch_then_answer() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call(
                    "write_file",
                    serde_json::json!({"file_path": "app.py", "content": "print('hi')\n"}),
                )],
                "Creating the app file",
            ),
            make_text_response("Created app.py"),
        ]));
        let agent = agent_loop(&dir, provider);

        let mut conv = Conversation::with_system("placeholder");
        let answer = agent.run_turn(&mut conv, "make app.py").await;

        assert_eq!(answer, "Created app.py");
        assert!(dir.path().join("app.py").exists());

        // The tool result landed in history, paired with its call.
        let tool_msg = conv
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(tool_msg.content.contains("Successfully wrote"));
        assert!(conv.is_well_formed());
    }

    #[tokio::test]
    async fn snapshot_refreshes_after_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call(
                    "write_file",
                    serde_json::json!({"file_path": "fresh.py", "content": "x = 1\n"}),
                )],
                "",
            ),
            make_text_response("done"),
        ]));
        let agent = agent_loop(&dir, provider);

        let mut conv = Conversation::with_system("placeholder");
        agent.run_turn(&mut conv, "write fresh.py").await;

        // The second THINKING step spliced the rescanned tree into the
        // system message.
        assert!(conv.messages[0].content.contains("fresh.py"));
    }

    #[tokio::test]
    async fn goal_directed_nudges_on_bare_text() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_text_response("I think the task is done."),
            make_tool_call_response(
                vec![make_tool_call(
                    "finish_task",
                    serde_json::json!({"summary": "Wrote the module and verified it."}),
                )],
                "",
            ),
        ]));
        let worker = worker_loop(&dir, provider.clone());

        let summary = worker.run_task("build the module").await;
        assert_eq!(summary, "Wrote the module and verified it.");
        // Bare text did not terminate: both scripted responses were used.
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn finish_task_summary_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![make_tool_call_response(
            vec![make_tool_call("finish_task", serde_json::json!({}))],
            "",
        )]));
        let worker = worker_loop(&dir, provider);

        let summary = worker.run_task("small task").await;
        assert_eq!(summary, "Task completed without summary.");
    }

    #[tokio::test]
    async fn worker_spawns_subagent_and_gets_summary() {
        let dir = tempfile::tempdir().unwrap();
        // Call order: worker spawns, subagent finishes, worker finishes.
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call(
                    "spawn_subagent",
                    serde_json::json!({"task_description": "write the README"}),
                )],
                "delegating docs",
            ),
            make_tool_call_response(
                vec![make_tool_call(
                    "finish_task",
                    serde_json::json!({"summary": "README written."}),
                )],
                "",
            ),
            make_tool_call_response(
                vec![make_tool_call(
                    "finish_task",
                    serde_json::json!({"summary": "All done including docs."}),
                )],
                "",
            ),
        ]));
        let worker = worker_loop(&dir, provider.clone());

        let summary = worker.run_task("build it all").await;
        assert_eq!(summary, "All done including docs.");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn subagent_cannot_spawn_further() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call(
                    "spawn_subagent",
                    serde_json::json!({"task_description": "go deeper"}),
                )],
                "",
            ),
            make_tool_call_response(
                vec![make_tool_call(
                    "finish_task",
                    serde_json::json!({"summary": "stopped at the cap"}),
                )],
                "",
            ),
        ]));

        let dispatcher = dispatcher_for(&dir, agent_registry(dir.path(), Duration::from_secs(5)));
        let subagent = ReactLoop::new(
            provider.clone(),
            "mock-model",
            dispatcher,
            RoleProfile::subagent(),
        );

        let summary = subagent.run_task("the subtask").await;
        assert_eq!(summary, "stopped at the cap");
        // Only two model calls: the refusal came back as a tool result,
        // no nested loop ran.
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn operator_abort_terminates_task() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![make_tool_call_response(
            vec![make_tool_call(
                "ask_user",
                serde_json::json!({"question": "stuck, what now?"}),
            )],
            "",
        )]));

        let gate = Arc::new(ApprovalGate::new(
            Arc::new(ExitOperator),
            ApprovalMode::Auto,
        ));
        let snapshot = Arc::new(WorkspaceSnapshot::new(dir.path()));
        let dispatcher = Arc::new(Dispatcher::new(
            worker_registry(dir.path(), Duration::from_secs(5)),
            gate,
            snapshot,
        ));
        let worker = ReactLoop::new(provider, "mock-model", dispatcher, RoleProfile::worker());

        let summary = worker.run_task("impossible task").await;
        assert_eq!(summary, TASK_ABORTED);
    }

    #[tokio::test]
    async fn unknown_tool_feeds_error_back() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(
                vec![make_tool_call("imaginary_tool", serde_json::json!({}))],
                "",
            ),
            make_text_response("sorry, recovering"),
        ]));
        let agent = agent_loop(&dir, provider);

        let mut conv = Conversation::with_system("placeholder");
        let answer = agent.run_turn(&mut conv, "do something").await;

        assert_eq!(answer, "sorry, recovering");
        let tool_msg = conv.messages.iter().find(|m| m.role == Role::Tool).unwrap();
        assert!(tool_msg.content.contains("SYSTEM ERROR: Unknown tool"));
    }

    #[tokio::test]
    async fn provider_failure_returns_gracefully() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(SequentialMockProvider::failing());
        let agent = agent_loop(&dir, provider);

        let mut conv = Conversation::with_system("placeholder");
        let answer = agent.run_turn(&mut conv, "hello").await;

        assert!(answer.contains("unrecoverable error"));
        // The user message survived in the partial history.
        assert_eq!(conv.messages.len(), 2);
    }

    #[tokio::test]
    async fn iteration_cap_forces_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let responses: Vec<_> = (0..5)
            .map(|_| {
                make_tool_call_response(
                    vec![make_tool_call(
                        "get_files_info",
                        serde_json::json!({"directory": "."}),
                    )],
                    "looping",
                )
            })
            .collect();
        let provider = Arc::new(SequentialMockProvider::new(responses));

        let dispatcher = dispatcher_for(&dir, agent_registry(dir.path(), Duration::from_secs(5)));
        let agent = ReactLoop::new(
            provider,
            "mock-model",
            dispatcher,
            RoleProfile::agent().with_max_iterations(3),
        );

        let mut conv = Conversation::with_system("placeholder");
        let answer = agent.run_turn(&mut conv, "loop forever").await;
        assert_eq!(answer, MAX_ITERATIONS_MESSAGE);
    }
}
