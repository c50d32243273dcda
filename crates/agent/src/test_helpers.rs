//! Shared test helpers for loop and coordinator tests.

use codecrew_core::approval::{Confirmation, Operator};
use codecrew_core::error::ProviderError;
use codecrew_core::message::Message;
use codecrew_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    call_count: Mutex<usize>,
    failing: bool,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
            failing: false,
        }
    }

    /// A provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    /// A provider whose every call fails with a non-transient error.
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
            failing: true,
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        if self.failing {
            return Err(ProviderError::AuthenticationFailed("scripted failure".into()));
        }

        let responses = self.responses.lock().unwrap();
        if *count > responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                *count,
                responses.len()
            );
        }
        Ok(responses[*count - 1].clone())
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls and optional thought content.
pub fn make_tool_call_response(
    tool_calls: Vec<codecrew_core::message::MessageToolCall>,
    thought: &str,
) -> ProviderResponse {
    let mut msg = Message::assistant(thought);
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call with a unique-ish id.
pub fn make_tool_call(
    name: &str,
    args: serde_json::Value,
) -> codecrew_core::message::MessageToolCall {
    codecrew_core::message::MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// An operator that approves everything and answers every question.
pub struct YesOperator;

impl Operator for YesOperator {
    fn confirm(&self, _message: &str) -> Confirmation {
        Confirmation::Yes
    }

    fn ask(&self, _question: &str) -> String {
        "sounds good".into()
    }
}

/// An operator that aborts every clarification request.
pub struct ExitOperator;

impl Operator for ExitOperator {
    fn confirm(&self, _message: &str) -> Confirmation {
        Confirmation::Yes
    }

    fn ask(&self, _question: &str) -> String {
        "exit".into()
    }
}
