//! Message and Conversation domain types.
//!
//! These are the core value objects that flow through the entire engine:
//! a role-tagged message list goes to the model, the model answers with
//! text and optional tool calls, tool results re-enter the list, and the
//! memory trimmer keeps the whole thing under budget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (one agent session or delegation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (role prompt, injected workspace state, summaries)
    System,
    /// The human operator (or a synthetic nudge on their behalf)
    User,
    /// The model
    Assistant,
    /// Tool execution result
    Tool,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// For tool results: the name of the tool that produced this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// For tool results: which tool call this responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a tool result message referencing the originating call.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.name = Some(name.into());
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            name: None,
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Character length of this message for memory budgeting:
    /// content plus the serialized tool-call descriptors.
    pub fn char_len(&self) -> usize {
        let calls_len = if self.tool_calls.is_empty() {
            0
        } else {
            serde_json::to_string(&self.tool_calls)
                .map(|s| s.len())
                .unwrap_or(0)
        };
        self.content.len() + calls_len
    }
}

/// A tool call embedded in an assistant message.
///
/// Built incrementally by the streaming accumulator; immutable once
/// finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Raw argument text (JSON, as emitted by the model)
    pub arguments: String,
}

/// An ordered, append-only sequence of messages.
///
/// Invariants:
/// - `messages[0]` is always role `System`.
/// - every `Tool` message back-references a `tool_calls` entry of an
///   earlier `Assistant` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation seeded with a system prompt.
    pub fn with_system(system_prompt: impl Into<String>) -> Self {
        let mut conv = Self::empty();
        conv.messages.push(Message::system(system_prompt));
        conv
    }

    /// Create a new empty conversation.
    pub fn empty() -> Self {
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Total character length across all messages (the trim budget measure).
    pub fn total_chars(&self) -> usize {
        self.messages.iter().map(Message::char_len).sum()
    }

    /// Check the structural invariants: system prompt first, and every
    /// tool result paired with an earlier assistant call id.
    pub fn is_well_formed(&self) -> bool {
        match self.messages.first() {
            Some(m) if m.role == Role::System => {}
            _ => return false,
        }

        for (i, msg) in self.messages.iter().enumerate() {
            if msg.role != Role::Tool {
                continue;
            }
            let Some(call_id) = &msg.tool_call_id else {
                return false;
            };
            let paired = self.messages[..i].iter().any(|earlier| {
                earlier.role == Role::Assistant
                    && earlier.tool_calls.iter().any(|tc| &tc.id == call_id)
            });
            if !paired {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Build me a snake game");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Build me a snake game");
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn tool_result_carries_back_reference() {
        let msg = Message::tool_result("call_1", "write_file", "Successfully wrote file");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.name.as_deref(), Some("write_file"));
    }

    #[test]
    fn char_len_includes_tool_calls() {
        let mut msg = Message::assistant("ok");
        let plain = msg.char_len();
        msg.tool_calls.push(MessageToolCall {
            id: "call_1".into(),
            name: "write_file".into(),
            arguments: r#"{"file_path":"a.py"}"#.into(),
        });
        assert!(msg.char_len() > plain + 20);
    }

    #[test]
    fn well_formed_conversation() {
        let mut conv = Conversation::with_system("You are a developer.");
        conv.push(Message::user("go"));
        let mut assistant = Message::assistant("calling a tool");
        assistant.tool_calls.push(MessageToolCall {
            id: "call_9".into(),
            name: "get_files_info".into(),
            arguments: "{}".into(),
        });
        conv.push(assistant);
        conv.push(Message::tool_result("call_9", "get_files_info", "- main.py"));
        assert!(conv.is_well_formed());
    }

    #[test]
    fn orphaned_tool_message_is_malformed() {
        let mut conv = Conversation::with_system("sys");
        conv.push(Message::tool_result("call_404", "write_file", "result"));
        assert!(!conv.is_well_formed());
    }

    #[test]
    fn missing_system_prompt_is_malformed() {
        let mut conv = Conversation::empty();
        conv.push(Message::user("hello"));
        assert!(!conv.is_well_formed());
    }

    #[test]
    fn total_chars_sums_messages() {
        let mut conv = Conversation::with_system("12345");
        conv.push(Message::user("1234567890"));
        assert_eq!(conv.total_chars(), 15);
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::user("Test message");
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "Test message");
        assert_eq!(deserialized.role, Role::User);
    }
}
