//! History summarization — compresses older conversation into dense text.
//!
//! The middle of an over-budget conversation is linearized into a plain
//! transcript (tool calls included, long contents truncated) and sent to
//! the model with a dedicated memory-module prompt. The result is folded
//! into a single synthetic system message carrying the summary marker.

use codecrew_core::error::MemoryError;
use codecrew_core::message::{Message, Role};
use codecrew_core::provider::{Provider, ProviderRequest};

/// Marker prefix identifying synthetic summary messages. Existing blocks
/// carrying it are preserved verbatim across later trim passes instead of
/// being re-summarized.
pub const SUMMARY_MARKER: &str = "PREVIOUS CONVERSATION SUMMARY:";

/// Per-message content cap in the linearized transcript.
const PER_MESSAGE_CAP: usize = 2000;

const SUMMARIZE_PROMPT: &str = "You are the agent's memory module. Summarize the following \
conversation history. Focus strictly on: 1) What tasks have been completed. 2) What decisions \
were made. 3) The current state of the codebase. Be highly concise, technical, and accurate. \
Do not add fluff.";

/// Render messages as a plain transcript the summarizer model can read.
///
/// Each line is `[ROLE (tool name)]: content`, with content truncated to a
/// fixed cap and one `[ACTION TAKEN: ...]` line appended per tool call so
/// the summarizer sees what actions were requested.
pub fn linearize_history(messages: &[Message]) -> String {
    let mut transcript = String::new();

    for msg in messages {
        let mut content = msg.content.clone();
        for tc in &msg.tool_calls {
            content.push_str(&format!(
                "\n[ACTION TAKEN: Called tool '{}' with instructions: {}]",
                tc.name, tc.arguments
            ));
        }

        let role = match msg.role {
            Role::System => "SYSTEM",
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
            Role::Tool => "TOOL",
        };
        let prefix = match &msg.name {
            Some(name) => format!("{role} ({name})"),
            None => role.to_string(),
        };

        let truncated = if content.len() > PER_MESSAGE_CAP {
            let mut cut = PER_MESSAGE_CAP;
            while !content.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...", &content[..cut])
        } else {
            content
        };

        transcript.push_str(&format!("[{prefix}]: {truncated}\n"));
    }

    transcript
}

/// Summarize a slice of history through the completion gateway.
pub async fn summarize_history(
    provider: &dyn Provider,
    model: &str,
    messages: &[Message],
) -> Result<String, MemoryError> {
    let transcript = linearize_history(messages);
    let prompt = format!("{SUMMARIZE_PROMPT}\n\nHISTORY TO SUMMARIZE:\n{transcript}");

    let request = ProviderRequest {
        model: model.to_string(),
        messages: vec![Message::user(prompt)],
        temperature: 0.3,
        max_tokens: None,
        tools: vec![],
        stream: false,
    };

    let response = provider
        .complete(request)
        .await
        .map_err(|e| MemoryError::Summarization(e.to_string()))?;

    Ok(response.message.content)
}
