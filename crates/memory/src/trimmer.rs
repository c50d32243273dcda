//! Conversation trimmer — keeps history under a character budget.
//!
//! One trim pass:
//! 1. No-op while total length ≤ budget.
//! 2. The protected head (system prompt, plus the assigned task for
//!    goal-directed roles) is never touched.
//! 3. A protected tail is selected — a fixed count of recent messages, or
//!    a greedy backward fill that stops once a safety margin would be
//!    exceeded.
//! 4. Leading tool-role messages are dropped from the tail so the
//!    conversation never resumes on an orphaned tool result.
//! 5. The middle is summarized into one synthetic system message, or
//!    discarded outright, per policy.

use crate::summarizer::{summarize_history, SUMMARY_MARKER};
use codecrew_core::error::MemoryError;
use codecrew_core::message::{Conversation, Message, Role};
use codecrew_core::provider::Provider;
use tracing::{debug, info};

/// What to do with the middle of an over-budget conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimPolicy {
    /// Compress the middle into an LLM-generated summary message.
    Summarize,
    /// Drop the middle outright, trading recall for lower cost.
    Discard,
}

/// How the protected tail is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailStrategy {
    /// Keep the last N messages.
    FixedCount(usize),
    /// Walk backward keeping messages while the result stays under
    /// budget minus this safety margin.
    GreedyFill { margin: usize },
}

/// A configured trimmer for one agent role.
#[derive(Debug, Clone)]
pub struct MemoryTrimmer {
    budget_chars: usize,
    protected_head: usize,
    tail: TailStrategy,
    policy: TrimPolicy,
}

impl MemoryTrimmer {
    pub fn new(budget_chars: usize, policy: TrimPolicy) -> Self {
        Self {
            budget_chars,
            protected_head: 1,
            tail: TailStrategy::FixedCount(8),
            policy,
        }
    }

    /// Protect the first `count` messages instead of just the system
    /// prompt (goal-directed roles keep their assigned task pinned).
    pub fn with_protected_head(mut self, count: usize) -> Self {
        self.protected_head = count.max(1);
        self
    }

    pub fn with_tail_strategy(mut self, tail: TailStrategy) -> Self {
        self.tail = tail;
        self
    }

    pub fn budget(&self) -> usize {
        self.budget_chars
    }

    pub fn policy(&self) -> TrimPolicy {
        self.policy
    }

    /// Apply one trim pass. `provider` and `model` are consulted only by
    /// the summarize policy.
    pub async fn trim(
        &self,
        conversation: &mut Conversation,
        provider: &dyn Provider,
        model: &str,
    ) -> Result<(), MemoryError> {
        let total = conversation.total_chars();
        if total <= self.budget_chars {
            return Ok(());
        }

        let messages = &conversation.messages;
        let head_len = self.protected_head.min(messages.len());
        let tail_start = self.select_tail_start(messages, head_len);

        // Skip orphaned tool results at the front of the tail.
        let mut tail_start = tail_start;
        while tail_start < messages.len() && messages[tail_start].role == Role::Tool {
            tail_start += 1;
        }

        if tail_start <= head_len {
            // Nothing strictly between head and tail; no middle to trim.
            return Ok(());
        }

        info!(
            total_chars = total,
            budget = self.budget_chars,
            middle = tail_start - head_len,
            policy = ?self.policy,
            "Memory over budget, trimming older messages"
        );

        let head: Vec<Message> = messages[..head_len].to_vec();
        let middle: Vec<Message> = messages[head_len..tail_start].to_vec();
        let tail: Vec<Message> = messages[tail_start..].to_vec();

        let mut rebuilt = head;

        if self.policy == TrimPolicy::Summarize {
            // Existing summary blocks are preserved verbatim and
            // concatenated with the fresh summary, never re-summarized.
            let mut old_summaries: Vec<String> = Vec::new();
            let mut regular: Vec<Message> = Vec::new();
            for msg in middle {
                if msg.content.starts_with(SUMMARY_MARKER) {
                    old_summaries.push(msg.content);
                } else {
                    regular.push(msg);
                }
            }

            let new_summary = if regular.is_empty() {
                String::new()
            } else {
                summarize_history(provider, model, &regular).await?
            };

            let mut parts = old_summaries;
            if !new_summary.is_empty() {
                parts.push(new_summary);
            }
            let combined = parts.join("\n\n");
            rebuilt.push(Message::system(format!("{SUMMARY_MARKER}\n{combined}")));
        }

        rebuilt.extend(tail);
        conversation.messages = rebuilt;

        debug!(
            total_chars = conversation.total_chars(),
            "Memory trimmed, resuming"
        );
        Ok(())
    }

    /// Index of the first message in the protected tail.
    fn select_tail_start(&self, messages: &[Message], head_len: usize) -> usize {
        match self.tail {
            TailStrategy::FixedCount(n) => messages.len().saturating_sub(n).max(head_len),
            TailStrategy::GreedyFill { margin } => {
                let head_chars: usize = messages[..head_len].iter().map(Message::char_len).sum();
                let limit = self.budget_chars.saturating_sub(margin);

                let mut tail_chars = 0usize;
                let mut start = messages.len();
                while start > head_len {
                    let candidate = messages[start - 1].char_len();
                    if head_chars + tail_chars + candidate > limit {
                        break;
                    }
                    tail_chars += candidate;
                    start -= 1;
                }
                start
            }
        }
    }
}
