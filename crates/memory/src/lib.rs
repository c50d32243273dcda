//! Bounded conversation memory for codecrew agents.
//!
//! A conversation grows with every model turn and tool result; left alone
//! it blows past the context window. The trimmer keeps the total
//! character length under a per-role budget without ever corrupting the
//! assistant/tool pairing invariant, either by summarizing the middle of
//! the history through the model or by discarding it outright.

pub mod summarizer;
pub mod trimmer;

pub use summarizer::{linearize_history, summarize_history, SUMMARY_MARKER};
pub use trimmer::{MemoryTrimmer, TailStrategy, TrimPolicy};
