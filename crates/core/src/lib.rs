//! # codecrew Core
//!
//! Domain types, traits, and error definitions for the codecrew
//! coding-agent engine. This crate has **zero framework dependencies** —
//! it defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem boundary is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod approval;
pub mod error;
pub mod message;
pub mod provider;
pub mod task;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use approval::{ApprovalGate, ApprovalMode, Confirmation, Operator, TASK_ABORTED};
pub use error::{Error, Result};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk};
pub use task::TaskDepth;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
