//! LLM provider implementations for codecrew.
//!
//! All providers implement the `codecrew_core::Provider` trait. The
//! retrying gateway wraps any of them; the ReAct loop only ever sees the
//! gateway.

pub mod accumulator;
pub mod openai_compat;
pub mod retry;

pub use accumulator::{CallAccumulator, CallFragment};
pub use openai_compat::OpenAiCompatProvider;
pub use retry::{RetryPolicy, RetryProvider};
