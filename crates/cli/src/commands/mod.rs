//! CLI command implementations and shared wiring.

pub mod chat;
pub mod lead;
pub mod status;

use crate::operator::StdinOperator;
use codecrew_config::{AppConfig, RoleMemoryConfig, TrimPolicyChoice, API_KEY_ENV};
use codecrew_core::approval::{ApprovalGate, ApprovalMode};
use codecrew_core::provider::Provider;
use codecrew_memory::{MemoryTrimmer, TailStrategy, TrimPolicy};
use codecrew_providers::{OpenAiCompatProvider, RetryPolicy, RetryProvider};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Build the retrying completion gateway from configuration.
pub fn build_gateway(config: &AppConfig) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    if config.provider.api_key.is_empty() {
        return Err(format!(
            "No API key configured. Set {API_KEY_ENV} or [provider].api_key in codecrew.toml."
        )
        .into());
    }

    let backend = OpenAiCompatProvider::new(
        "openai-compat",
        &config.provider.base_url,
        &config.provider.api_key,
    )?;

    let policy = RetryPolicy {
        max_attempts: config.retry.max_attempts,
        multiplier: config.retry.multiplier,
        min_delay: Duration::from_secs(config.retry.min_delay_secs),
        max_delay: Duration::from_secs(config.retry.max_delay_secs),
    };

    Ok(Arc::new(RetryProvider::new(Arc::new(backend), policy)))
}

/// The session approval gate, interactive unless auto-approve is on.
pub fn build_gate(config: &AppConfig) -> Arc<ApprovalGate> {
    let mode = if config.tools.auto_approve {
        ApprovalMode::Auto
    } else {
        ApprovalMode::Interactive
    };
    Arc::new(ApprovalGate::new(Arc::new(StdinOperator), mode))
}

/// Translate a role's memory section into a trimmer.
pub fn trimmer_for(role: &RoleMemoryConfig) -> MemoryTrimmer {
    let policy = match role.policy {
        TrimPolicyChoice::Summarize => TrimPolicy::Summarize,
        TrimPolicyChoice::Discard => TrimPolicy::Discard,
    };
    let trimmer = MemoryTrimmer::new(role.budget_chars, policy);
    match policy {
        // Discard roles fill the tail greedily instead of a fixed count.
        TrimPolicy::Discard => trimmer
            .with_protected_head(2)
            .with_tail_strategy(TailStrategy::GreedyFill { margin: 2000 }),
        TrimPolicy::Summarize => trimmer,
    }
}

/// Read one line from stdin with a prompt. Returns `None` on EOF.
pub fn read_input(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    match std::io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// Whether the operator asked to leave the session.
pub fn is_exit(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "exit" | "quit")
}
