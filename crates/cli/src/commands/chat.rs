//! `codecrew chat` — one autonomous agent, talking directly to you.

use super::{build_gate, build_gateway, is_exit, read_input, trimmer_for};
use codecrew_agent::{ReactLoop, RoleProfile};
use codecrew_config::AppConfig;
use codecrew_core::message::Conversation;
use codecrew_tools::{agent_registry, subagent_registry, Dispatcher, WorkspaceSnapshot};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub async fn run(
    workspace: &Path,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(workspace)?;
    let gateway = build_gateway(&config)?;
    let gate = build_gate(&config);

    let snapshot = Arc::new(WorkspaceSnapshot::new(workspace));
    let timeout = Duration::from_secs(config.tools.script_timeout_secs);
    let dispatcher = Arc::new(Dispatcher::new(
        agent_registry(workspace, timeout),
        gate.clone(),
        snapshot.clone(),
    ));
    // Spawned subagents share the session gate and workspace cache.
    let subagent_dispatcher = Arc::new(Dispatcher::new(
        subagent_registry(workspace, timeout),
        gate,
        snapshot,
    ));

    let profile = RoleProfile::agent().with_trimmer(trimmer_for(&config.memory.agent));
    let mut agent = ReactLoop::new(gateway, &config.provider.model, dispatcher, profile)
        .with_subagent_dispatcher(subagent_dispatcher)
        .with_temperature(config.provider.temperature);
    if let Some(max_tokens) = config.provider.max_tokens {
        agent = agent.with_max_tokens(max_tokens);
    }

    let mut conversation = Conversation::with_system("");
    info!(workspace = %workspace.display(), "Agent session started");

    if let Some(message) = message {
        let answer = agent.run_turn(&mut conversation, &message).await;
        println!("{answer}");
        return Ok(());
    }

    println!("codecrew agent ready. Type 'exit' to quit.");
    loop {
        let Some(input) = read_input("\nYou > ") else {
            break;
        };
        if input.is_empty() {
            continue;
        }
        if is_exit(&input) {
            break;
        }

        let answer = agent.run_turn(&mut conversation, &input).await;
        println!("\n{answer}");
    }

    Ok(())
}
