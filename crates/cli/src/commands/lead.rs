//! `codecrew lead` — talk to the tech lead, who delegates to workers.

use super::{build_gate, build_gateway, is_exit, read_input, trimmer_for};
use codecrew_agent::{Coordinator, ProgressTracker, ReconcilePolicy};
use codecrew_config::{AppConfig, ReconcileChoice};
use codecrew_tools::{lead_registry, worker_registry, Dispatcher, WorkspaceSnapshot};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub async fn run(workspace: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(workspace)?;
    let gateway = build_gateway(&config)?;
    let gate = build_gate(&config);

    let snapshot = Arc::new(WorkspaceSnapshot::new(workspace));
    let timeout = Duration::from_secs(config.tools.script_timeout_secs);

    // The lead inspects; its workers mutate. Both share the session gate
    // and the cached workspace listing.
    let lead_dispatcher = Arc::new(Dispatcher::new(
        lead_registry(workspace),
        gate.clone(),
        snapshot.clone(),
    ));
    let worker_dispatcher = Arc::new(Dispatcher::new(
        worker_registry(workspace, timeout),
        gate,
        snapshot,
    ));

    let policy = match config.coordinator.reconcile {
        ReconcileChoice::Incremental => ReconcilePolicy::Incremental,
        ReconcileChoice::Monolithic => ReconcilePolicy::Monolithic,
    };

    let coordinator = Coordinator::new(
        gateway,
        &config.provider.model,
        lead_dispatcher,
        worker_dispatcher,
        ProgressTracker::new(workspace),
        policy,
    )
    .with_trimmer(trimmer_for(&config.memory.lead))
    .with_worker_trimmer(trimmer_for(&config.memory.worker))
    .with_temperature(config.provider.temperature);

    let mut conversation = coordinator.new_conversation();
    info!(workspace = %workspace.display(), policy = ?policy, "Lead session started");

    println!("You are now talking to the tech lead. Type 'exit' to quit.");
    loop {
        let Some(input) = read_input("\nYou (to lead) > ") else {
            break;
        };
        if input.is_empty() {
            continue;
        }
        if is_exit(&input) {
            break;
        }

        let answer = coordinator.run_turn(&mut conversation, &input).await;
        println!("\n{answer}");
    }

    Ok(())
}
