//! Run command implementation.
//!
//! Runs a single agent over an input document and prints its output.

use super::{print_json, read_input};
use anyhow::bail;
use buildwise_orchestrator::AgentSystem;
use tracing::info;

/// Execute the run command.
pub async fn execute(system: &AgentSystem, agent_id: &str, input: &str) -> anyhow::Result<()> {
    let agent = system.agent(agent_id).await?;
    let input = read_input(input)?;

    info!(agent_id, input_keys = input.len(), "Running agent");
    let output = agent.process(&input).await;
    print_json(&output)?;

    if !output.is_success() {
        bail!("Agent {agent_id} reported an error");
    }
    Ok(())
}
