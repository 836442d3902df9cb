//! Pipeline command implementation.
//!
//! Runs a sequence of agents over an input document and prints the full report.

use super::{print_json, read_input};
use buildwise_orchestrator::AgentSystem;
use colored::Colorize;

/// Execute the pipeline command.
pub async fn execute(
    system: &AgentSystem,
    input: &str,
    agents: &[String],
    continue_on_error: bool,
) -> anyhow::Result<()> {
    let mut pipeline = system.pipeline(agents).await?;
    if continue_on_error {
        pipeline = pipeline.continue_on_error();
    }
    let input = read_input(input)?;

    let report = pipeline.run(input).await;
    print_json(&report)?;

    if let Some(agent_id) = &report.halted_at {
        eprintln!("{} pipeline halted at {agent_id}", "warning:".yellow().bold());
    }
    Ok(())
}
