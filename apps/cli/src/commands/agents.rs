//! Agents command implementation.
//!
//! Lists the registered agents in pipeline order.

use super::print_json;
use buildwise_orchestrator::{AgentMetadata, AgentSystem};
use colored::Colorize;
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Output Key")]
    output_key: String,
}

/// Execute the agents command.
pub async fn execute(system: &AgentSystem, json_output: bool) -> anyhow::Result<()> {
    let agents = system.list_agents().await;

    if json_output {
        return print_json(&agents);
    }

    println!("{}", format!("{} agents available", agents.len()).bold());
    println!();
    println!("{}", render_table(&agents));
    Ok(())
}

fn render_table(agents: &[AgentMetadata]) -> String {
    let rows = agents.iter().enumerate().map(|(index, agent)| AgentRow {
        position: index + 1,
        id: agent.id.clone(),
        name: agent.name.clone(),
        output_key: agent.output_key.clone(),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}
