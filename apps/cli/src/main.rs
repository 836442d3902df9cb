//! Buildwise CLI - command-line host for the construction-project agents
//!
//! Provides a `buildwise` command that lists the agents, runs one agent over a JSON input
//! document, or runs a pipeline of agents that share an accumulating state.

mod commands;

use buildwise_models::{BackendType, Settings};
use buildwise_orchestrator::AgentSystem;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, debug};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Buildwise CLI - structured AI agents for construction projects
///
/// Every agent turns a JSON input document into a structured result. Results are printed as
/// JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "buildwise", author, version, about = "Buildwise - structured agents for construction projects")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// TOML settings file (overridden by .env and the environment)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Generation backend (mock, vertex, gemini)
    #[arg(short, long, default_value = "vertex", global = true)]
    backend: BackendType,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available agents
    Agents {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a single agent
    ///
    /// Reads a JSON object from the input file (or stdin with `-`) and prints the agent's
    /// output. Exits non-zero when the agent reports an error.
    Run {
        /// Agent ID (see `buildwise agents`)
        agent_id: String,

        /// Input JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Run agents in sequence, merging each result into the shared state
    Pipeline {
        /// Input JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Comma-separated agent IDs (defaults to every agent, in catalog order)
        #[arg(short, long, value_delimiter = ',')]
        agents: Vec<String>,

        /// Keep going after an agent reports an error
        #[arg(long)]
        continue_on_error: bool,
    },
}

fn parse_level(level: &str) -> Level {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG, when set, wins over --log-level.
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(parse_level(&args.log_level)).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = Settings::load(args.config.as_deref())?;
    debug!(backend = %args.backend, "Settings loaded");
    let system = AgentSystem::new(settings, args.backend);

    match args.command {
        Command::Agents { json } => commands::agents::execute(&system, json).await,
        Command::Run { agent_id, input } => commands::run::execute(&system, &agent_id, &input).await,
        Command::Pipeline { input, agents, continue_on_error } => {
            commands::pipeline::execute(&system, &input, &agents, continue_on_error).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_pipeline_agents() {
        let args = Args::parse_from([
            "buildwise",
            "--backend",
            "mock",
            "pipeline",
            "--agents",
            "learning_adaptation_agent,workforce_management_hr_agent",
        ]);
        assert_eq!(args.backend, BackendType::Mock);
        match args.command {
            Command::Pipeline { agents, input, continue_on_error } => {
                assert_eq!(agents, vec!["learning_adaptation_agent", "workforce_management_hr_agent"]);
                assert_eq!(input, "-");
                assert!(!continue_on_error);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("bogus"), Level::WARN);
    }
}
