//! CLI command implementations.

pub mod agents;
pub mod pipeline;
pub mod run;

use anyhow::{Context, bail};
use buildwise_orchestrator::AgentInput;
use serde_json::Value;
use std::io::Read;

/// Reads the input document from a file, or from stdin when `source` is `-`.
pub fn read_input(source: &str) -> anyhow::Result<AgentInput> {
    let text = if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("Failed to read input from stdin")?;
        text
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read input file {source}"))?
    };

    parse_input(&text)
}

/// Parses an input document, which must be a JSON object.
pub fn parse_input(text: &str) -> anyhow::Result<AgentInput> {
    if text.trim().is_empty() {
        return Ok(AgentInput::new());
    }
    match serde_json::from_str(text).context("Input is not valid JSON")? {
        Value::Object(input) => Ok(input),
        _ => bail!("Input must be a JSON object"),
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_object() {
        let input = parse_input(r#"{"project_id": "p1"}"#).unwrap();
        assert_eq!(input["project_id"], "p1");
    }

    #[test]
    fn test_parse_input_empty_is_empty_object() {
        assert!(parse_input("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_input_rejects_non_objects() {
        assert_eq!(parse_input("[1]").unwrap_err().to_string(), "Input must be a JSON object");
        assert_eq!(parse_input("{oops").unwrap_err().to_string(), "Input is not valid JSON");
    }
}
