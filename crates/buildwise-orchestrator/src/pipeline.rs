//! Sequential agent pipeline.
//!
//! Each successful payload is merged into the running state under the agent's output key, so
//! later agents see everything produced before them. Keys are never removed.

use crate::descriptor::AgentInput;
use crate::{Agent, AgentOutput};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Final state: the caller's input plus every successful payload.
    pub state: AgentInput,
    /// One output per agent that ran, in order.
    pub outputs: Vec<AgentOutput>,
    /// ID of the agent whose error stopped the run.
    pub halted_at: Option<String>,
}

impl PipelineReport {
    /// Returns `true` if every agent that ran succeeded.
    pub fn is_success(&self) -> bool {
        self.outputs.iter().all(AgentOutput::is_success)
    }

    /// Number of outputs marked degraded.
    pub fn degraded_count(&self) -> usize {
        self.outputs.iter().filter(|o| o.degraded).count()
    }
}

/// An ordered list of agents run one after another.
pub struct Pipeline {
    agents: Vec<Arc<dyn Agent + Send + Sync>>,
    halt_on_error: bool,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("agents", &self.agents.iter().map(|a| a.id()).collect::<Vec<_>>())
            .field("halt_on_error", &self.halt_on_error)
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline that halts on the first error.
    pub fn new(agents: Vec<Arc<dyn Agent + Send + Sync>>) -> Self {
        Self { agents, halt_on_error: true }
    }

    /// Keeps running after an agent reports an error.
    #[must_use]
    pub fn continue_on_error(mut self) -> Self {
        self.halt_on_error = false;
        self
    }

    /// IDs of the agents, in run order.
    pub fn agent_ids(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.id()).collect()
    }

    /// Number of agents in the pipeline.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the pipeline has no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Runs every agent in order against the accumulated state.
    ///
    /// A missing `project_id` is assigned before the first agent runs.
    pub async fn run(&self, input: AgentInput) -> PipelineReport {
        let mut state = input;
        if state.get("project_id").is_none_or(Value::is_null) {
            let project_id = new_project_id();
            debug!(project_id = %project_id, "Assigned project ID");
            state.insert("project_id".to_string(), Value::String(project_id));
        }

        let mut outputs = Vec::with_capacity(self.agents.len());
        let mut halted_at = None;

        for agent in &self.agents {
            debug!(agent_id = agent.id(), "Running pipeline step");
            let output = agent.process(&state).await;

            if let Some(payload) = output.payload.as_ref().filter(|_| output.is_success()) {
                state.insert(agent.output_key().to_string(), Value::Object(payload.clone()));
            } else {
                warn!(
                    agent_id = agent.id(),
                    message = output.message.as_deref().unwrap_or_default(),
                    "Pipeline step failed"
                );
                if self.halt_on_error {
                    halted_at = Some(agent.id().to_string());
                    outputs.push(output);
                    break;
                }
            }
            outputs.push(output);
        }

        let report = PipelineReport { state, outputs, halted_at };
        info!(
            steps = report.outputs.len(),
            degraded = report.degraded_count(),
            halted_at = report.halted_at.as_deref().unwrap_or("none"),
            status = if report.is_success() { "success" } else { "error" },
            "Pipeline finished"
        );
        report
    }
}

/// `proj_` followed by eight hex characters.
fn new_project_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("proj_{}", &simple[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Map, json};

    /// Echoes the keys it saw; fails when `fail` is set.
    struct StepAgent {
        id: &'static str,
        key: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl Agent for StepAgent {
        fn id(&self) -> &str {
            self.id
        }

        fn name(&self) -> &str {
            self.id
        }

        fn description(&self) -> &str {
            "Pipeline step"
        }

        fn output_key(&self) -> &str {
            self.key
        }

        async fn process(&self, input: &AgentInput) -> AgentOutput {
            if self.fail {
                return AgentOutput::error(self.id, self.key, "step failed");
            }
            let mut payload = Map::new();
            let seen: Vec<_> = input.keys().cloned().collect();
            payload.insert("seen".to_string(), json!(seen));
            AgentOutput::success(self.id, self.key, payload, false)
        }
    }

    fn step(id: &'static str, key: &'static str, fail: bool) -> Arc<dyn Agent + Send + Sync> {
        Arc::new(StepAgent { id, key, fail })
    }

    #[test]
    fn test_new_project_id_format() {
        let id = new_project_id();
        assert_eq!(id.len(), 13);
        assert!(id.starts_with("proj_"));
        assert!(id[5..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_payloads_are_merged_in_order() {
        let pipeline = Pipeline::new(vec![step("first", "first_out", false), step("second", "second_out", false)]);
        let input = json!({"project_id": "p1", "location": "London, UK"}).as_object().cloned().unwrap();

        let report = pipeline.run(input).await;

        assert!(report.is_success());
        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.halted_at, None);
        assert_eq!(report.state["project_id"], json!("p1"));
        assert_eq!(report.state["location"], json!("London, UK"));
        assert_eq!(report.state["second_out"]["seen"], json!(["first_out", "location", "project_id"]));
    }

    #[tokio::test]
    async fn test_project_id_is_assigned() {
        let report = Pipeline::new(vec![step("only", "only_out", false)]).run(AgentInput::new()).await;
        let project_id = report.state["project_id"].as_str().unwrap();
        assert!(project_id.starts_with("proj_"));
    }

    #[tokio::test]
    async fn test_halts_on_error() {
        let pipeline = Pipeline::new(vec![
            step("first", "first_out", false),
            step("broken", "broken_out", true),
            step("third", "third_out", false),
        ]);

        let report = pipeline.run(AgentInput::new()).await;

        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.halted_at.as_deref(), Some("broken"));
        assert!(!report.is_success());
        assert!(!report.state.contains_key("broken_out"));
        assert!(!report.state.contains_key("third_out"));
    }

    #[tokio::test]
    async fn test_continue_on_error() {
        let pipeline = Pipeline::new(vec![step("broken", "broken_out", true), step("second", "second_out", false)])
            .continue_on_error();

        let report = pipeline.run(AgentInput::new()).await;

        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.halted_at, None);
        assert!(report.state.contains_key("second_out"));
        assert!(!report.state.contains_key("broken_out"));
    }

    #[test]
    fn test_debug_lists_agent_ids() {
        let pipeline = Pipeline::new(vec![step("a", "a_out", false)]);
        assert_eq!(pipeline.agent_ids(), vec!["a"]);
        assert!(format!("{pipeline:?}").contains("halt_on_error: true"));
    }

    #[test]
    fn test_len_and_is_empty() {
        assert!(Pipeline::new(Vec::new()).is_empty());

        let pipeline = Pipeline::new(vec![step("a", "a_out", false), step("b", "b_out", false)]);
        assert_eq!(pipeline.len(), 2);
        assert!(!pipeline.is_empty());
    }
}
