//! Agent orchestrator for Buildwise.
//!
//! This crate defines the agent trait, the structured-agent contract shared by every
//! construction-project agent, the catalog of agent descriptors, and the registry,
//! system context and pipeline that run them.

pub mod agents;
pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod response;
pub mod system;
pub mod template;

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

pub use agents::StructuredAgent;
pub use descriptor::{AgentDescriptor, AgentInput, FieldSpec, ImageSpec};
pub use error::{AgentError, InvalidResponse, TemplateError};
pub use pipeline::{Pipeline, PipelineReport};
pub use registry::{AgentMetadata, AgentRegistry};
pub use response::ResponseSchema;
pub use system::AgentSystem;

/// Outcome of one agent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// The payload is present (possibly degraded).
    Success,
    /// No payload; `message` explains why.
    Error,
}

/// Represents the output produced by an agent.
///
/// Serializes to `{"agent_name", "status", "degraded", "message"}` on error and to
/// `{"agent_name", "status", "degraded", <output_key>: payload}` on success.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutput {
    /// Display name of the agent.
    pub agent_name: String,
    /// Success or error.
    pub status: AgentStatus,
    /// The payload is not entirely model-produced (fallback applied or an image missing).
    pub degraded: bool,
    /// Error explanation, only on error.
    pub message: Option<String>,
    /// Key the payload is reported under.
    pub output_key: String,
    /// Structured result, only on success.
    pub payload: Option<Map<String, Value>>,
}

impl AgentOutput {
    /// Creates a success output.
    pub fn success(
        agent_name: impl Into<String>,
        output_key: impl Into<String>,
        payload: Map<String, Value>,
        degraded: bool,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            status: AgentStatus::Success,
            degraded,
            message: None,
            output_key: output_key.into(),
            payload: Some(payload),
        }
    }

    /// Creates an error output.
    pub fn error(
        agent_name: impl Into<String>,
        output_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            status: AgentStatus::Error,
            degraded: false,
            message: Some(message.into()),
            output_key: output_key.into(),
            payload: None,
        }
    }

    /// Returns `true` on success.
    pub fn is_success(&self) -> bool {
        self.status == AgentStatus::Success
    }

    /// Converts the output into its JSON form.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for AgentOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("agent_name", &self.agent_name)?;
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry("degraded", &self.degraded)?;
        match (&self.status, &self.payload, &self.message) {
            (AgentStatus::Success, Some(payload), _) => {
                map.serialize_entry(&self.output_key, payload)?;
            }
            (_, _, Some(message)) => map.serialize_entry("message", message)?,
            _ => {}
        }
        map.end()
    }
}

/// A trait that defines the interface for any agent.
///
/// `process` is the infallible agent boundary: every failure is reported through an
/// `error`-status `AgentOutput`.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the unique ID of the agent.
    fn id(&self) -> &str;

    /// Returns the display name of the agent.
    fn name(&self) -> &str;

    /// Returns a description of the agent's purpose.
    fn description(&self) -> &str;

    /// Returns the key the agent's payload is reported under.
    fn output_key(&self) -> &str;

    /// Processes an input bag into an output.
    async fn process(&self, input: &AgentInput) -> AgentOutput;
}
