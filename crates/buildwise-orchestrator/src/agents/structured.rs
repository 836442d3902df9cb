//! Generic structured agent.
//!
//! One implementation drives every descriptor: resolve fields, render the prompt, ask for a
//! JSON reply, validate it against the schema (falling back to the static payload when it
//! does not fit), then merge annotations, derived fields, images and pass-through keys.

use crate::descriptor::{AgentDescriptor, AgentInput};
use crate::error::{AgentError, Result};
use crate::template;
use crate::{Agent, AgentOutput};
use async_trait::async_trait;
use buildwise_abstraction::{GenerationResult, encode_image};
use buildwise_models::GenerationClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Placeholder used in fault messages when the input carries no project ID.
const UNKNOWN_PROJECT: &str = "unknown project";

/// An agent defined entirely by its descriptor.
#[derive(Debug, Clone)]
pub struct StructuredAgent {
    descriptor: &'static AgentDescriptor,
    client: Arc<GenerationClient>,
}

impl StructuredAgent {
    /// Creates a new `StructuredAgent` backed by the shared client.
    pub fn new(descriptor: &'static AgentDescriptor, client: Arc<GenerationClient>) -> Self {
        Self { descriptor, client }
    }

    /// The descriptor driving this agent.
    pub fn descriptor(&self) -> &'static AgentDescriptor {
        self.descriptor
    }

    /// Runs the agent, exposing faults as typed errors.
    ///
    /// A reply that fails validation is not a fault: the fallback payload is used and the
    /// output is marked degraded.
    ///
    /// # Errors
    /// Returns `AgentError::Unavailable` when no reply could be generated, and other
    /// variants for template or fallback faults.
    pub async fn run(&self, input: &AgentInput) -> Result<AgentOutput> {
        let d = self.descriptor;
        let project_id = project_id_of(input);

        let fields = d.resolve_fields(input);
        let prompt = d.render_prompt(&fields)?;

        debug!(
            agent_id = d.id,
            project_id = %project_id,
            prompt_len = prompt.len(),
            temperature = d.temperature,
            "Requesting structured reply"
        );

        let text = match self.client.generate_text(&prompt, d.temperature).await {
            GenerationResult::Text(text) => text,
            GenerationResult::Unavailable(reason) => {
                error!(
                    agent_id = d.id,
                    task = d.task,
                    reason = %reason,
                    "No reply from generation service"
                );
                return Err(AgentError::Unavailable { task: d.task.to_string() });
            }
            GenerationResult::Image(_) => {
                return Err(AgentError::Other("expected text, received an image".to_string()));
            }
        };

        let (mut payload, mut degraded) = match d.schema.parse(&text) {
            Ok(object) => (object, false),
            Err(reason) => {
                warn!(
                    agent_id = d.id,
                    project_id = %project_id,
                    error = %reason,
                    "Model reply unusable, applying fallback payload"
                );
                (d.render_fallback(&fields)?, true)
            }
        };

        for (key, value) in d.annotations {
            let rendered = template::render(value, d.id, &fields)?;
            payload.insert((*key).to_string(), Value::String(rendered));
        }

        if let Some(finish) = d.finish {
            finish(&fields, &mut payload);
        }

        for image in d.images {
            let mut context = fields.clone();
            context.extend(payload.iter().map(|(k, v)| (k.clone(), v.clone())));
            let image_prompt = template::render(image.prompt, image.field, &context)?;

            let rendered = match self.client.generate_image(&image_prompt).await {
                GenerationResult::Image(bytes) => Value::String(encode_image(&bytes)),
                other => {
                    warn!(
                        agent_id = d.id,
                        field = image.field,
                        result = ?other,
                        "Image render unavailable"
                    );
                    degraded = true;
                    Value::Null
                }
            };
            payload.insert(image.field.to_string(), rendered);
        }

        for key in d.pass_through {
            if let Some(value) = input.get(*key) {
                payload.insert((*key).to_string(), value.clone());
            }
        }

        info!(
            agent_id = d.id,
            project_id = %project_id,
            degraded,
            status = "success",
            "Agent completed"
        );

        Ok(AgentOutput::success(d.name, d.output_key, payload, degraded))
    }
}

fn project_id_of(input: &AgentInput) -> String {
    match input.get("project_id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Null) | None => UNKNOWN_PROJECT.to_string(),
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl Agent for StructuredAgent {
    fn id(&self) -> &str {
        self.descriptor.id
    }

    fn name(&self) -> &str {
        self.descriptor.name
    }

    fn description(&self) -> &str {
        self.descriptor.description
    }

    fn output_key(&self) -> &str {
        self.descriptor.output_key
    }

    async fn process(&self, input: &AgentInput) -> AgentOutput {
        let d = self.descriptor;
        match self.run(input).await {
            Ok(output) => output,
            Err(e @ AgentError::Unavailable { .. }) => {
                AgentOutput::error(d.name, d.output_key, e.to_string())
            }
            Err(e) => {
                let project_id = project_id_of(input);
                error!(agent_id = d.id, project_id = %project_id, error = %e, "Agent failed");
                let message = format!("Failed {} for {project_id}: {e}", d.activity);
                AgentOutput::error(d.name, d.output_key, message)
            }
        }
    }
}
