// Error types for structured agents

use thiserror::Error;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Faults raised while running an agent. At the agent boundary every variant becomes an
/// `error`-status output; none of them reach the caller as a raised error.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The generation client could not produce a reply
    #[error("LLM did not generate a valid response for {task}.")]
    Unavailable {
        /// Task description of the agent
        task: String,
    },

    /// Prompt rendering failed
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// JSON error
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The static fallback of a descriptor does not satisfy its own schema
    #[error("Fallback payload for '{agent}' is invalid: {reason}")]
    InvalidFallback {
        /// Agent ID
        agent: String,
        /// What is wrong with it
        reason: String,
    },

    /// No agent is registered under the ID
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Other error
    #[error("Agent error: {0}")]
    Other(String),
}

/// Prompt template errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template names a placeholder no field provides
    #[error("Unknown placeholder '{{{placeholder}}}' in template '{template}'")]
    UnknownPlaceholder {
        /// Placeholder name without braces
        placeholder: String,
        /// Template name (agent ID or image field)
        template: String,
    },
}

/// Reasons a model reply cannot be used as a payload. Always recovered by the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidResponse {
    /// The reply is not JSON at all
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    /// The reply is JSON but not an object
    #[error("response is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    /// The object lacks required keys
    #[error("response is missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
}
