//! Agent registry for managing registered agents.
//!
//! Agents are kept in registration order, which is also the default pipeline order.

use crate::Agent;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Metadata about a registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentMetadata {
    /// The agent's unique ID.
    pub id: String,
    /// The agent's display name.
    pub name: String,
    /// The agent's description.
    pub description: String,
    /// Key the agent's payload is reported under.
    pub output_key: String,
}

#[derive(Default)]
struct Entries {
    agents: HashMap<String, Arc<dyn Agent + Send + Sync>>,
    order: Vec<String>,
}

/// Registry for managing agents.
pub struct AgentRegistry {
    /// Agents by ID, plus their registration order.
    entries: Arc<RwLock<Entries>>,
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agent_count", &self.entries.try_read().map(|e| e.order.len()).unwrap_or(0))
            .finish_non_exhaustive()
    }
}

impl AgentRegistry {
    /// Creates a new empty agent registry.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Arc::new(RwLock::new(Entries::default())) }
    }

    /// Registers an agent in the registry.
    ///
    /// # Returns
    /// Returns `true` if the agent was newly registered, `false` if it replaced an existing agent.
    /// A replaced agent keeps its position in the listing.
    pub async fn register_agent(&self, agent: Arc<dyn Agent + Send + Sync>) -> bool {
        let id = agent.id().to_string();

        debug!(agent_id = %id, "Registering agent");

        let mut entries = self.entries.write().await;
        let was_new = entries.agents.insert(id.clone(), agent).is_none();

        if was_new {
            entries.order.push(id);
        } else {
            warn!(agent_id = %id, "Agent replaced in registry");
        }

        was_new
    }

    /// Retrieves an agent by ID.
    pub async fn get_agent(&self, id: &str) -> Option<Arc<dyn Agent + Send + Sync>> {
        debug!(agent_id = %id, "Retrieving agent");

        let entries = self.entries.read().await;
        entries.agents.get(id).cloned()
    }

    /// Lists all registered agents with their metadata, in registration order.
    pub async fn list_agents(&self) -> Vec<AgentMetadata> {
        debug!("Listing all agents");

        let entries = self.entries.read().await;
        entries
            .order
            .iter()
            .filter_map(|id| entries.agents.get(id))
            .map(|agent| AgentMetadata {
                id: agent.id().to_string(),
                name: agent.name().to_string(),
                description: agent.description().to_string(),
                output_key: agent.output_key().to_string(),
            })
            .collect()
    }

    /// Returns the registered IDs in registration order.
    pub async fn ids(&self) -> Vec<String> {
        self.entries.read().await.order.clone()
    }

    /// Unregisters an agent from the registry.
    ///
    /// # Returns
    /// Returns `true` if the agent was found and removed, `false` otherwise.
    pub async fn unregister_agent(&self, id: &str) -> bool {
        debug!(agent_id = %id, "Unregistering agent");

        let mut entries = self.entries.write().await;
        let removed = entries.agents.remove(id).is_some();

        if removed {
            entries.order.retain(|existing| existing != id);
        } else {
            warn!(agent_id = %id, "Attempted to unregister non-existent agent");
        }

        removed
    }

    /// Checks if an agent is registered.
    pub async fn is_registered(&self, id: &str) -> bool {
        self.entries.read().await.agents.contains_key(id)
    }

    /// Returns the number of registered agents.
    pub async fn count(&self) -> usize {
        self.entries.read().await.order.len()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentInput, AgentOutput};
    use async_trait::async_trait;

    /// Agent that reports its input size.
    struct CountingAgent {
        id: String,
        description: String,
    }

    impl CountingAgent {
        fn new(id: &str, description: &str) -> Self {
            Self { id: id.to_string(), description: description.to_string() }
        }
    }

    #[async_trait]
    impl Agent for CountingAgent {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            "Counting Agent"
        }

        fn description(&self) -> &str {
            &self.description
        }

        fn output_key(&self) -> &str {
            "count"
        }

        async fn process(&self, input: &AgentInput) -> AgentOutput {
            let mut payload = serde_json::Map::new();
            payload.insert("keys".to_string(), input.len().into());
            AgentOutput::success(self.name(), self.output_key(), payload, false)
        }
    }

    #[tokio::test]
    async fn test_register_agent() {
        let registry = AgentRegistry::new();
        let agent = Arc::new(CountingAgent::new("test-agent", "Test agent"));

        let was_new = registry.register_agent(agent).await;
        assert!(was_new);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_agent_keeps_position() {
        let registry = AgentRegistry::new();
        registry.register_agent(Arc::new(CountingAgent::new("a", "First"))).await;
        registry.register_agent(Arc::new(CountingAgent::new("b", "Second"))).await;

        let was_new = registry.register_agent(Arc::new(CountingAgent::new("a", "Updated"))).await;
        assert!(!was_new);
        assert_eq!(registry.count().await, 2);
        assert_eq!(registry.ids().await, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.get_agent("a").await.unwrap().description(), "Updated");
    }

    #[tokio::test]
    async fn test_get_agent() {
        let registry = AgentRegistry::new();
        let agent = Arc::new(CountingAgent::new("test-agent", "Test agent"));
        registry.register_agent(agent).await;

        let retrieved = registry.get_agent("test-agent").await;
        assert!(retrieved.is_some());

        let output = retrieved.unwrap().process(&AgentInput::new()).await;
        assert!(output.is_success());
    }

    #[tokio::test]
    async fn test_get_nonexistent_agent() {
        let registry = AgentRegistry::new();
        assert!(registry.get_agent("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_list_agents_in_registration_order() {
        let registry = AgentRegistry::new();
        for id in ["zeta", "alpha", "mid"] {
            registry.register_agent(Arc::new(CountingAgent::new(id, "Agent"))).await;
        }

        let agents = registry.list_agents().await;
        let ids: Vec<_> = agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
        assert_eq!(agents[0].output_key, "count");
        assert_eq!(agents[0].name, "Counting Agent");
    }

    #[tokio::test]
    async fn test_unregister_agent() {
        let registry = AgentRegistry::new();
        registry.register_agent(Arc::new(CountingAgent::new("a", "A"))).await;
        registry.register_agent(Arc::new(CountingAgent::new("b", "B"))).await;

        assert!(registry.unregister_agent("a").await);
        assert_eq!(registry.ids().await, vec!["b".to_string()]);
        assert!(!registry.unregister_agent("a").await);
    }

    #[tokio::test]
    async fn test_is_registered() {
        let registry = AgentRegistry::new();
        assert!(!registry.is_registered("test-agent").await);

        registry.register_agent(Arc::new(CountingAgent::new("test-agent", "Test agent"))).await;
        assert!(registry.is_registered("test-agent").await);
    }

    #[test]
    fn test_debug_format() {
        let registry = AgentRegistry::new();
        assert!(format!("{registry:?}").contains("agent_count: 0"));
    }
}
