//! Process-wide agent context.
//!
//! An `AgentSystem` is built once at startup and owns the shared generation client. Its
//! registry is populated lazily, exactly once, with one `StructuredAgent` per descriptor.

use crate::agents::StructuredAgent;
use crate::catalog::CATALOG;
use crate::descriptor::AgentDescriptor;
use crate::error::{AgentError, Result};
use crate::pipeline::Pipeline;
use crate::registry::{AgentMetadata, AgentRegistry};
use crate::Agent;
use buildwise_models::{BackendType, GenerationClient, Settings};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Shared context for building and looking up agents.
#[derive(Debug)]
pub struct AgentSystem {
    client: Arc<GenerationClient>,
    catalog: &'static [&'static AgentDescriptor],
    registry: OnceCell<Arc<AgentRegistry>>,
}

impl AgentSystem {
    /// Creates a system whose client connects to `backend_type` on first use.
    pub fn new(settings: Settings, backend_type: BackendType) -> Self {
        Self::with_client(Arc::new(GenerationClient::from_settings(settings, backend_type)))
    }

    /// Creates a system around an existing client.
    pub fn with_client(client: Arc<GenerationClient>) -> Self {
        Self { client, catalog: CATALOG, registry: OnceCell::new() }
    }

    /// Replaces the built-in catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: &'static [&'static AgentDescriptor]) -> Self {
        self.catalog = catalog;
        self
    }

    /// The shared generation client.
    pub fn client(&self) -> &Arc<GenerationClient> {
        &self.client
    }

    /// Returns the registry, building it on first call.
    pub async fn registry(&self) -> Arc<AgentRegistry> {
        self.registry
            .get_or_init(|| async {
                let registry = AgentRegistry::new();
                for &descriptor in self.catalog {
                    let agent = StructuredAgent::new(descriptor, Arc::clone(&self.client));
                    registry.register_agent(Arc::new(agent)).await;
                }
                info!(agent_count = self.catalog.len(), "Agent registry initialised");
                Arc::new(registry)
            })
            .await
            .clone()
    }

    /// Looks up an agent by ID.
    ///
    /// # Errors
    /// Returns `AgentError::UnknownAgent` if no agent has that ID.
    pub async fn agent(&self, id: &str) -> Result<Arc<dyn Agent + Send + Sync>> {
        self.registry().await.get_agent(id).await.ok_or_else(|| AgentError::UnknownAgent(id.to_string()))
    }

    /// Metadata of every agent, in pipeline order.
    pub async fn list_agents(&self) -> Vec<AgentMetadata> {
        self.registry().await.list_agents().await
    }

    /// Builds a pipeline over the given agents, or over every agent when `ids` is empty.
    ///
    /// # Errors
    /// Returns `AgentError::UnknownAgent` for the first ID that is not registered.
    pub async fn pipeline<S: AsRef<str>>(&self, ids: &[S]) -> Result<Pipeline> {
        let registry = self.registry().await;
        let ids: Vec<String> = if ids.is_empty() {
            registry.ids().await
        } else {
            ids.iter().map(|id| id.as_ref().to_string()).collect()
        };

        let mut agents = Vec::with_capacity(ids.len());
        for id in &ids {
            let agent = registry.get_agent(id).await.ok_or_else(|| AgentError::UnknownAgent(id.clone()))?;
            agents.push(agent);
        }
        Ok(Pipeline::new(agents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildwise_models::MockBackend;

    fn system() -> AgentSystem {
        AgentSystem::with_client(Arc::new(GenerationClient::with_backend(Arc::new(MockBackend::new("mock")))))
    }

    #[tokio::test]
    async fn test_registry_holds_catalog() {
        let system = system();
        let registry = system.registry().await;
        assert_eq!(registry.count().await, CATALOG.len());
        assert_eq!(registry.ids().await[0], "strategic_client_engagement_agent");
    }

    #[tokio::test]
    async fn test_registry_built_once() {
        let system = system();
        let first = system.registry().await;
        let second = system.registry().await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let err = system().agent("nope").await.err();
        assert!(matches!(err, Some(AgentError::UnknownAgent(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_pipeline_selection() {
        let system = system();
        assert_eq!(system.pipeline::<&str>(&[]).await.unwrap().len(), CATALOG.len());

        let pipeline = system
            .pipeline(&["site_intelligence_regulatory_compliance_agent", "learning_adaptation_agent"])
            .await
            .unwrap();
        assert_eq!(
            pipeline.agent_ids(),
            vec!["site_intelligence_regulatory_compliance_agent", "learning_adaptation_agent"]
        );

        assert!(system.pipeline(&["missing"]).await.is_err());
    }

    #[tokio::test]
    async fn test_custom_catalog() {
        static ONLY: &[&AgentDescriptor] = &[&crate::catalog::LEARNING_ADAPTATION];
        let system = system().with_catalog(ONLY);
        assert_eq!(system.list_agents().await.len(), 1);
    }
}
