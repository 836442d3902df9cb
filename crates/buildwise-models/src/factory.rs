//! Backend factory for creating generation backends from settings.

use crate::settings::Settings;
use crate::{GeminiBackend, MockBackend};
use buildwise_abstraction::{GenerationBackend, GenerationError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

/// Backend type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendType {
    /// Scripted mock backend for tests and offline runs.
    Mock,
    /// Google Vertex AI.
    #[default]
    Vertex,
    /// Google Gemini developer API.
    Gemini,
}

impl FromStr for BackendType {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "vertex" | "vertexai" | "vertex-ai" => Ok(Self::Vertex),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(GenerationError::Configuration(format!(
                "Unknown backend type '{other}' (expected mock, vertex or gemini)"
            ))),
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mock => "mock",
            Self::Vertex => "vertex",
            Self::Gemini => "gemini",
        })
    }
}

/// Factory for creating backend instances.
pub struct BackendFactory;

impl BackendFactory {
    /// Creates a backend of the given type from settings.
    ///
    /// # Errors
    /// Returns a `GenerationError` if the settings lack what the backend needs.
    pub fn create(
        backend_type: BackendType,
        settings: &Settings,
    ) -> Result<Arc<dyn GenerationBackend>, GenerationError> {
        debug!(
            backend_type = %backend_type,
            model_id = %settings.gemini_model_name,
            "Creating generation backend"
        );

        let backend: Arc<dyn GenerationBackend> = match backend_type {
            BackendType::Mock => Arc::new(MockBackend::new("mock")),
            BackendType::Vertex => Arc::new(GeminiBackend::vertex_from_settings(settings)?),
            BackendType::Gemini => Arc::new(GeminiBackend::developer_from_settings(settings)?),
        };
        Ok(backend)
    }

    /// Creates a backend from a type string.
    ///
    /// # Errors
    /// Returns a `GenerationError` if the type string is unknown or creation fails.
    pub fn create_from_str(
        backend_type: &str,
        settings: &Settings,
    ) -> Result<Arc<dyn GenerationBackend>, GenerationError> {
        let parsed = backend_type.parse::<BackendType>().inspect_err(|e| {
            error!(backend_type, error = %e, "Invalid backend type");
        })?;
        Self::create(parsed, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_from_str() {
        assert_eq!("mock".parse::<BackendType>().unwrap(), BackendType::Mock);
        assert_eq!("VERTEX".parse::<BackendType>().unwrap(), BackendType::Vertex);
        assert_eq!("Gemini".parse::<BackendType>().unwrap(), BackendType::Gemini);
        assert!("claude".parse::<BackendType>().is_err());
    }

    #[test]
    fn test_backend_type_display_round_trips() {
        for backend in [BackendType::Mock, BackendType::Vertex, BackendType::Gemini] {
            assert_eq!(backend.to_string().parse::<BackendType>().unwrap(), backend);
        }
        assert_eq!(BackendType::default(), BackendType::Vertex);
    }

    #[test]
    fn test_create_mock() {
        let backend = BackendFactory::create(BackendType::Mock, &Settings::default()).unwrap();
        assert_eq!(backend.backend_id(), "mock");
    }

    #[test]
    fn test_create_vertex_without_project_fails() {
        let result = BackendFactory::create(BackendType::Vertex, &Settings::default());
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }

    #[test]
    fn test_create_gemini_with_key() {
        let settings =
            Settings { gemini_api_key: Some("test-key".to_string()), ..Settings::default() };
        let backend = BackendFactory::create_from_str("gemini", &settings).unwrap();
        assert_eq!(backend.backend_id(), "gemini:gemini-1.5-flash");
    }

    #[test]
    fn test_create_from_invalid_str() {
        assert!(BackendFactory::create_from_str("unknown", &Settings::default()).is_err());
    }
}
