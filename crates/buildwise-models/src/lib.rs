//! Generation backends for Buildwise.
//!
//! This crate provides concrete implementations of the `GenerationBackend` trait, the
//! settings they are built from, and the lazily-initialised `GenerationClient` agents share.
//!
//! # Supported Backends
//!
//! - **Mock**: Testing and offline runs
//! - **Vertex**: Google Vertex AI (project, location and an access token or service-account key required)
//! - **Gemini**: Google Gemini developer API (API key required)

pub mod client;
pub mod credentials;
pub mod factory;
pub mod gemini;
pub mod settings;

use async_trait::async_trait;
use buildwise_abstraction::{GenerationBackend, GenerationError, GenerationKind, GenerationRequest};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

pub use client::GenerationClient;
pub use factory::{BackendFactory, BackendType};
pub use gemini::{GeminiAuth, GeminiBackend};
pub use settings::{Settings, SettingsError};

/// Bytes returned by the mock backend for image requests (a PNG signature).
pub const MOCK_IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

/// A scriptable implementation of `GenerationBackend` for tests and offline runs.
///
/// Unscripted text calls echo the prompt, which is never valid JSON, so agents
/// backed by an unscripted mock always take their fallback path.
#[derive(Debug, Default)]
pub struct MockBackend {
    id: String,
    text_script: Mutex<VecDeque<Result<String, GenerationError>>>,
    image_script: Mutex<VecDeque<Result<Vec<u8>, GenerationError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockBackend {
    /// Creates a new `MockBackend` with the given ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    /// Queues the result of the next unanswered text call.
    #[must_use]
    pub fn with_text(self, result: Result<String, GenerationError>) -> Self {
        lock(&self.text_script).push_back(result);
        self
    }

    /// Queues the result of the next unanswered image call.
    #[must_use]
    pub fn with_image(self, result: Result<Vec<u8>, GenerationError>) -> Self {
        lock(&self.image_script).push_back(result);
        self
    }

    /// Queues a text result on a shared backend.
    pub fn push_text(&self, result: Result<String, GenerationError>) {
        lock(&self.text_script).push_back(result);
    }

    /// Queues an image result on a shared backend.
    pub fn push_image(&self, result: Result<Vec<u8>, GenerationError>) {
        lock(&self.image_script).push_back(result);
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    /// Number of text calls received.
    pub fn text_calls(&self) -> usize {
        self.count(GenerationKind::Text)
    }

    /// Number of image calls received.
    pub fn image_calls(&self) -> usize {
        self.count(GenerationKind::Image)
    }

    fn count(&self, kind: GenerationKind) -> usize {
        lock(&self.requests).iter().filter(|r| r.kind == kind).count()
    }

    fn record(&self, request: &GenerationRequest) {
        lock(&self.requests).push(request.clone());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        debug!(
            backend_id = %self.id,
            prompt_len = request.prompt.len(),
            temperature = request.temperature,
            "MockBackend generating text"
        );
        self.record(request);

        let scripted = lock(&self.text_script).pop_front();
        scripted.unwrap_or_else(|| Ok(format!("Mock response for: {}", request.prompt)))
    }

    async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>, GenerationError> {
        debug!(
            backend_id = %self.id,
            prompt_len = request.prompt.len(),
            "MockBackend generating image"
        );
        self.record(request);

        let scripted = lock(&self.image_script).pop_front();
        scripted.unwrap_or_else(|| Ok(MOCK_IMAGE_BYTES.to_vec()))
    }

    fn backend_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_echoes_prompt() {
        let backend = MockBackend::new("mock");
        let request = GenerationRequest::text("Describe the site", 0.2);
        let text = backend.generate_text(&request).await.unwrap();
        assert_eq!(text, "Mock response for: Describe the site");
        assert_eq!(backend.text_calls(), 1);
        assert_eq!(backend.image_calls(), 0);
    }

    #[tokio::test]
    async fn test_mock_backend_scripts_in_order() {
        let backend = MockBackend::new("mock")
            .with_text(Ok("first".to_string()))
            .with_text(Err(GenerationError::EmptyResponse("no candidates".to_string())));

        let request = GenerationRequest::text("p", 0.2);
        assert_eq!(backend.generate_text(&request).await.unwrap(), "first");
        assert!(backend.generate_text(&request).await.is_err());
        // Script exhausted: back to echoing.
        assert_eq!(backend.generate_text(&request).await.unwrap(), "Mock response for: p");
    }

    #[tokio::test]
    async fn test_mock_backend_images() {
        let backend = MockBackend::new("mock");
        backend.push_image(Ok(vec![7, 7, 7]));

        let request = GenerationRequest::image("A render");
        assert_eq!(backend.generate_image(&request).await.unwrap(), vec![7, 7, 7]);
        assert_eq!(backend.generate_image(&request).await.unwrap(), MOCK_IMAGE_BYTES.to_vec());
        assert_eq!(backend.image_calls(), 2);
        assert_eq!(backend.requests()[0].prompt, "A render");
    }

    #[test]
    fn test_mock_backend_id() {
        assert_eq!(MockBackend::new("offline").backend_id(), "offline");
    }
}
