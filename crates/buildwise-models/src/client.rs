//! The shared generation client.
//!
//! A `GenerationClient` builds its backend on first use, exactly once, and never lets a
//! backend error escape: every failure is reported as `GenerationResult::Unavailable`.

use crate::factory::{BackendFactory, BackendType};
use crate::settings::Settings;
use buildwise_abstraction::{
    GenerationBackend, GenerationError, GenerationKind, GenerationRequest, GenerationResult,
    clamp_temperature,
};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

type BackendInit =
    dyn Fn() -> Result<Arc<dyn GenerationBackend>, GenerationError> + Send + Sync;

/// Lazily-initialised front end over a `GenerationBackend`.
pub struct GenerationClient {
    init: Box<BackendInit>,
    backend: OnceCell<Result<Arc<dyn GenerationBackend>, String>>,
    init_count: AtomicUsize,
}

impl fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.backend.get() {
            None => "uninitialized".to_string(),
            Some(Ok(backend)) => backend.backend_id().to_string(),
            Some(Err(reason)) => format!("unavailable: {reason}"),
        };
        f.debug_struct("GenerationClient").field("backend", &state).finish_non_exhaustive()
    }
}

impl GenerationClient {
    /// Creates a client that builds its backend with `init` on first use.
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn GenerationBackend>, GenerationError> + Send + Sync + 'static,
    {
        Self { init: Box::new(init), backend: OnceCell::new(), init_count: AtomicUsize::new(0) }
    }

    /// Creates a client whose backend is built from settings on first use.
    pub fn from_settings(settings: Settings, backend_type: BackendType) -> Self {
        Self::new(move || BackendFactory::create(backend_type, &settings))
    }

    /// Creates a client around an existing backend.
    pub fn with_backend(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::new(move || Ok(Arc::clone(&backend)))
    }

    /// Number of times backend initialisation has run. Never exceeds one.
    pub fn init_count(&self) -> usize {
        self.init_count.load(Ordering::SeqCst)
    }

    /// Returns the backend, initialising it on first call.
    async fn backend(&self) -> Result<&Arc<dyn GenerationBackend>, &str> {
        let slot = self
            .backend
            .get_or_init(|| async {
                self.init_count.fetch_add(1, Ordering::SeqCst);
                match (self.init)() {
                    Ok(backend) => {
                        info!(backend_id = backend.backend_id(), "Generation backend initialized");
                        Ok(backend)
                    }
                    Err(e) => {
                        error!(error = %e, "Generation backend unavailable");
                        Err(e.to_string())
                    }
                }
            })
            .await;

        slot.as_ref().map_err(String::as_str)
    }

    /// Generates a JSON reply. Returns `Text` when the service produced content, `Unavailable`
    /// otherwise.
    pub async fn generate_text(&self, prompt: &str, temperature: f32) -> GenerationResult {
        let clamped = clamp_temperature(temperature);
        if (clamped - temperature).abs() > f32::EPSILON || temperature.is_nan() {
            warn!(requested = temperature, clamped, "Clamping temperature to [0.0, 2.0]");
        }
        self.execute(&GenerationRequest::text(prompt, clamped).with_json_output()).await
    }

    /// Generates one image. Returns `Image` with raw bytes, `Unavailable` otherwise.
    pub async fn generate_image(&self, prompt: &str) -> GenerationResult {
        self.execute(&GenerationRequest::image(prompt)).await
    }

    /// Runs a prepared request.
    pub async fn execute(&self, request: &GenerationRequest) -> GenerationResult {
        let backend = match self.backend().await {
            Ok(backend) => backend,
            Err(reason) => {
                debug!(reason, "Skipping generation call, backend unavailable");
                return GenerationResult::Unavailable(reason.to_string());
            }
        };

        let result = match request.kind {
            GenerationKind::Text => {
                backend.generate_text(request).await.map(GenerationResult::Text)
            }
            GenerationKind::Image => {
                backend.generate_image(request).await.map(GenerationResult::Image)
            }
        };

        result.unwrap_or_else(|e| {
            error!(
                backend_id = backend.backend_id(),
                kind = ?request.kind,
                error = %e,
                "Generation call failed"
            );
            GenerationResult::from(e)
        })
    }
}
