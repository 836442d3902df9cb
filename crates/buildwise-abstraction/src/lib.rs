//! Generation abstraction layer for Buildwise.
//!
//! This module defines the core types and the backend trait used to talk to a hosted
//! text/image generation service. Agents never see transport errors directly: a
//! `GenerationBackend` reports a `GenerationError`, and the client layer folds it into
//! a `GenerationResult::Unavailable`.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest sampling temperature accepted by the generation boundary.
pub const MIN_TEMPERATURE: f32 = 0.0;

/// Highest sampling temperature accepted by the generation boundary.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Temperature used when a caller does not pick one.
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Represents an error that can occur when calling a generation backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The backend could not be configured (missing credentials, project, model name).
    #[error("Configuration Error: {0}")]
    Configuration(String),

    /// The request could not be delivered (network issues, timeouts).
    #[error("Request Error: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("API Error ({status}): {body}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// Provider quota exceeded or rate limit hit.
    #[error("Provider '{provider}' quota exceeded: {message}")]
    QuotaExceeded {
        /// The provider name (e.g., "vertex", "gemini").
        provider: String,
        /// Error message from the provider.
        message: String,
    },

    /// An error occurred during serialization or deserialization.
    #[error("Serialization Error: {0}")]
    Serialization(String),

    /// The service answered but produced no usable content.
    #[error("Empty Response: {0}")]
    EmptyResponse(String),
}

/// The kind of artifact a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    /// Plain text completion.
    Text,
    /// A single rendered image.
    Image,
}

/// A single generation call. Constructed per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The rendered prompt.
    pub prompt: String,
    /// Sampling temperature, always within `[MIN_TEMPERATURE, MAX_TEMPERATURE]`.
    pub temperature: f32,
    /// What the caller wants back.
    pub kind: GenerationKind,
    /// Ask the backend for an `application/json` response (text requests only).
    #[serde(default)]
    pub json_output: bool,
}

impl GenerationRequest {
    /// Creates a text request. The temperature is clamped into the accepted range.
    #[must_use]
    pub fn text(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: clamp_temperature(temperature),
            kind: GenerationKind::Text,
            json_output: false,
        }
    }

    /// Creates an image request.
    #[must_use]
    pub fn image(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            kind: GenerationKind::Image,
            json_output: false,
        }
    }

    /// Requests a JSON response body from the model.
    #[must_use]
    pub fn with_json_output(mut self) -> Self {
        self.json_output = self.kind == GenerationKind::Text;
        self
    }
}

/// Clamps a temperature into `[MIN_TEMPERATURE, MAX_TEMPERATURE]`.
///
/// `NaN` maps to `DEFAULT_TEMPERATURE`.
#[must_use]
pub fn clamp_temperature(temperature: f32) -> f32 {
    if temperature.is_nan() {
        return DEFAULT_TEMPERATURE;
    }
    temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
}

/// Outcome of one generation call. No retry state is carried: one call, one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// Generated text content.
    Text(String),
    /// Raw image bytes.
    Image(Vec<u8>),
    /// The backend could not be reached or produced nothing usable.
    Unavailable(String),
}

impl GenerationResult {
    /// Returns `true` unless the result is `Unavailable`.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }

    /// Returns the text content, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the image bytes, if any.
    #[must_use]
    pub fn as_image(&self) -> Option<&[u8]> {
        match self {
            Self::Image(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<GenerationError> for GenerationResult {
    fn from(error: GenerationError) -> Self {
        Self::Unavailable(error.to_string())
    }
}

/// A trait for hosted generation services.
///
/// All backends must be `Send + Sync` so one instance can be shared by every agent.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generates text for the given request.
    ///
    /// # Errors
    /// Returns a `GenerationError` when the service fails or returns no candidate with content.
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Generates a single image for the given request.
    ///
    /// # Errors
    /// Returns a `GenerationError` when the service fails or returns no image.
    async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>, GenerationError>;

    /// Returns an identifier for the backend and model (used in logs).
    fn backend_id(&self) -> &str;
}

/// Encodes raw image bytes into the transport-safe base64 form.
#[must_use]
pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a base64 image payload received from a transport.
///
/// # Errors
/// Returns `GenerationError::Serialization` if the payload is not valid base64.
pub fn decode_image(encoded: &str) -> Result<Vec<u8>, GenerationError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| GenerationError::Serialization(format!("Invalid base64 image payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_request_clamps_temperature() {
        assert!((GenerationRequest::text("p", 3.5).temperature - 2.0).abs() < f32::EPSILON);
        assert!(GenerationRequest::text("p", -1.0).temperature.abs() < f32::EPSILON);
        assert!((GenerationRequest::text("p", 0.3).temperature - 0.3).abs() < f32::EPSILON);
        assert!(
            (GenerationRequest::text("p", f32::NAN).temperature - DEFAULT_TEMPERATURE).abs()
                < f32::EPSILON
        );
    }

    #[test]
    fn test_json_output_only_applies_to_text() {
        assert!(GenerationRequest::text("p", 0.2).with_json_output().json_output);
        assert!(!GenerationRequest::image("p").with_json_output().json_output);
    }

    #[test]
    fn test_error_converts_to_unavailable() {
        let result: GenerationResult =
            GenerationError::Configuration("PROJECT_ID is not set".to_string()).into();
        assert_eq!(
            result,
            GenerationResult::Unavailable("Configuration Error: PROJECT_ID is not set".to_string())
        );
        assert!(!result.is_available());
    }

    #[test]
    fn test_result_accessors() {
        let text = GenerationResult::Text("hello".to_string());
        assert_eq!(text.as_text(), Some("hello"));
        assert_eq!(text.as_image(), None);

        let image = GenerationResult::Image(vec![1, 2, 3]);
        assert_eq!(image.as_image(), Some(&[1u8, 2, 3][..]));
        assert!(image.is_available());
    }

    #[test]
    fn test_image_base64_boundary() {
        let bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        let encoded = encode_image(&bytes);
        assert_eq!(encoded, "iVBORw0KGgo=");
        assert_eq!(decode_image("iVBORw0KGgo=\n").unwrap(), bytes);
        assert!(matches!(decode_image("not base64!"), Err(GenerationError::Serialization(_))));
    }

    #[test]
    fn test_error_display() {
        let error = GenerationError::Api { status: 500, body: "boom".to_string() };
        assert_eq!(error.to_string(), "API Error (500): boom");

        let quota = GenerationError::QuotaExceeded {
            provider: "vertex".to_string(),
            message: "RESOURCE_EXHAUSTED".to_string(),
        };
        assert_eq!(quota.to_string(), "Provider 'vertex' quota exceeded: RESOURCE_EXHAUSTED");
    }
}
