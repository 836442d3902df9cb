//! Google Gemini backend over HTTP.
//!
//! Two authentication modes share one request/response shape:
//! Vertex AI (project + location + OAuth bearer token) and the Gemini developer API
//! (API key in the query string). Text goes through `:generateContent`, images through the
//! Imagen `:predict` method.

use crate::credentials::{Credentials, TokenProvider, resolve_credentials};
use crate::settings::Settings;
use async_trait::async_trait;
use buildwise_abstraction::{
    GenerationBackend, GenerationError, GenerationRequest, decode_image,
};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Default developer-API endpoint.
pub const GEMINI_API_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// How a `GeminiBackend` authenticates and addresses models.
#[derive(Debug, Clone)]
pub enum GeminiAuth {
    /// Vertex AI: models live under a project and region, calls carry a bearer token.
    Vertex {
        /// Google Cloud project ID.
        project_id: String,
        /// Region, e.g. "us-central1".
        location: String,
        /// Source of OAuth bearer tokens.
        tokens: Arc<TokenProvider>,
    },
    /// Gemini developer API keyed by an API key.
    ApiKey(String),
}

impl GeminiAuth {
    fn provider(&self) -> &'static str {
        match self {
            Self::Vertex { .. } => "vertex",
            Self::ApiKey(_) => "gemini",
        }
    }

    fn default_endpoint(&self) -> String {
        match self {
            Self::Vertex { location, .. } => format!("https://{location}-aiplatform.googleapis.com"),
            Self::ApiKey(_) => GEMINI_API_ENDPOINT.to_string(),
        }
    }

    /// Vertex AI auth from credentials; token exchanges share the backend timeout.
    ///
    /// # Errors
    /// Returns `GenerationError::Configuration` if the token client cannot be built.
    pub fn vertex(
        project_id: impl Into<String>,
        location: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self::Vertex {
            project_id: project_id.into(),
            location: location.into(),
            tokens: Arc::new(TokenProvider::new(credentials, timeout)?),
        })
    }
}

/// Google Gemini / Imagen backend.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    /// Authentication mode.
    auth: GeminiAuth,
    /// Scheme and host of the service, without a trailing slash.
    endpoint: String,
    /// Text model name.
    text_model: String,
    /// Image model name.
    image_model: String,
    /// Identifier used in logs, "<provider>:<text model>".
    id: String,
    /// HTTP client for making requests.
    client: Client,
}

impl GeminiBackend {
    /// Creates a new `GeminiBackend`.
    ///
    /// # Arguments
    /// * `auth` - Authentication mode
    /// * `text_model` - Model used for text generation (e.g. "gemini-1.5-flash")
    /// * `image_model` - Model used for image generation (e.g. "imagen-3.0-generate-002")
    /// * `timeout` - Upper bound on the duration of every HTTP call
    ///
    /// # Errors
    /// Returns `GenerationError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        auth: GeminiAuth,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            GenerationError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;
        let text_model = text_model.into();

        Ok(Self {
            endpoint: auth.default_endpoint(),
            id: format!("{}:{text_model}", auth.provider()),
            auth,
            text_model,
            image_model: image_model.into(),
            client,
        })
    }

    /// Overrides the service endpoint (scheme and host).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds a Vertex AI backend from settings.
    ///
    /// # Errors
    /// Returns `GenerationError::Configuration` if the project ID or credentials are missing.
    /// Service-account keys are exchanged for a token on the first call, not here.
    pub fn vertex_from_settings(settings: &Settings) -> Result<Self, GenerationError> {
        let project_id = settings
            .project_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| GenerationError::Configuration("PROJECT_ID is not set".to_string()))?;
        let credentials = resolve_credentials(settings)?;

        let auth = GeminiAuth::vertex(
            project_id,
            settings.location.clone(),
            credentials,
            Duration::from_secs(settings.request_timeout_secs),
        )?;
        Self::from_settings(auth, settings)
    }

    /// Builds a developer-API backend from settings.
    ///
    /// # Errors
    /// Returns `GenerationError::Configuration` if `GEMINI_API_KEY` is missing.
    pub fn developer_from_settings(settings: &Settings) -> Result<Self, GenerationError> {
        let api_key = settings
            .gemini_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::Configuration("GEMINI_API_KEY is not set".to_string())
            })?;

        Self::from_settings(GeminiAuth::ApiKey(api_key), settings)
    }

    fn from_settings(auth: GeminiAuth, settings: &Settings) -> Result<Self, GenerationError> {
        let backend = Self::new(
            auth,
            settings.gemini_model_name.clone(),
            settings.imagen_model_name.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )?;

        Ok(match settings.api_endpoint.as_deref().filter(|e| !e.is_empty()) {
            Some(endpoint) => backend.with_endpoint(endpoint),
            None => backend,
        })
    }

    /// Returns the URL for a model method, e.g. `generateContent` or `predict`.
    fn method_url(&self, model: &str, method: &str) -> String {
        match &self.auth {
            GeminiAuth::Vertex { project_id, location, .. } => format!(
                "{}/v1/projects/{project_id}/locations/{location}/publishers/google/models/{model}:{method}",
                self.endpoint
            ),
            GeminiAuth::ApiKey(_) => format!("{}/v1beta/models/{model}:{method}", self.endpoint),
        }
    }

    async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, GenerationError> {
        match &self.auth {
            GeminiAuth::Vertex { tokens, .. } => Ok(builder.bearer_auth(tokens.access_token().await?)),
            GeminiAuth::ApiKey(key) => Ok(builder.query(&[("key", key)])),
        }
    }

    /// Posts a JSON body and deserializes the JSON answer.
    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, GenerationError>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let provider = self.auth.provider();
        let response =
            self.authorize(self.client.post(url)).await?.json(body).send().await.map_err(|e| {
                error!(provider, error = %e, "Failed to send request to generation service");
                GenerationError::Request(format!("Network error: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                provider,
                status = %status,
                error = %error_text,
                "Generation service returned error status"
            );

            if status.as_u16() == 429 {
                return Err(GenerationError::QuotaExceeded {
                    provider: provider.to_string(),
                    message: error_text,
                });
            }
            return Err(GenerationError::Api { status: status.as_u16(), body: error_text });
        }

        response.json().await.map_err(|e| {
            error!(provider, error = %e, "Failed to parse generation service response");
            GenerationError::Serialization(format!("Failed to parse response: {e}"))
        })
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_text(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        debug!(
            model_id = %self.text_model,
            prompt_len = request.prompt.len(),
            temperature = request.temperature,
            json_output = request.json_output,
            "GeminiBackend generating text"
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: Some(request.prompt.clone()) }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: request.json_output.then(|| "application/json".to_string()),
            },
        };

        let url = self.method_url(&self.text_model, "generateContent");
        let response: GenerateContentResponse = self.post(&url, &body).await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| {
                error!(model_id = %self.text_model, "No content in generation response");
                GenerationError::EmptyResponse("No content in API response".to_string())
            })
    }

    async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<u8>, GenerationError> {
        debug!(
            model_id = %self.image_model,
            prompt_len = request.prompt.len(),
            "GeminiBackend generating image"
        );

        let body = PredictRequest {
            instances: vec![PredictInstance { prompt: request.prompt.clone() }],
            parameters: PredictParameters { sample_count: 1 },
        };

        let url = self.method_url(&self.image_model, "predict");
        let response: PredictResponse = self.post(&url, &body).await?;

        let encoded = response
            .predictions
            .into_iter()
            .find_map(|prediction| prediction.bytes_base64_encoded)
            .ok_or_else(|| {
                error!(model_id = %self.image_model, "No image in generation response");
                GenerationError::EmptyResponse("No image in API response".to_string())
            })?;

        decode_image(&encoded)
    }

    fn backend_id(&self) -> &str {
        &self.id
    }
}

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

/// `generateContent` response body.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Imagen `predict` request body.
#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
}

/// Imagen `predict` response body.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex() -> GeminiBackend {
        GeminiBackend::new(
            GeminiAuth::vertex(
                "buildwise-dev",
                "us-central1",
                Credentials::AccessToken("ya29.test".to_string()),
                Duration::from_secs(5),
            )
            .unwrap(),
            "gemini-1.5-flash",
            "imagen-3.0-generate-002",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_vertex_urls() {
        let backend = vertex();
        assert_eq!(backend.backend_id(), "vertex:gemini-1.5-flash");
        assert_eq!(
            backend.method_url("gemini-1.5-flash", "generateContent"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/buildwise-dev/locations/us-central1/publishers/google/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_developer_urls_and_endpoint_override() {
        let backend = GeminiBackend::new(
            GeminiAuth::ApiKey("key".to_string()),
            "gemini-1.5-flash",
            "imagen-3.0-generate-002",
            Duration::from_secs(5),
        )
        .unwrap()
        .with_endpoint("http://127.0.0.1:9000/");

        assert_eq!(backend.backend_id(), "gemini:gemini-1.5-flash");
        assert_eq!(
            backend.method_url("imagen-3.0-generate-002", "predict"),
            "http://127.0.0.1:9000/v1beta/models/imagen-3.0-generate-002:predict"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: Some("hi".to_string()) }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                response_mime_type: Some("application/json".to_string()),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");

        let predict = PredictRequest {
            instances: vec![PredictInstance { prompt: "a house".to_string() }],
            parameters: PredictParameters { sample_count: 1 },
        };
        let json = serde_json::to_value(&predict).unwrap();
        assert_eq!(json["parameters"]["sampleCount"], 1);
    }

    #[test]
    fn test_settings_validation() {
        let missing_project = GeminiBackend::vertex_from_settings(&Settings::default());
        assert!(matches!(missing_project, Err(GenerationError::Configuration(ref m)) if m.contains("PROJECT_ID")));

        let missing_token = GeminiBackend::vertex_from_settings(&Settings {
            project_id: Some("p".to_string()),
            ..Settings::default()
        });
        assert!(matches!(missing_token, Err(GenerationError::Configuration(_))));

        let missing_key = GeminiBackend::developer_from_settings(&Settings::default());
        assert!(matches!(missing_key, Err(GenerationError::Configuration(ref m)) if m.contains("GEMINI_API_KEY")));
    }
}
