//! Access-token resolution for Vertex AI.
//!
//! A token comes from `GOOGLE_OAUTH_ACCESS_TOKEN` when set, otherwise from the file named by
//! `GOOGLE_APPLICATION_CREDENTIALS`. That file may hold:
//!
//! - a bare access token,
//! - a JSON object with an `access_token` (or `token`) field,
//! - a service-account key, exchanged for an access token through the OAuth JWT-bearer grant
//!   on first use and refreshed shortly before it expires.

use crate::settings::Settings;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use buildwise_abstraction::GenerationError;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// OAuth scope requested for Vertex AI calls.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Token endpoint used when a key file does not name one.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for a signed assertion (the maximum Google accepts).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Cached tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Where Vertex AI bearer tokens come from.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// A ready-made OAuth access token.
    AccessToken(String),
    /// A service-account key exchanged for short-lived tokens.
    ServiceAccount(ServiceAccountKey),
}

/// A parsed service-account key.
#[derive(Clone)]
pub struct ServiceAccountKey {
    /// Service-account e-mail, the assertion issuer.
    pub client_email: String,
    /// Key ID, sent as the assertion `kid` when present.
    pub private_key_id: Option<String>,
    /// OAuth token endpoint.
    pub token_uri: String,
    signing_key: SigningKey<Sha256>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// Service-account key file as written by the Cloud console.
#[derive(Deserialize)]
struct ServiceAccountFile {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Serialize)]
struct AssertionHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'static str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    /// Parses a service-account key from its JSON object.
    ///
    /// # Errors
    /// Returns `GenerationError::Configuration` if a field is missing or the private key is
    /// not an RSA key in PEM form.
    pub fn from_json(json: Map<String, Value>) -> Result<Self, GenerationError> {
        let file: ServiceAccountFile = serde_json::from_value(Value::Object(json)).map_err(|e| {
            GenerationError::Configuration(format!("Invalid service-account key: {e}"))
        })?;

        let private_key = RsaPrivateKey::from_pkcs8_pem(&file.private_key)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&file.private_key))
            .map_err(|e| {
                GenerationError::Configuration(format!(
                    "Service-account private key for {} is not a PEM RSA key: {e}",
                    file.client_email
                ))
            })?;

        Ok(Self {
            client_email: file.client_email,
            private_key_id: file.private_key_id,
            token_uri: file.token_uri.unwrap_or_else(|| GOOGLE_TOKEN_URI.to_string()),
            signing_key: SigningKey::new(private_key),
        })
    }

    /// Builds the RS256-signed JWT assertion for the token exchange.
    ///
    /// # Errors
    /// Returns `GenerationError::Serialization` if the header or claims cannot be encoded.
    pub fn signed_assertion(&self, issued_at: i64) -> Result<String, GenerationError> {
        let header = AssertionHeader { alg: "RS256", typ: "JWT", kid: self.private_key_id.as_deref() };
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);
        let signature = self.signing_key.sign(signing_input.as_bytes());

        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature.to_bytes())))
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, GenerationError> {
    let json = serde_json::to_vec(value).map_err(|e| {
        GenerationError::Serialization(format!("Failed to encode assertion: {e}"))
    })?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Resolves the credentials used for Vertex AI calls.
///
/// # Errors
/// Returns `GenerationError::Configuration` when no usable credentials are configured.
pub fn resolve_credentials(settings: &Settings) -> Result<Credentials, GenerationError> {
    if let Some(token) = settings.google_oauth_access_token.as_deref().map(str::trim) {
        if !token.is_empty() {
            debug!("Using access token from GOOGLE_OAUTH_ACCESS_TOKEN");
            return Ok(Credentials::AccessToken(token.to_string()));
        }
    }

    let path = settings.credentials_path().ok_or_else(|| {
        GenerationError::Configuration(
            "GOOGLE_APPLICATION_CREDENTIALS is not set and no access token was provided"
                .to_string(),
        )
    })?;

    read_credentials_file(path)
}

/// Reads credentials from a file.
///
/// # Errors
/// Returns `GenerationError::Configuration` if the file is unreadable, is malformed JSON, or
/// holds neither a token nor a service-account key.
pub fn read_credentials_file(path: &Path) -> Result<Credentials, GenerationError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        GenerationError::Configuration(format!(
            "Failed to read credentials file {}: {e}",
            path.display()
        ))
    })?;

    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::Configuration(format!(
            "Credentials file {} is empty",
            path.display()
        )));
    }

    if !trimmed.starts_with('{') {
        debug!(path = %path.display(), "Using raw access token from credentials file");
        return Ok(Credentials::AccessToken(trimmed.to_string()));
    }

    let Ok(Value::Object(json)) = serde_json::from_str::<Value>(trimmed) else {
        return Err(GenerationError::Configuration(format!(
            "Credentials file {} is not a valid JSON object",
            path.display()
        )));
    };

    if json.contains_key("private_key") {
        let key = ServiceAccountKey::from_json(json)?;
        debug!(path = %path.display(), client_email = %key.client_email, "Using service-account key");
        return Ok(Credentials::ServiceAccount(key));
    }

    ["access_token", "token"]
        .iter()
        .find_map(|key| json.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| Credentials::AccessToken(token.to_string()))
        .ok_or_else(|| {
            GenerationError::Configuration(format!(
                "Credentials file {} has no access_token field",
                path.display()
            ))
        })
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

const fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Hands out bearer tokens, exchanging and caching service-account tokens as needed.
pub struct TokenProvider {
    credentials: Credentials,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider").field("credentials", &self.credentials).finish_non_exhaustive()
    }
}

impl TokenProvider {
    /// Creates a provider whose token exchanges are bounded by `timeout`.
    ///
    /// # Errors
    /// Returns `GenerationError::Configuration` if the HTTP client cannot be built.
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            GenerationError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self { credentials, client, cached: Mutex::new(None) })
    }

    /// Returns a bearer token valid for at least the refresh margin.
    ///
    /// # Errors
    /// Returns `Request`, `Api` or `Serialization` errors when a service-account exchange fails.
    pub async fn access_token(&self) -> Result<String, GenerationError> {
        let key = match &self.credentials {
            Credentials::AccessToken(token) => return Ok(token.clone()),
            Credentials::ServiceAccount(key) => key,
        };

        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - TimeDelta::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.exchange(key, now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn exchange(
        &self,
        key: &ServiceAccountKey,
        now: DateTime<Utc>,
    ) -> Result<CachedToken, GenerationError> {
        let assertion = key.signed_assertion(now.timestamp())?;
        debug!(client_email = %key.client_email, token_uri = %key.token_uri, "Exchanging service-account assertion");

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reach the OAuth token endpoint");
                GenerationError::Request(format!("Token exchange failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %body, "OAuth token endpoint rejected the assertion");
            return Err(GenerationError::Api { status: status.as_u16(), body });
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            GenerationError::Serialization(format!("Failed to parse token response: {e}"))
        })?;
        info!(client_email = %key.client_email, expires_in = token.expires_in, "Obtained service-account access token");

        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + TimeDelta::seconds(token.expires_in),
        })
    }
}
