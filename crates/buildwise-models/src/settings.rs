//! Process settings for the generation backends.
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional TOML file,
//! a `.env` file in the working directory, and the process environment. Keys use the
//! environment variable names (`PROJECT_ID`, `LOCATION`, ...) and are matched
//! case-insensitively; in a TOML file they are written in snake case.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default Vertex AI region.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Default text model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default image model.
pub const DEFAULT_IMAGEN_MODEL: &str = "imagen-3.0-generate-002";

/// Default HTTP timeout for a single generation call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Setting names recognised in the environment and `.env` files.
pub const SETTING_KEYS: &[&str] = &[
    "GOOGLE_APPLICATION_CREDENTIALS",
    "PROJECT_ID",
    "LOCATION",
    "GEMINI_MODEL_NAME",
    "IMAGEN_MODEL_NAME",
    "GEMINI_API_KEY",
    "GOOGLE_OAUTH_ACCESS_TOKEN",
    "API_ENDPOINT",
    "REQUEST_TIMEOUT_SECS",
];

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file does not exist.
    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),

    /// The `.env` file exists but could not be parsed.
    #[error("Failed to read .env file: {0}")]
    DotEnv(String),

    /// A source could not be read or a value has the wrong type.
    #[error("Invalid settings: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Read-only process settings. Every value is optional at load time; a backend that
/// needs a missing value fails to initialise and reports itself unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path to a credentials file holding an OAuth access token.
    pub google_application_credentials: Option<PathBuf>,
    /// Google Cloud project ID (Vertex AI).
    pub project_id: Option<String>,
    /// Vertex AI region.
    pub location: String,
    /// Text model name.
    pub gemini_model_name: String,
    /// Image model name.
    pub imagen_model_name: String,
    /// API key for the Gemini developer API.
    pub gemini_api_key: Option<String>,
    /// OAuth access token; takes precedence over the credentials file.
    pub google_oauth_access_token: Option<String>,
    /// Overrides the service endpoint (scheme and host, no path).
    pub api_endpoint: Option<String>,
    /// Timeout for one HTTP call, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_application_credentials: None,
            project_id: None,
            location: DEFAULT_LOCATION.to_string(),
            gemini_model_name: DEFAULT_GEMINI_MODEL.to_string(),
            imagen_model_name: DEFAULT_IMAGEN_MODEL.to_string(),
            gemini_api_key: None,
            google_oauth_access_token: None,
            api_endpoint: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Loads settings from an optional TOML file, `./.env`, and the process environment.
    ///
    /// A missing `.env` file is not an error. The process environment is never modified.
    #[allow(clippy::disallowed_methods)] // env::vars_os is the environment source
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut env = HashMap::new();

        match dotenvy::dotenv_iter() {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|e| SettingsError::DotEnv(e.to_string()))?;
                    env.insert(key, value);
                }
            }
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => return Err(SettingsError::DotEnv(e.to_string())),
        }

        // Process environment wins over .env.
        env.extend(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }));

        Self::from_sources(file, env)
    }

    /// Builds settings from an optional TOML file and an explicit variable map.
    ///
    /// Variables outside `SETTING_KEYS` are ignored; empty values count as unset.
    pub fn from_sources(file: Option<&Path>, vars: HashMap<String, String>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            if !path.exists() {
                return Err(SettingsError::NotFound(path.to_path_buf()));
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let known: HashMap<String, String> = vars
            .into_iter()
            .filter(|(key, _)| SETTING_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)))
            .map(|(key, value)| (key.to_ascii_lowercase(), value))
            .collect();

        debug!(file = ?file, variables = known.len(), "Loading settings");

        let settings = builder
            .add_source(Environment::default().source(Some(known)).ignore_empty(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Path to the credentials file, if one is configured.
    pub fn credentials_path(&self) -> Option<&Path> {
        self.google_application_credentials.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_sources(None, HashMap::new()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.location, "us-central1");
        assert_eq!(settings.gemini_model_name, "gemini-1.5-flash");
        assert_eq!(settings.imagen_model_name, "imagen-3.0-generate-002");
        assert_eq!(settings.request_timeout_secs, 120);
        assert!(settings.project_id.is_none());
    }

    #[test]
    fn test_environment_values() {
        let settings = Settings::from_sources(
            None,
            vars(&[
                ("PROJECT_ID", "buildwise-dev"),
                ("LOCATION", "europe-west2"),
                ("GOOGLE_APPLICATION_CREDENTIALS", "/tmp/creds.json"),
                ("REQUEST_TIMEOUT_SECS", "30"),
                ("HOME", "/root"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.project_id.as_deref(), Some("buildwise-dev"));
        assert_eq!(settings.location, "europe-west2");
        assert_eq!(settings.credentials_path(), Some(Path::new("/tmp/creds.json")));
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let settings =
            Settings::from_sources(None, vars(&[("PROJECT_ID", ""), ("LOCATION", "")])).unwrap();
        assert!(settings.project_id.is_none());
        assert_eq!(settings.location, DEFAULT_LOCATION);
    }

    #[test]
    fn test_file_then_environment_precedence() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "project_id = \"from-file\"\nlocation = \"asia-east1\"\ngemini_model_name = \"gemini-1.5-pro\""
        )
        .unwrap();

        let settings =
            Settings::from_sources(Some(file.path()), vars(&[("PROJECT_ID", "from-env")])).unwrap();

        assert_eq!(settings.project_id.as_deref(), Some("from-env"));
        assert_eq!(settings.location, "asia-east1");
        assert_eq!(settings.gemini_model_name, "gemini-1.5-pro");
    }

    #[test]
    fn test_missing_file() {
        let result = Settings::from_sources(Some(Path::new("/nonexistent/buildwise.toml")), HashMap::new());
        assert!(matches!(result, Err(SettingsError::NotFound(_))));
    }

    #[test]
    fn test_invalid_timeout() {
        let result = Settings::from_sources(None, vars(&[("REQUEST_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }
}
