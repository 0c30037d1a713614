//! Configuration for dialogue sessions
//!
//! All process configuration is carried by an explicit [`DialogueConfig`]
//! that is validated once and then handed to the constructors that need it.
//! It can be read from the environment or from a YAML/JSON file with
//! `${VAR}` placeholders.

mod env;
mod error;
mod secrets;
mod validator;

pub use env::{interpolate_with, process_lookup};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use secrets::SecretString;
pub use validator::ConfigValidator;

use crate::auth::COGNITIVE_SERVICES_SCOPE;
use crate::client::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the endpoint base URL
pub const ENDPOINT_VAR: &str = "AZURE_OPENAI_API_BASE";
/// Environment variable holding the deployment (model) name
pub const DEPLOYMENT_VAR: &str = "AZURE_OPENAI_API_DEPLOY";
/// Optional environment variable holding a pre-acquired bearer token
pub const BEARER_TOKEN_VAR: &str = "AZURE_OPENAI_BEARER_TOKEN";
/// Optional environment variable overriding `max_output_tokens`
pub const MAX_OUTPUT_TOKENS_VAR: &str = "AZURE_OPENAI_MAX_OUTPUT_TOKENS";

/// Default system prompt / instructions for new sessions
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Please limit your responses to 3 sentences.";

/// Where bearer tokens come from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialSource {
    /// Ask the Azure CLI for a token on demand (requires `az login`)
    #[default]
    AzureCli,
    /// Use a fixed, pre-acquired token
    Static { token: SecretString },
}

/// Validated process configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Endpoint base URL, e.g. `https://RESOURCE.openai.azure.com/openai/v1/`
    #[serde(default)]
    pub endpoint: String,

    /// Deployment / model name
    #[serde(default)]
    pub deployment: String,

    /// Output token cap sent with chat-style requests
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Whole-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// TCP/TLS connect timeout
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Token scope requested from the credential provider
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Transport-level retry policy
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Credential source
    #[serde(default)]
    pub credential: CredentialSource,

    /// System prompt for transcript sessions, instructions for chained ones
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_max_output_tokens() -> u32 {
    150
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_scope() -> String {
    COGNITIVE_SERVICES_SCOPE.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl DialogueConfig {
    /// Create a configuration with defaults for everything but the two required parameters
    pub fn new(endpoint: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            deployment: deployment.into(),
            max_output_tokens: default_max_output_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            scope: default_scope(),
            retry: RetryPolicy::default(),
            credential: CredentialSource::default(),
            system_prompt: default_system_prompt(),
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(process_lookup)
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// Both [`ENDPOINT_VAR`] and [`DEPLOYMENT_VAR`] are required; an unset
    /// or empty value is a [`ConfigError::MissingParameter`].
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingParameter {
                    name: name.to_string(),
                })
        };

        let endpoint = required(ENDPOINT_VAR)?;
        let deployment = required(DEPLOYMENT_VAR)?;
        let mut config = Self::new(endpoint, deployment);

        if let Some(token) = lookup(BEARER_TOKEN_VAR).filter(|t| !t.is_empty()) {
            config.credential = CredentialSource::Static {
                token: SecretString::new(token),
            };
        }

        if let Some(raw) = lookup(MAX_OUTPUT_TOKENS_VAR) {
            config.max_output_tokens = raw.trim().parse().map_err(|_| {
                ValidationError::invalid_format(
                    "max_output_tokens",
                    format!("{} must be a positive integer, got '{}'", MAX_OUTPUT_TOKENS_VAR, raw),
                )
            })?;
        }

        config.finish()
    }

    /// Check required parameters, then run the extended validator
    fn finish(self) -> ConfigResult<Self> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingParameter {
                name: "endpoint".to_string(),
            });
        }
        if self.deployment.trim().is_empty() {
            return Err(ConfigError::MissingParameter {
                name: "deployment".to_string(),
            });
        }

        ConfigValidator::new().validate(&self)?;
        Ok(self)
    }

    /// Request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connect timeout as a [`Duration`]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }
}

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<DialogueConfig> {
    load_with(path.as_ref(), FileFormat::Yaml, process_lookup)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<DialogueConfig> {
    load_with(path.as_ref(), FileFormat::Json, process_lookup)
}

/// Load a configuration file, picking the format from its extension
pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<DialogueConfig> {
    let path = path.as_ref();
    load_with(path, FileFormat::of(path), process_lookup)
}

/// Like [`load_from_file`], resolving `${VAR}` placeholders through `lookup`
pub fn load_from_file_with<P, F>(path: P, lookup: F) -> ConfigResult<DialogueConfig>
where
    P: AsRef<Path>,
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    load_with(path, FileFormat::of(path), lookup)
}

fn load_with<F>(path: &Path, format: FileFormat, lookup: F) -> ConfigResult<DialogueConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let content = read_config_file(path)?;

    // Placeholders are resolved before parsing
    let interpolated = interpolate_with(&content, lookup)?;

    let config = match format {
        FileFormat::Yaml => parse_yaml(path, &interpolated)?,
        FileFormat::Json => parse_json(path, &interpolated)?,
    };

    config.finish()
}

fn parse_yaml(path: &Path, content: &str) -> ConfigResult<DialogueConfig> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_string_lossy().to_string(),
        line: e.location().map(|l| l.line()),
        column: e.location().map(|l| l.column()),
        message: e.to_string(),
    })
}

fn parse_json(path: &Path, content: &str) -> ConfigResult<DialogueConfig> {
    serde_json::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_string_lossy().to_string(),
        line: Some(e.line()),
        column: Some(e.column()),
        message: e.to_string(),
    })
}

fn read_config_file(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}
