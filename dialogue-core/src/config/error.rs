//! Errors raised while assembling a [`DialogueConfig`](super::DialogueConfig)

use thiserror::Error;

/// A configuration problem, detected before any network call is made
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse '{path}' (line {}, column {}): {message}",
            .line.unwrap_or(0), .column.unwrap_or(0))]
    Parse {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Environment variable '{var}' referenced by the config is not set")]
    EnvVarNotFound { var: String },

    /// One of the two required parameters (endpoint or deployment) is absent
    #[error("Required parameter '{name}' is not set")]
    MissingParameter { name: String },
}

/// A field holds a value the client cannot work with
#[derive(Debug, Error)]
#[error("Invalid '{field_path}': {kind}{}", context_suffix(.context))]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `retry.jitter_factor`
    pub field_path: String,
    pub kind: ValidationErrorKind,
    pub context: Option<String>,
}

#[derive(Debug, Error)]
pub enum ValidationErrorKind {
    #[error("value is required")]
    RequiredFieldMissing,

    #[error("expected {expected}, got {actual}")]
    InvalidValue { expected: String, actual: String },

    #[error("{0}")]
    OutOfRange(String),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("not a usable URL: {0}")]
    InvalidUrl(String),
}

impl ValidationError {
    pub fn new(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn required(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::RequiredFieldMissing)
    }

    pub fn invalid_value(
        field_path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let kind = ValidationErrorKind::InvalidValue {
            expected: expected.into(),
            actual: actual.into(),
        };
        Self::new(field_path, kind)
    }

    pub fn out_of_range(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::OutOfRange(message.into()))
    }

    pub fn invalid_format(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::InvalidFormat(message.into()))
    }

    pub fn invalid_url(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::InvalidUrl(message.into()))
    }
}

fn context_suffix(context: &Option<String>) -> String {
    context
        .as_ref()
        .map(|c| format!(" ({})", c))
        .unwrap_or_default()
}

pub type ConfigResult<T> = Result<T, ConfigError>;
