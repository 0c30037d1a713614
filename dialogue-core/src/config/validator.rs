//! Configuration validation utilities

use super::error::ValidationError;
use super::DialogueConfig;
use url::Url;

/// Validates a [`DialogueConfig`] before any collaborator is built from it
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration
    pub fn validate(&self, config: &DialogueConfig) -> Result<(), ValidationError> {
        self.validate_endpoint(&config.endpoint)?;

        if config.deployment.trim().is_empty() {
            return Err(ValidationError::required("deployment"));
        }

        if config.max_output_tokens == 0 {
            return Err(ValidationError::out_of_range(
                "max_output_tokens",
                "must be greater than 0",
            ));
        }

        if config.request_timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "request_timeout_secs",
                "must be greater than 0",
            ));
        }

        if config.connect_timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "connect_timeout_secs",
                "must be greater than 0",
            ));
        }

        if config.scope.trim().is_empty() {
            return Err(ValidationError::required("scope"));
        }

        if !(0.0..=1.0).contains(&config.retry.jitter_factor) {
            return Err(ValidationError::out_of_range(
                "retry.jitter_factor",
                format!("must be between 0.0 and 1.0, got {}", config.retry.jitter_factor),
            ));
        }

        if config.retry.exponential_base < 1.0 {
            return Err(ValidationError::out_of_range(
                "retry.exponential_base",
                "must be at least 1.0",
            ));
        }

        if let super::CredentialSource::Static { token } = &config.credential {
            if token.is_empty() {
                return Err(ValidationError::required("credential.token")
                    .with_context("static credentials need a non-empty bearer token"));
            }
        }

        Ok(())
    }

    fn validate_endpoint(&self, endpoint: &str) -> Result<(), ValidationError> {
        if endpoint.trim().is_empty() {
            return Err(ValidationError::required("endpoint"));
        }

        let url = Url::parse(endpoint)
            .map_err(|e| ValidationError::invalid_url("endpoint", e.to_string()))?;

        match url.scheme() {
            "https" | "http" => Ok(()),
            other => Err(ValidationError::invalid_value(
                "endpoint",
                "an http or https URL",
                other,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ValidationErrorKind;
    use crate::config::CredentialSource;

    fn valid_config() -> DialogueConfig {
        DialogueConfig::new("https://example.openai.azure.com/openai/v1/", "gpt-4o-mini")
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(ConfigValidator::new().validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_endpoint_must_be_url() {
        let mut config = valid_config();
        config.endpoint = "not a url".to_string();

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "endpoint");
        assert!(matches!(err.kind, ValidationErrorKind::InvalidUrl(_)));
    }

    #[test]
    fn test_endpoint_scheme_checked() {
        let mut config = valid_config();
        config.endpoint = "ftp://example.com/".to_string();

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::InvalidValue { .. }));
    }

    #[test]
    fn test_blank_deployment_rejected() {
        let mut config = valid_config();
        config.deployment = "   ".to_string();

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "deployment");
        assert!(matches!(err.kind, ValidationErrorKind::RequiredFieldMissing));
    }

    #[test]
    fn test_zero_max_output_tokens_rejected() {
        let mut config = valid_config();
        config.max_output_tokens = 0;

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "max_output_tokens");
    }

    #[test]
    fn test_jitter_out_of_range_rejected() {
        let mut config = valid_config();
        config.retry.jitter_factor = 1.5;

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "retry.jitter_factor");
    }

    #[test]
    fn test_empty_static_token_rejected() {
        let mut config = valid_config();
        config.credential = CredentialSource::Static {
            token: "".into(),
        };

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "credential.token");
        assert!(err.context.is_some());
    }
}
