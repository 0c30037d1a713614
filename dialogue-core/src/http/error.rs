//! HTTP error mapping utilities

use crate::client::ProviderError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Map HTTP status code and response body to a ProviderError
pub fn map_http_error(
    status: StatusCode,
    headers: Option<&HeaderMap>,
    body: Option<String>,
    request_id: Uuid,
) -> ProviderError {
    // Try to parse error details from response body
    let error_details = body
        .as_ref()
        .and_then(|b| serde_json::from_str::<Value>(b).ok())
        .and_then(|v| extract_error_details(&v));

    let error_message = error_details
        .as_ref()
        .map(|d| d.message.clone())
        .or_else(|| body.clone().filter(|b| !b.trim().is_empty()))
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

    let message_with_id = format!("{} [request_id: {}]", error_message, request_id);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized {
            message: message_with_id,
        },

        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = headers
                .and_then(|h| h.get(RETRY_AFTER))
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after)
                .or_else(|| {
                    error_details
                        .and_then(|d| d.retry_after_seconds)
                        .map(Duration::from_secs)
                });

            ProviderError::RateLimit {
                retry_after,
                message: message_with_id,
            }
        }

        StatusCode::BAD_REQUEST => ProviderError::InvalidRequest {
            message: message_with_id,
        },

        StatusCode::NOT_FOUND => ProviderError::ModelNotAvailable {
            model: extract_model_from_error(&error_message),
            message: message_with_id,
        },

        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::Timeout {
            message: message_with_id,
        },

        status if status.is_server_error() => ProviderError::ServerError {
            status_code: status.as_u16(),
            message: message_with_id,
        },

        status if status.is_client_error() => ProviderError::InvalidRequest {
            message: message_with_id,
        },

        _ => ProviderError::Custom {
            code: format!("HTTP_{}", status.as_u16()),
            message: message_with_id,
        },
    }
}

/// Error details extracted from response body
struct ErrorDetails {
    message: String,
    retry_after_seconds: Option<u64>,
}

/// Extract error details from JSON response
fn extract_error_details(json: &Value) -> Option<ErrorDetails> {
    // { "error": { "message": "...", "type": "...", "code": "..." } }
    if let Some(error) = json.get("error") {
        if let Some(message) = error.get("message").and_then(|v| v.as_str()) {
            return Some(ErrorDetails {
                message: message.to_string(),
                retry_after_seconds: error.get("retry_after").and_then(|v| v.as_u64()),
            });
        }
    }

    // { "message": "...", "error": "..." }
    if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
        return Some(ErrorDetails {
            message: message.to_string(),
            retry_after_seconds: json.get("retry_after").and_then(|v| v.as_u64()),
        });
    }

    if let Some(error) = json.get("error").and_then(|v| v.as_str()) {
        return Some(ErrorDetails {
            message: error.to_string(),
            retry_after_seconds: None,
        });
    }

    None
}

/// Try to extract model name from error message
fn extract_model_from_error(message: &str) -> Option<String> {
    for quote in ['\'', '"'] {
        let marker = format!("model {}", quote);
        if let Some(start) = message.find(&marker) {
            let start = start + marker.len();
            if let Some(end) = message[start..].find(quote) {
                return Some(message[start..start + end].to_string());
            }
        }
    }

    None
}

/// Parse Retry-After header value (seconds form only)
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    header_value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_unauthorized_maps_to_unauthorized() {
        let body =
            r#"{"error":{"code":"401","message":"Access denied due to invalid subscription key"}}"#;
        let err = map_http_error(StatusCode::UNAUTHORIZED, None, Some(body.into()), Uuid::nil());

        match err {
            ProviderError::Unauthorized { message } => {
                assert!(message.starts_with("Access denied"));
                assert!(message.contains("[request_id: 00000000-0000-0000-0000-000000000000]"));
            }
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_limit_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        let body = r#"{"error":{"message":"slow down","retry_after":30}}"#;

        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            Some(&headers),
            Some(body.into()),
            Uuid::nil(),
        );
        assert_eq!(err.retry_delay(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_rate_limit_keeps_server_message() {
        let body = serde_json::json!({
            "error": {
                "code": "429",
                "message": "Requests to the ChatCompletions_Create Operation have exceeded \
                            token rate limit of your current tier."
            }
        });
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            None,
            Some(body.to_string()),
            Uuid::nil(),
        );

        match &err {
            ProviderError::RateLimit { message, .. } => {
                assert!(message.contains("exceeded token rate limit"));
                assert!(message.ends_with("[request_id: 00000000-0000-0000-0000-000000000000]"));
            }
            other => panic!("expected RateLimit, got {:?}", other),
        }
        assert!(err.to_string().contains("exceeded token rate limit"));
    }

    #[test]
    fn test_rate_limit_falls_back_to_body() {
        let body = r#"{"error":{"message":"slow down","retry_after":30}}"#;
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            None,
            Some(body.into()),
            Uuid::nil(),
        );
        assert_eq!(err.retry_delay(), Some(Duration::from_secs(30)));
        assert!(err.to_string().contains("slow down"));
    }

    #[test]
    fn test_not_found_extracts_model() {
        let body = r#"{"error":{"message":"The model 'gpt-5-mini' does not exist"}}"#;
        let err = map_http_error(StatusCode::NOT_FOUND, None, Some(body.into()), Uuid::nil());
        match err {
            ProviderError::ModelNotAvailable { model, message } => {
                assert_eq!(model.as_deref(), Some("gpt-5-mini"));
                assert!(message.starts_with("The model 'gpt-5-mini' does not exist"));
            }
            other => panic!("expected ModelNotAvailable, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_without_model_keeps_server_message() {
        let body = serde_json::json!({
            "error": {
                "code": "DeploymentNotFound",
                "message": "The API deployment for this resource does not exist."
            }
        });
        let err = map_http_error(StatusCode::NOT_FOUND, None, Some(body.to_string()), Uuid::nil());

        assert!(matches!(&err, ProviderError::ModelNotAvailable { model: None, .. }));
        let rendered = err.to_string();
        assert!(rendered.starts_with("Model not available: The API deployment"));
        assert!(!rendered.contains("unknown"));
    }

    #[test]
    fn test_server_error_keeps_raw_body() {
        let err = map_http_error(
            StatusCode::BAD_GATEWAY,
            None,
            Some("upstream exploded".into()),
            Uuid::nil(),
        );
        match err {
            ProviderError::ServerError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 502);
                assert!(message.starts_with("upstream exploded"));
            }
            other => panic!("expected ServerError, got {:?}", other),
        }
    }

    #[test]
    fn test_gateway_timeout_is_timeout() {
        let err = map_http_error(
            StatusCode::GATEWAY_TIMEOUT,
            None,
            Some("upstream timed out".into()),
            Uuid::nil(),
        );
        match err {
            ProviderError::Timeout { message } => {
                assert!(message.starts_with("upstream timed out"))
            }
            other => panic!("expected Timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("12"), Some(Duration::from_secs(12)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2026 07:28:00 GMT"), None);
    }
}
