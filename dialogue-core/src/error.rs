//! Errors surfaced by a single dialogue turn

use crate::auth::AuthError;
use crate::client::{ProviderError, ResponseShapeError};
use thiserror::Error;

/// Why one `ask` failed
#[derive(Debug, Clone, Error)]
pub enum TurnError {
    /// The credential provider could not produce a token
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The model call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The model call succeeded but the answer could not be found
    #[error(transparent)]
    ResponseShape(#[from] ResponseShapeError),
}

impl TurnError {
    /// Short name of the error class, for logs
    pub fn class(&self) -> &'static str {
        match self {
            TurnError::Auth(_) => "auth",
            TurnError::Provider(_) => "provider",
            TurnError::ResponseShape(_) => "response_shape",
        }
    }

    /// Remediation text to show the user, if there is one
    pub fn hint(&self) -> Option<&str> {
        match self {
            TurnError::Auth(err) => err.hint.as_deref(),
            _ => None,
        }
    }
}
