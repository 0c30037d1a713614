//! Token acquisition through the Azure CLI

use super::{AccessToken, AuthError, CredentialProvider, AZ_LOGIN_HINT};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Display;
use std::io::ErrorKind;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::process::Command;
use tracing::{debug, warn};

const DEFAULT_PROGRAM: &str = "az";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs `az account get-access-token` for each token request
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    program: String,
    timeout: Duration,
}

/// The subset of `az account get-access-token --output json` we read
#[derive(Debug, Deserialize)]
struct CliTokenOutput {
    #[serde(rename = "accessToken")]
    access_token: String,

    /// Expiry as a POSIX timestamp; only present in newer CLI releases
    #[serde(default)]
    expires_on: Option<u64>,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different executable (e.g. `az.cmd` or an absolute path)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Bound how long a single CLI invocation may take
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the JSON printed by `az account get-access-token`
pub(crate) fn parse_cli_output(stdout: &str) -> Result<AccessToken, AuthError> {
    let output: CliTokenOutput = serde_json::from_str(stdout.trim())
        .map_err(|e| AuthError::new(format!("unexpected Azure CLI output: {}", e)))?;

    if output.access_token.is_empty() {
        return Err(AuthError::new("Azure CLI returned an empty access token")
            .with_hint(AZ_LOGIN_HINT));
    }

    let token = AccessToken::new(output.access_token);
    Ok(match output.expires_on {
        Some(secs) => token.with_expiry(UNIX_EPOCH + Duration::from_secs(secs)),
        None => token,
    })
}

/// Build the error for a CLI run that exited unsuccessfully
///
/// The login hint is attached only when the CLI itself asks for `az login`.
pub(crate) fn exit_failure(program: &str, status: impl Display, stderr: &str) -> AuthError {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        return AuthError::new(format!("'{}' exited with {}", program, status));
    }

    let error = AuthError::new(stderr);
    if stderr.to_ascii_lowercase().contains("az login") {
        error.with_hint(AZ_LOGIN_HINT)
    } else {
        error
    }
}

#[async_trait]
impl CredentialProvider for AzureCliCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        debug!("Requesting token for scope {} from {}", scope, self.program);

        let mut command = Command::new(&self.program);
        command
            .args(["account", "get-access-token", "--scope", scope, "--output", "json"])
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(AuthError::new(format!(
                    "Azure CLI executable '{}' was not found",
                    self.program
                ))
                .with_hint("Install the Azure CLI, then run `az login`"));
            }
            Ok(Err(e)) => {
                return Err(AuthError::new(format!("failed to run '{}': {}", self.program, e)));
            }
            Err(_) => {
                return Err(AuthError::new(format!(
                    "Azure CLI did not return a token within {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            warn!("Azure CLI token request failed with {}", output.status);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(exit_failure(&self.program, output.status, &stderr));
        }

        let token = parse_cli_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            "Acquired token {} (expires in {:?})",
            token.token.partial_redact(),
            token
                .expires_at
                .and_then(|at| at.duration_since(SystemTime::now()).ok())
        );
        Ok(token)
    }
}
