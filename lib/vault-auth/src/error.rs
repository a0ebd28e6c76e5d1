use crate::auth::AuthMethodKind;
use std::path::PathBuf;
use thiserror::Error;

/// Transport and protocol level failures talking to Vault or AWS.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Vault not detected: VAULT_ADDR not set")]
    VaultNotDetected,

    #[error("Invalid Vault address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Vault client error ({status}): {message}")]
    ClientError { status: u16, message: String },

    #[error("Vault request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid Vault response: {0}")]
    InvalidResponse(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("AWS credentials unavailable: {0}")]
    CloudCredentials(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to obtain a token with a particular login method.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid {method} configuration: {reason}")]
    Configuration {
        method: AuthMethodKind,
        reason: String,
    },

    #[error("{method} authentication failed: {source}")]
    Failed {
        method: AuthMethodKind,
        #[source]
        source: VaultError,
    },
}

impl AuthError {
    pub fn method(&self) -> AuthMethodKind {
        match self {
            Self::Configuration { method, .. } | Self::Failed { method, .. } => *method,
        }
    }

    /// Required parameters were missing; no request was made.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Vault answered and refused the credential.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::Failed {
                source: VaultError::ClientError { .. },
                ..
            }
        )
    }

    /// Network, TLS or timeout failure, including the AWS credential exchange.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Failed {
                source: VaultError::RequestError(_) | VaultError::CloudCredentials(_),
                ..
            }
        )
    }
}
