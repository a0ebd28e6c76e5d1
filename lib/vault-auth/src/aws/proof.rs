use super::credentials::{CredentialResolver, CredentialSource, resolve_credentials};
use super::signer::{SignedRequestParts, sign_get_caller_identity};
use crate::VaultError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

/// Cloud side parameters of an IAM login.
#[derive(Debug, Clone, Default)]
pub struct CloudAuthContext {
    pub credentials: CredentialSource,
    /// Sent as `X-Vault-AWS-IAM-Server-ID` when not blank.
    pub server_id: Option<String>,
}

impl CloudAuthContext {
    pub fn new(credentials: CredentialSource) -> Self {
        Self {
            credentials,
            server_id: None,
        }
    }

    pub fn with_server_id(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = Some(server_id.into());
        self
    }
}

/// Base64 encoded signed request, in the shape Vault's `aws` login expects.
#[derive(Clone)]
pub struct IamLoginProof {
    pub method: String,
    pub request_url: String,
    pub request_body: String,
    pub request_headers: String,
}

impl std::fmt::Debug for IamLoginProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IamLoginProof")
            .field("method", &self.method)
            .field("request_url", &self.request_url)
            .field("request_body", &self.request_body)
            .field("request_headers", &"[REDACTED]")
            .finish()
    }
}

impl IamLoginProof {
    /// Encodes URL, body and the headers JSON independently.
    pub fn encode(parts: &SignedRequestParts) -> Result<Self, VaultError> {
        let headers = serde_json::to_vec(&parts.headers)?;
        Ok(Self {
            method: parts.method.clone(),
            request_url: STANDARD.encode(parts.url.as_bytes()),
            request_body: STANDARD.encode(&parts.body),
            request_headers: STANDARD.encode(headers),
        })
    }
}

/// Resolves credentials, signs `GetCallerIdentity` at `time` and encodes it.
pub async fn build_proof(
    context: &CloudAuthContext,
    resolver: &dyn CredentialResolver,
    time: DateTime<Utc>,
) -> Result<IamLoginProof, VaultError> {
    let credentials = resolve_credentials(&context.credentials, resolver).await?;
    let parts = sign_get_caller_identity(&credentials, context.server_id.as_deref(), time)?;
    IamLoginProof::encode(&parts)
}
