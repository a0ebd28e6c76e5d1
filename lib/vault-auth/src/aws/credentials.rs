use crate::VaultError;
use async_trait::async_trait;
use aws_config::sts::AssumeRoleProvider;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_credential_types::provider::ProvideCredentials;
use std::time::Duration;

use super::signer::STS_REGION;

/// Session name used when assuming a role; the credentials sign a single proof.
pub const ASSUME_ROLE_SESSION_NAME: &str = "vault-aws-iam-auth";

/// AWS credentials used to sign one proof. Not cached.
#[derive(Clone)]
pub struct CloudCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl CloudCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl std::fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl From<Credentials> for CloudCredentials {
    fn from(credentials: Credentials) -> Self {
        Self::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            credentials.session_token().map(str::to_string),
        )
    }
}

/// Where the signing credentials come from.
#[derive(Debug, Clone, Default)]
pub enum CredentialSource {
    Static(CloudCredentials),
    /// Ambient credentials exchanged for temporary ones scoped to this role.
    AssumeRole {
        role_arn: String,
    },
    /// The SDK default chain (environment, profile, web identity, IMDS).
    #[default]
    Ambient,
}

/// Access to the cloud SDK's credential sources.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn ambient(&self) -> Result<CloudCredentials, VaultError>;

    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<CloudCredentials, VaultError>;
}

/// Static credentials win, then role assumption, then the ambient chain.
pub async fn resolve_credentials(
    source: &CredentialSource,
    resolver: &dyn CredentialResolver,
) -> Result<CloudCredentials, VaultError> {
    match source {
        CredentialSource::Static(credentials) => Ok(credentials.clone()),
        CredentialSource::AssumeRole { role_arn } => {
            tracing::debug!(%role_arn, "Assuming AWS role for IAM login");
            resolver
                .assume_role(role_arn, ASSUME_ROLE_SESSION_NAME)
                .await
        }
        CredentialSource::Ambient => resolver.ambient().await,
    }
}

/// [`CredentialResolver`] backed by `aws-config`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkCredentialResolver {
    timeout: Option<Duration>,
}

impl SdkCredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect and per-operation timeout for SDK calls such as STS AssumeRole.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn loader(&self) -> ConfigLoader {
        let loader = aws_config::defaults(BehaviorVersion::latest());
        match self.timeout {
            Some(timeout) => loader.timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(timeout)
                    .operation_timeout(timeout)
                    .build(),
            ),
            None => loader,
        }
    }

    async fn sdk_config(&self) -> SdkConfig {
        self.loader().load().await
    }
}

#[async_trait]
impl CredentialResolver for SdkCredentialResolver {
    async fn ambient(&self) -> Result<CloudCredentials, VaultError> {
        let config = self.sdk_config().await;
        let provider = config.credentials_provider().ok_or_else(|| {
            VaultError::CloudCredentials("no credentials provider in AWS config".into())
        })?;

        let credentials = provider
            .provide_credentials()
            .await
            .map_err(|e| VaultError::CloudCredentials(Box::new(e)))?;

        Ok(credentials.into())
    }

    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<CloudCredentials, VaultError> {
        let config = self.sdk_config().await;
        let region = config
            .region()
            .cloned()
            .unwrap_or_else(|| Region::new(STS_REGION));

        let provider = AssumeRoleProvider::builder(role_arn)
            .session_name(session_name)
            .configure(&config)
            .region(region)
            .build()
            .await;

        let credentials = provider
            .provide_credentials()
            .await
            .map_err(|e| VaultError::CloudCredentials(Box::new(e)))?;

        Ok(credentials.into())
    }
}
