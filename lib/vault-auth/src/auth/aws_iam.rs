use super::{normalize_mount, require};
use crate::VaultError;
use crate::aws::{
    CloudAuthContext, CredentialResolver, CredentialSource, SdkCredentialResolver, build_proof,
};
use crate::client::{LoginRequest, VaultAuthApi};
use crate::namespace::Namespace;
use std::sync::Arc;

pub const DEFAULT_AWS_MOUNT: &str = "aws";

/// AWS IAM authentication via a signed `sts:GetCallerIdentity` request.
pub struct AwsIamAuth {
    mount: String,
    role: String,
    context: CloudAuthContext,
    resolver: Arc<dyn CredentialResolver>,
}

impl AwsIamAuth {
    pub fn new(role: impl Into<String>, context: CloudAuthContext) -> Self {
        Self {
            mount: DEFAULT_AWS_MOUNT.to_string(),
            role: role.into(),
            context,
            resolver: Arc::new(SdkCredentialResolver::new()),
        }
    }

    pub fn with_mount(mut self, mount: &str) -> Self {
        self.mount = normalize_mount(mount, DEFAULT_AWS_MOUNT);
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn context(&self) -> &CloudAuthContext {
        &self.context
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        require(&self.role, "role")?;
        match &self.context.credentials {
            CredentialSource::Static(credentials) => {
                require(credentials.access_key_id(), "access_key_id")?;
                require(credentials.secret_access_key(), "secret_access_key")
            }
            CredentialSource::AssumeRole { role_arn } => require(role_arn, "role_arn"),
            CredentialSource::Ambient => Ok(()),
        }
    }

    pub(crate) async fn login(
        &self,
        client: &dyn VaultAuthApi,
        namespace: &Namespace,
    ) -> Result<String, VaultError> {
        let proof = build_proof(&self.context, self.resolver.as_ref(), chrono::Utc::now()).await?;
        let request = LoginRequest::AwsIam {
            role: &self.role,
            proof: &proof,
        };
        let login = client.login(&self.mount, request, namespace).await?;
        tracing::debug!(
            mount = %self.mount,
            role = %self.role,
            advertised_ttl_secs = login.lease_duration.as_secs(),
            "AWS IAM login succeeded"
        );
        Ok(login.token)
    }
}
