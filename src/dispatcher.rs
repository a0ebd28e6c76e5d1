use crate::config::{CredentialConfig, CredentialKind};
use crate::error::ConfigError;
use std::sync::Arc;
use std::time::Duration;
use vault_auth::aws::{
    CloudAuthContext, CloudCredentials, CredentialResolver, CredentialSource, SdkCredentialResolver,
};
use vault_auth::{
    AppRoleAuth, AuthError, AuthMethod, AuthMethodKind, AuthStrategy, AwsIamAuth, GithubAuth,
    KubernetesAuth, Namespace, StaticTokenAuth, TokenManager, TokenManagerConfig, UserPassAuth,
    VaultAuthApi,
};

/// Turns host supplied [`CredentialConfig`]s into strategies and token managers
/// sharing one Vault client.
pub struct AuthenticationDispatcher {
    client: Arc<dyn VaultAuthApi>,
    resolver: Option<Arc<dyn CredentialResolver>>,
}

impl AuthenticationDispatcher {
    pub fn new(client: Arc<dyn VaultAuthApi>) -> Self {
        Self {
            client,
            resolver: None,
        }
    }

    /// Replaces the AWS SDK credential chain used by `aws_iam` credentials.
    pub fn with_credential_resolver(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Bounds the AWS SDK calls made for `aws_iam` credentials, usually with
    /// the Vault client's own timeout.
    pub fn with_cloud_timeout(self, timeout: Duration) -> Self {
        self.with_credential_resolver(Arc::new(SdkCredentialResolver::new().with_timeout(timeout)))
    }

    /// Builds and validates the strategy for `config`. No request is made.
    pub fn strategy(&self, config: &CredentialConfig) -> Result<AuthStrategy, ConfigError> {
        let namespace = Namespace::from_override(config.namespace.as_deref());
        let strategy = AuthStrategy::new(self.method(config)?).with_namespace(namespace);
        strategy.validate()?;

        tracing::debug!(
            method = %strategy.kind(),
            namespace = ?strategy.namespace(),
            "Credential strategy configured"
        );
        Ok(strategy)
    }

    pub fn token_manager(&self, config: &CredentialConfig) -> Result<TokenManager, ConfigError> {
        let strategy = self.strategy(config)?;
        let mut manager_config = TokenManagerConfig::default();
        if let Some(margin) = config.safety_margin() {
            manager_config.safety_margin = margin;
        }
        Ok(TokenManager::with_config(
            strategy,
            Arc::clone(&self.client),
            manager_config,
        ))
    }

    fn method(&self, config: &CredentialConfig) -> Result<AuthMethod, ConfigError> {
        let mount = config.mount.as_deref();
        let method: AuthMethod = match &config.kind {
            CredentialKind::Token { token } => StaticTokenAuth::new(token.as_str()).into(),
            CredentialKind::TokenFile { path } => StaticTokenAuth::from_file(path.clone()).into(),
            CredentialKind::AppRole { role_id, secret_id } => {
                let auth = AppRoleAuth::new(role_id.as_str(), secret_id.as_str());
                with_mount(auth, mount, AppRoleAuth::with_mount).into()
            }
            CredentialKind::UserPass { username, password } => {
                let auth = UserPassAuth::new(username.as_str(), password.as_str());
                with_mount(auth, mount, UserPassAuth::with_mount).into()
            }
            CredentialKind::Kubernetes { role, jwt_path } => {
                let mut auth = KubernetesAuth::new(role.as_str());
                if let Some(path) = jwt_path {
                    auth = auth.with_jwt_path(path.clone());
                }
                with_mount(auth, mount, KubernetesAuth::with_mount).into()
            }
            CredentialKind::Github { token } => {
                let auth = GithubAuth::new(token.as_str());
                with_mount(auth, mount, GithubAuth::with_mount).into()
            }
            CredentialKind::AwsIam {
                role,
                server_id,
                access_key_id,
                secret_access_key,
                session_token,
                assume_role_arn,
            } => {
                let source = credential_source(
                    access_key_id.as_deref(),
                    secret_access_key.as_deref(),
                    session_token.as_deref(),
                    assume_role_arn.as_deref(),
                )?;
                let mut context = CloudAuthContext::new(source);
                if let Some(server_id) = server_id {
                    context = context.with_server_id(server_id.as_str());
                }
                let mut auth = AwsIamAuth::new(role.as_str(), context);
                if let Some(resolver) = &self.resolver {
                    auth = auth.with_resolver(Arc::clone(resolver));
                }
                with_mount(auth, mount, AwsIamAuth::with_mount).into()
            }
        };
        Ok(method)
    }
}

fn with_mount<T>(auth: T, mount: Option<&str>, apply: fn(T, &str) -> T) -> T {
    match mount {
        Some(mount) => apply(auth, mount),
        None => auth,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Static keys win over an assumed role, which wins over the ambient chain.
fn credential_source(
    access_key_id: Option<&str>,
    secret_access_key: Option<&str>,
    session_token: Option<&str>,
    assume_role_arn: Option<&str>,
) -> Result<CredentialSource, AuthError> {
    match (non_blank(access_key_id), non_blank(secret_access_key)) {
        (Some(key), Some(secret)) => Ok(CredentialSource::Static(CloudCredentials::new(
            key,
            secret,
            session_token.map(str::to_string),
        ))),
        (None, None) => Ok(match non_blank(assume_role_arn) {
            Some(role_arn) => CredentialSource::AssumeRole {
                role_arn: role_arn.to_string(),
            },
            None => CredentialSource::Ambient,
        }),
        _ => Err(AuthError::Configuration {
            method: AuthMethodKind::AwsIam,
            reason: "access_key_id and secret_access_key must be set together".to_string(),
        }),
    }
}
