mod approle;
mod aws_iam;
mod github;
mod kubernetes;
mod manager;
mod token;
mod token_info;
mod userpass;

pub use approle::AppRoleAuth;
pub use aws_iam::AwsIamAuth;
pub use github::GithubAuth;
pub use kubernetes::KubernetesAuth;
pub use manager::{DEFAULT_SAFETY_MARGIN, TokenManager, TokenManagerConfig};
pub use token::{StaticTokenAuth, TokenSource};
pub use token_info::IssuedToken;
pub use userpass::UserPassAuth;

use crate::client::VaultAuthApi;
use crate::error::AuthError;
use crate::namespace::Namespace;
use std::fmt;

/// Which login protocol a strategy speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMethodKind {
    Token,
    AppRole,
    UserPass,
    Kubernetes,
    Github,
    AwsIam,
}

impl fmt::Display for AuthMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Token => "token",
            Self::AppRole => "approle",
            Self::UserPass => "userpass",
            Self::Kubernetes => "kubernetes",
            Self::Github => "github",
            Self::AwsIam => "aws-iam",
        };
        f.write_str(name)
    }
}

/// One configured login method.
pub enum AuthMethod {
    Token(StaticTokenAuth),
    AppRole(AppRoleAuth),
    UserPass(UserPassAuth),
    Kubernetes(KubernetesAuth),
    Github(GithubAuth),
    AwsIam(AwsIamAuth),
}

impl AuthMethod {
    pub fn kind(&self) -> AuthMethodKind {
        match self {
            Self::Token(_) => AuthMethodKind::Token,
            Self::AppRole(_) => AuthMethodKind::AppRole,
            Self::UserPass(_) => AuthMethodKind::UserPass,
            Self::Kubernetes(_) => AuthMethodKind::Kubernetes,
            Self::Github(_) => AuthMethodKind::Github,
            Self::AwsIam(_) => AuthMethodKind::AwsIam,
        }
    }

    /// Checks required parameters without touching the network.
    pub fn validate(&self) -> Result<(), AuthError> {
        let result = match self {
            Self::Token(auth) => auth.validate(),
            Self::AppRole(auth) => auth.validate(),
            Self::UserPass(auth) => auth.validate(),
            Self::Kubernetes(auth) => auth.validate(),
            Self::Github(auth) => auth.validate(),
            Self::AwsIam(auth) => auth.validate(),
        };
        result.map_err(|reason| AuthError::Configuration {
            method: self.kind(),
            reason,
        })
    }

    /// Static tokens carry no lease the cache could track.
    pub fn tracks_expiry(&self) -> bool {
        !matches!(self, Self::Token(_))
    }
}

impl From<StaticTokenAuth> for AuthMethod {
    fn from(auth: StaticTokenAuth) -> Self {
        Self::Token(auth)
    }
}

impl From<AppRoleAuth> for AuthMethod {
    fn from(auth: AppRoleAuth) -> Self {
        Self::AppRole(auth)
    }
}

impl From<UserPassAuth> for AuthMethod {
    fn from(auth: UserPassAuth) -> Self {
        Self::UserPass(auth)
    }
}

impl From<KubernetesAuth> for AuthMethod {
    fn from(auth: KubernetesAuth) -> Self {
        Self::Kubernetes(auth)
    }
}

impl From<GithubAuth> for AuthMethod {
    fn from(auth: GithubAuth) -> Self {
        Self::Github(auth)
    }
}

impl From<AwsIamAuth> for AuthMethod {
    fn from(auth: AwsIamAuth) -> Self {
        Self::AwsIam(auth)
    }
}

/// A login method bound to the namespace its calls are scoped to.
pub struct AuthStrategy {
    method: AuthMethod,
    namespace: Namespace,
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthStrategy")
            .field("method", &self.kind())
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl AuthStrategy {
    pub fn new(method: impl Into<AuthMethod>) -> Self {
        Self {
            method: method.into(),
            namespace: Namespace::Ambient,
        }
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn kind(&self) -> AuthMethodKind {
        self.method.kind()
    }

    pub fn method(&self) -> &AuthMethod {
        &self.method
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        self.method.validate()
    }

    pub fn tracks_expiry(&self) -> bool {
        self.method.tracks_expiry()
    }

    /// Obtain a fresh token. Never retries.
    pub async fn authenticate(&self, client: &dyn VaultAuthApi) -> Result<String, AuthError> {
        self.validate()?;

        let namespace = &self.namespace;
        let result = match &self.method {
            AuthMethod::Token(auth) => auth.token().await,
            AuthMethod::AppRole(auth) => auth.login(client, namespace).await,
            AuthMethod::UserPass(auth) => auth.login(client, namespace).await,
            AuthMethod::Kubernetes(auth) => auth.login(client, namespace).await,
            AuthMethod::Github(auth) => auth.login(client, namespace).await,
            AuthMethod::AwsIam(auth) => auth.login(client, namespace).await,
        };

        result.map_err(|source| AuthError::Failed {
            method: self.kind(),
            source,
        })
    }
}

/// Trimmed mount path, or `default` when blank.
pub(crate) fn normalize_mount(mount: &str, default: &str) -> String {
    let trimmed = mount.trim().trim_matches('/');
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn require(value: &str, name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is blank", name))
    } else {
        Ok(())
    }
}
