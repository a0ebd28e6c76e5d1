use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vault_auth::AuthMethodKind;

/// Credential parameters per login method, selected by the `"type"` field.
///
/// Required string parameters default to empty so that a missing value is
/// reported as a configuration error naming the method, not as a parse error.
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialKind {
    Token {
        #[serde(default)]
        token: String,
    },
    TokenFile {
        path: PathBuf,
    },
    AppRole {
        #[serde(default)]
        role_id: String,
        #[serde(default)]
        secret_id: String,
    },
    UserPass {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
    Kubernetes {
        #[serde(default)]
        role: String,
        #[serde(default)]
        jwt_path: Option<PathBuf>,
    },
    Github {
        #[serde(default)]
        token: String,
    },
    AwsIam {
        #[serde(default)]
        role: String,
        #[serde(default)]
        server_id: Option<String>,
        #[serde(default)]
        access_key_id: Option<String>,
        #[serde(default)]
        secret_access_key: Option<String>,
        #[serde(default)]
        session_token: Option<String>,
        #[serde(default)]
        assume_role_arn: Option<String>,
    },
}

impl CredentialKind {
    pub fn method(&self) -> AuthMethodKind {
        match self {
            Self::Token { .. } | Self::TokenFile { .. } => AuthMethodKind::Token,
            Self::AppRole { .. } => AuthMethodKind::AppRole,
            Self::UserPass { .. } => AuthMethodKind::UserPass,
            Self::Kubernetes { .. } => AuthMethodKind::Kubernetes,
            Self::Github { .. } => AuthMethodKind::Github,
            Self::AwsIam { .. } => AuthMethodKind::AwsIam,
        }
    }
}

/// One credential as supplied by the host, e.g.
///
/// ```json
/// { "type": "app_role", "role_id": "...", "secret_id": "...", "namespace": "team-a" }
/// ```
#[derive(Clone, Deserialize)]
pub struct CredentialConfig {
    #[serde(flatten)]
    pub kind: CredentialKind,
    /// Auth mount path; the method default when unset.
    #[serde(default)]
    pub mount: Option<String>,
    /// Namespace override: unset keeps the client default, `/` forces root.
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub safety_margin_secs: Option<u64>,
}

impl CredentialConfig {
    pub fn new(kind: CredentialKind) -> Self {
        Self {
            kind,
            mount: None,
            namespace: None,
            safety_margin_secs: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&json)
    }

    pub fn safety_margin(&self) -> Option<Duration> {
        self.safety_margin_secs.map(Duration::from_secs)
    }
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("method", &self.kind.method())
            .field("mount", &self.mount)
            .field("namespace", &self.namespace)
            .field("safety_margin_secs", &self.safety_margin_secs)
            .finish_non_exhaustive()
    }
}
