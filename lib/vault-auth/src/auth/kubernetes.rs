use super::{normalize_mount, require};
use crate::client::{LoginRequest, VaultAuthApi};
use crate::namespace::Namespace;
use crate::VaultError;
use std::path::PathBuf;

pub const DEFAULT_KUBERNETES_MOUNT: &str = "kubernetes";
pub const DEFAULT_JWT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Kubernetes authentication
///
/// The service-account JWT is read on every login: projected tokens rotate.
pub struct KubernetesAuth {
    mount: String,
    role: String,
    jwt_path: PathBuf,
}

impl KubernetesAuth {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            mount: DEFAULT_KUBERNETES_MOUNT.to_string(),
            role: role.into(),
            jwt_path: PathBuf::from(DEFAULT_JWT_PATH),
        }
    }

    pub fn with_mount(mut self, mount: &str) -> Self {
        self.mount = normalize_mount(mount, DEFAULT_KUBERNETES_MOUNT);
        self
    }

    pub fn with_jwt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.jwt_path = path.into();
        self
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        require(&self.role, "role")
    }

    async fn read_jwt(&self) -> Result<String, VaultError> {
        let io_error = |source| VaultError::Io {
            path: self.jwt_path.clone(),
            source,
        };
        let content = tokio::fs::read_to_string(&self.jwt_path)
            .await
            .map_err(io_error)?;
        let jwt = content.trim();
        if jwt.is_empty() {
            return Err(io_error(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "service account token file is empty",
            )));
        }
        Ok(jwt.to_string())
    }

    pub(crate) async fn login(
        &self,
        client: &dyn VaultAuthApi,
        namespace: &Namespace,
    ) -> Result<String, VaultError> {
        let jwt = self.read_jwt().await?;
        let request = LoginRequest::Kubernetes {
            role: &self.role,
            jwt: &jwt,
        };
        let login = client.login(&self.mount, request, namespace).await?;
        tracing::debug!(
            mount = %self.mount,
            role = %self.role,
            advertised_ttl_secs = login.lease_duration.as_secs(),
            "Kubernetes login succeeded"
        );
        Ok(login.token)
    }
}
