use super::{normalize_mount, require};
use crate::client::{LoginRequest, VaultAuthApi};
use crate::namespace::Namespace;
use crate::VaultError;

pub const DEFAULT_APPROLE_MOUNT: &str = "approle";

/// AppRole authentication (role id + secret id)
pub struct AppRoleAuth {
    mount: String,
    role_id: String,
    secret_id: String,
}

impl AppRoleAuth {
    pub fn new(role_id: impl Into<String>, secret_id: impl Into<String>) -> Self {
        Self {
            mount: DEFAULT_APPROLE_MOUNT.to_string(),
            role_id: role_id.into(),
            secret_id: secret_id.into(),
        }
    }

    pub fn with_mount(mut self, mount: &str) -> Self {
        self.mount = normalize_mount(mount, DEFAULT_APPROLE_MOUNT);
        self
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn role_id(&self) -> &str {
        &self.role_id
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        require(&self.role_id, "role_id")?;
        require(&self.secret_id, "secret_id")
    }

    pub(crate) async fn login(
        &self,
        client: &dyn VaultAuthApi,
        namespace: &Namespace,
    ) -> Result<String, VaultError> {
        let request = LoginRequest::AppRole {
            role_id: &self.role_id,
            secret_id: &self.secret_id,
        };
        let login = client.login(&self.mount, request, namespace).await?;
        tracing::debug!(
            mount = %self.mount,
            advertised_ttl_secs = login.lease_duration.as_secs(),
            "AppRole login succeeded"
        );
        Ok(login.token)
    }
}
