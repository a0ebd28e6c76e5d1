use super::{normalize_mount, require};
use crate::client::{LoginRequest, VaultAuthApi};
use crate::namespace::Namespace;
use crate::VaultError;

pub const DEFAULT_USERPASS_MOUNT: &str = "userpass";

/// Username and password authentication
pub struct UserPassAuth {
    mount: String,
    username: String,
    password: String,
}

impl UserPassAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mount: DEFAULT_USERPASS_MOUNT.to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn with_mount(mut self, mount: &str) -> Self {
        self.mount = normalize_mount(mount, DEFAULT_USERPASS_MOUNT);
        self
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        require(&self.username, "username")?;
        require(&self.password, "password")
    }

    pub(crate) async fn login(
        &self,
        client: &dyn VaultAuthApi,
        namespace: &Namespace,
    ) -> Result<String, VaultError> {
        let request = LoginRequest::UserPass {
            username: &self.username,
            password: &self.password,
        };
        let login = client.login(&self.mount, request, namespace).await?;
        tracing::debug!(
            mount = %self.mount,
            username = %self.username,
            advertised_ttl_secs = login.lease_duration.as_secs(),
            "Userpass login succeeded"
        );
        Ok(login.token)
    }
}
