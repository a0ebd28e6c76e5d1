use super::{normalize_mount, require};
use crate::client::{LoginRequest, VaultAuthApi};
use crate::namespace::Namespace;
use crate::VaultError;

pub const DEFAULT_GITHUB_MOUNT: &str = "github";

/// GitHub personal access token authentication
pub struct GithubAuth {
    mount: String,
    token: String,
}

impl GithubAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            mount: DEFAULT_GITHUB_MOUNT.to_string(),
            token: token.into(),
        }
    }

    pub fn with_mount(mut self, mount: &str) -> Self {
        self.mount = normalize_mount(mount, DEFAULT_GITHUB_MOUNT);
        self
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        require(&self.token, "token")
    }

    pub(crate) async fn login(
        &self,
        client: &dyn VaultAuthApi,
        namespace: &Namespace,
    ) -> Result<String, VaultError> {
        let request = LoginRequest::Github { token: &self.token };
        let login = client.login(&self.mount, request, namespace).await?;
        tracing::debug!(mount = %self.mount, "GitHub login succeeded");
        Ok(login.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeVaultClient;

    #[tokio::test]
    async fn test_login_sends_token_to_mount() {
        let client = FakeVaultClient::new();
        let auth = GithubAuth::new("ghp_abc").with_mount("/gh-ci/");

        let token = auth.login(&client, &Namespace::Root).await.unwrap();

        assert_eq!(token, "token-1");
        let logins = client.logins();
        assert_eq!(logins[0].mount, "gh-ci");
        assert_eq!(logins[0].method, "github");
        assert_eq!(logins[0].namespace, Namespace::Root);
        assert_eq!(logins[0].payload, serde_json::json!({ "token": "ghp_abc" }));
    }

    #[test]
    fn test_blank_token_is_invalid() {
        assert_eq!(GithubAuth::new("").validate().unwrap_err(), "token is blank");
    }
}
