//! In-memory stand-ins for Vault and the AWS SDK used by unit tests.

use crate::aws::{CloudCredentials, CredentialResolver};
use crate::client::{LoginRequest, LoginToken, VaultAuthApi};
use crate::namespace::Namespace;
use crate::VaultError;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) struct RecordedLogin {
    pub mount: String,
    pub method: &'static str,
    pub namespace: Namespace,
    pub payload: serde_json::Value,
}

/// Issues `token-1`, `token-2`, ... one per login call.
pub(crate) struct FakeVaultClient {
    logins: Mutex<Vec<RecordedLogin>>,
    lookups: Mutex<Vec<Namespace>>,
    ttl: Duration,
    lookup_fails: bool,
    rejection: Option<(u16, String)>,
    login_delay: Option<Duration>,
    lookup_delay: Option<Duration>,
}

impl FakeVaultClient {
    pub fn new() -> Self {
        Self {
            logins: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
            ttl: Duration::from_secs(3600),
            lookup_fails: false,
            rejection: None,
            login_delay: None,
            lookup_delay: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_failing_lookup(mut self) -> Self {
        self.lookup_fails = true;
        self
    }

    pub fn with_login_rejection(mut self, status: u16, message: &str) -> Self {
        self.rejection = Some((status, message.to_string()));
        self
    }

    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = Some(delay);
        self
    }

    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub fn logins(&self) -> Vec<RecordedLogin> {
        self.logins.lock().unwrap().clone()
    }

    pub fn login_count(&self) -> usize {
        self.logins.lock().unwrap().len()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn lookup_namespaces(&self) -> Vec<Namespace> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl VaultAuthApi for FakeVaultClient {
    async fn login(
        &self,
        mount: &str,
        request: LoginRequest<'_>,
        namespace: &Namespace,
    ) -> Result<LoginToken, VaultError> {
        let recorded = RecordedLogin {
            mount: mount.to_string(),
            method: request.name(),
            namespace: namespace.clone(),
            payload: request.payload(),
        };

        if let Some(delay) = self.login_delay {
            tokio::time::sleep(delay).await;
        }

        let count = {
            let mut logins = self.logins.lock().unwrap();
            logins.push(recorded);
            logins.len()
        };

        if let Some((status, message)) = &self.rejection {
            return Err(VaultError::ClientError {
                status: *status,
                message: message.clone(),
            });
        }

        Ok(LoginToken {
            token: format!("token-{}", count),
            lease_duration: self.ttl,
            renewable: true,
        })
    }

    async fn lookup_self_ttl(
        &self,
        _token: &str,
        namespace: &Namespace,
    ) -> Result<Duration, VaultError> {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        self.lookups.lock().unwrap().push(namespace.clone());
        if self.lookup_fails {
            return Err(VaultError::ClientError {
                status: 503,
                message: "Vault is sealed".to_string(),
            });
        }
        Ok(self.ttl)
    }
}

pub(crate) struct FakeCredentialResolver {
    fail: bool,
    ambient_calls: AtomicUsize,
    assumed: Mutex<Vec<(String, String)>>,
}

impl FakeCredentialResolver {
    pub fn new() -> Self {
        Self {
            fail: false,
            ambient_calls: AtomicUsize::new(0),
            assumed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn ambient_calls(&self) -> usize {
        self.ambient_calls.load(Ordering::SeqCst)
    }

    pub fn assumed_roles(&self) -> Vec<(String, String)> {
        self.assumed.lock().unwrap().clone()
    }

    fn credentials(&self) -> Result<CloudCredentials, VaultError> {
        if self.fail {
            return Err(VaultError::CloudCredentials(
                "no credentials in environment".into(),
            ));
        }
        Ok(CloudCredentials::new(
            "AKIAFAKE",
            "fake-secret",
            Some("fake-session".to_string()),
        ))
    }
}

#[async_trait]
impl CredentialResolver for FakeCredentialResolver {
    async fn ambient(&self) -> Result<CloudCredentials, VaultError> {
        self.ambient_calls.fetch_add(1, Ordering::SeqCst);
        self.credentials()
    }

    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<CloudCredentials, VaultError> {
        self.assumed
            .lock()
            .unwrap()
            .push((role_arn.to_string(), session_name.to_string()));
        self.credentials()
    }
}
