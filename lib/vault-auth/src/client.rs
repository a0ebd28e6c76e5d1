use crate::aws::IamLoginProof;
use crate::error::VaultError;
use crate::namespace::Namespace;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";
const TOKEN_HEADER: &str = "X-Vault-Token";

/// Token returned by a login call, with the lease Vault advertised for it.
#[derive(Clone)]
pub struct LoginToken {
    pub token: String,
    pub lease_duration: Duration,
    pub renewable: bool,
}

impl std::fmt::Debug for LoginToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginToken")
            .field("token", &"[REDACTED]")
            .field("lease_duration", &self.lease_duration)
            .field("renewable", &self.renewable)
            .finish()
    }
}

/// Method specific proof sent to `auth/<mount>/login`.
#[derive(Clone, Copy)]
pub enum LoginRequest<'a> {
    AppRole { role_id: &'a str, secret_id: &'a str },
    UserPass { username: &'a str, password: &'a str },
    Kubernetes { role: &'a str, jwt: &'a str },
    Github { token: &'a str },
    AwsIam { role: &'a str, proof: &'a IamLoginProof },
}

impl<'a> LoginRequest<'a> {
    /// Path segments below `/v1`.
    pub fn segments<'m>(&self, mount: &'m str) -> Vec<&'m str>
    where
        'a: 'm,
    {
        let mut segments = vec!["auth"];
        segments.extend(mount.split('/').filter(|s| !s.is_empty()));
        segments.push("login");
        if let LoginRequest::UserPass { username, .. } = *self {
            segments.push(username);
        }
        segments
    }

    pub fn payload(&self) -> serde_json::Value {
        match *self {
            LoginRequest::AppRole { role_id, secret_id } => serde_json::json!({
                "role_id": role_id,
                "secret_id": secret_id,
            }),
            LoginRequest::UserPass { password, .. } => serde_json::json!({
                "password": password,
            }),
            LoginRequest::Kubernetes { role, jwt } => serde_json::json!({
                "role": role,
                "jwt": jwt,
            }),
            LoginRequest::Github { token } => serde_json::json!({
                "token": token,
            }),
            LoginRequest::AwsIam { role, proof } => serde_json::json!({
                "role": role,
                "iam_http_request_method": proof.method,
                "iam_request_url": proof.request_url,
                "iam_request_body": proof.request_body,
                "iam_request_headers": proof.request_headers,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoginRequest::AppRole { .. } => "approle",
            LoginRequest::UserPass { .. } => "userpass",
            LoginRequest::Kubernetes { .. } => "kubernetes",
            LoginRequest::Github { .. } => "github",
            LoginRequest::AwsIam { .. } => "aws-iam",
        }
    }
}

/// The slice of the Vault API that authentication needs.
#[async_trait]
pub trait VaultAuthApi: Send + Sync {
    /// Exchange method specific proof for a token.
    async fn login(
        &self,
        mount: &str,
        request: LoginRequest<'_>,
        namespace: &Namespace,
    ) -> Result<LoginToken, VaultError>;

    /// Remaining TTL of `token` as Vault currently sees it.
    async fn lookup_self_ttl(&self, token: &str, namespace: &Namespace)
    -> Result<Duration, VaultError>;
}

pub struct VaultClientBuilder {
    base_url: Option<String>,
    namespace: Option<String>,
    timeout: Duration,
    application_name: Option<String>,
}

impl Default for VaultClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            namespace: None,
            timeout: DEFAULT_TIMEOUT,
            application_name: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Ambient namespace applied to calls that do not override it.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Connect plus read timeout for every request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<HttpVaultClient, VaultError> {
        let address = self
            .base_url
            .or_else(|| std::env::var("VAULT_ADDR").ok())
            .ok_or(VaultError::VaultNotDetected)?;

        let base_url = Url::parse(&address).map_err(|e| VaultError::InvalidAddress {
            address: address.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(VaultError::InvalidAddress {
                address,
                reason: "not a base URL".to_string(),
            });
        }

        // Blank or a root sentinel means no ambient namespace.
        let namespace = self
            .namespace
            .or_else(|| std::env::var("VAULT_NAMESPACE").ok())
            .and_then(|ns| match Namespace::from_override(Some(&ns)) {
                Namespace::Named(name) => Some(name),
                Namespace::Ambient | Namespace::Root => None,
            });

        let mut http = reqwest::Client::builder().timeout(self.timeout);
        if let Some(name) = self.application_name {
            http = http.user_agent(name);
        }

        Ok(HttpVaultClient {
            base_url,
            namespace,
            timeout: self.timeout,
            http: http.build()?,
        })
    }
}

/// [`VaultAuthApi`] over Vault's HTTP API.
pub struct HttpVaultClient {
    base_url: Url,
    namespace: Option<String>,
    timeout: Duration,
    http: reqwest::Client,
}

impl HttpVaultClient {
    pub fn builder() -> VaultClientBuilder {
        VaultClientBuilder::new()
    }

    pub fn from_env() -> Result<Self, VaultError> {
        VaultClientBuilder::new().build()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Result<Url, VaultError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VaultError::InvalidAddress {
                address: self.base_url.to_string(),
                reason: "not a base URL".to_string(),
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, namespace: &Namespace) -> RequestBuilder {
        let mut request = self.http.request(method, url);
        if let Some(ns) = namespace.resolve(self.namespace.as_deref()) {
            request = request.header(NAMESPACE_HEADER, ns);
        }
        request
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    auth: Option<AuthData>,
}

#[derive(Deserialize)]
struct AuthData {
    client_token: String,
    #[serde(default)]
    lease_duration: u64,
    #[serde(default)]
    renewable: bool,
}

#[derive(Deserialize)]
struct LookupSelfResponse {
    data: LookupSelfData,
}

#[derive(Deserialize)]
struct LookupSelfData {
    ttl: u64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Maps a non-2xx response to [`VaultError::ClientError`] with Vault's messages.
async fn check_status(response: Response) -> Result<Response, VaultError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed.errors.join("; "),
        _ => body,
    };

    Err(VaultError::ClientError { status, message })
}

#[async_trait]
impl VaultAuthApi for HttpVaultClient {
    async fn login(
        &self,
        mount: &str,
        request: LoginRequest<'_>,
        namespace: &Namespace,
    ) -> Result<LoginToken, VaultError> {
        let url = self.endpoint(request.segments(mount))?;
        tracing::debug!(method = request.name(), %url, "Logging in to Vault");

        let response = self
            .request(Method::POST, url, namespace)
            .json(&request.payload())
            .send()
            .await?;
        let response = check_status(response).await?;

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(format!("login response: {}", e)))?;
        let auth = login.auth.ok_or_else(|| {
            VaultError::InvalidResponse("login response has no auth block".to_string())
        })?;

        Ok(LoginToken {
            token: auth.client_token,
            lease_duration: Duration::from_secs(auth.lease_duration),
            renewable: auth.renewable,
        })
    }

    async fn lookup_self_ttl(
        &self,
        token: &str,
        namespace: &Namespace,
    ) -> Result<Duration, VaultError> {
        let url = self.endpoint(["auth", "token", "lookup-self"])?;

        let response = self
            .request(Method::GET, url, namespace)
            .header(TOKEN_HEADER, token)
            .send()
            .await?;
        let response = check_status(response).await?;

        let lookup: LookupSelfResponse = response
            .json()
            .await
            .map_err(|e| VaultError::InvalidResponse(format!("lookup-self response: {}", e)))?;

        Ok(Duration::from_secs(lookup.data.ttl))
    }
}
