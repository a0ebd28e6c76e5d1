use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use vault_auth::aws::{CloudAuthContext, CloudCredentials, CredentialSource};
use vault_auth::{
    AppRoleAuth, AuthStrategy, AwsIamAuth, HttpVaultClient, KubernetesAuth, Namespace,
    StaticTokenAuth, TokenManager, UserPassAuth,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn login_response(token: &str, lease_duration: u64) -> serde_json::Value {
    serde_json::json!({
        "request_id": "test-request-id",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": null,
        "wrap_info": null,
        "warnings": null,
        "auth": {
            "client_token": token,
            "accessor": "test-accessor",
            "policies": ["default"],
            "lease_duration": lease_duration,
            "renewable": true
        }
    })
}

fn lookup_response(ttl: u64) -> serde_json::Value {
    serde_json::json!({
        "request_id": "test-request-id",
        "data": {
            "accessor": "test-accessor",
            "policies": ["default"],
            "ttl": ttl
        }
    })
}

async fn mount_lookup_self(server: &MockServer, ttl: u64) {
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_response(ttl)))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> HttpVaultClient {
    HttpVaultClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn client_with_namespace(server: &MockServer, namespace: &str) -> HttpVaultClient {
    HttpVaultClient::builder()
        .base_url(server.uri())
        .namespace(namespace)
        .build()
        .unwrap()
}

fn namespace_header(request: &Request) -> Option<String> {
    request
        .headers
        .get("X-Vault-Namespace")
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_approle_login_is_cached_by_token_manager() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .and(body_partial_json(serde_json::json!({
            "role_id": "role-id",
            "secret_id": "secret-id"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response("s.approle", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", "s.approle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_response(3599)))
        .expect(1)
        .mount(&server)
        .await;

    let strategy = AuthStrategy::new(AppRoleAuth::new("role-id", "secret-id"));
    let manager = TokenManager::new(strategy, Arc::new(client(&server)));

    assert_eq!(manager.get_token().await.unwrap(), "s.approle");
    assert_eq!(manager.get_token().await.unwrap(), "s.approle");
}

#[tokio::test]
async fn test_root_sentinel_clears_ambient_namespace() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response("s.root", 60)))
        .mount(&server)
        .await;

    let client = client_with_namespace(&server, "team-a");
    let strategy = AuthStrategy::new(AppRoleAuth::new("role-id", "secret-id"))
        .with_namespace(Namespace::from_override(Some("/")));

    assert_eq!(strategy.authenticate(&client).await.unwrap(), "s.root");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(namespace_header(&requests[0]), None);
}

#[tokio::test]
async fn test_unset_override_keeps_ambient_namespace() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .and(header("X-Vault-Namespace", "team-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response("s.ambient", 60)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_namespace(&server, "team-a");
    let strategy = AuthStrategy::new(AppRoleAuth::new("role-id", "secret-id"))
        .with_namespace(Namespace::from_override(Some("  ")));

    assert_eq!(strategy.authenticate(&client).await.unwrap(), "s.ambient");
}

#[tokio::test]
async fn test_named_override_replaces_ambient_namespace() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response("s.named", 60)))
        .mount(&server)
        .await;
    mount_lookup_self(&server, 60).await;

    let client = client_with_namespace(&server, "team-a");
    let strategy = AuthStrategy::new(AppRoleAuth::new("role-id", "secret-id"))
        .with_namespace(Namespace::from_override(Some("team-b/ci")));
    let manager = TokenManager::new(strategy, Arc::new(client));

    manager.get_token().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(namespace_header(request).as_deref(), Some("team-b/ci"));
    }
}

#[tokio::test]
async fn test_userpass_login_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/ldap-users/login/jenkins"))
        .and(body_partial_json(serde_json::json!({ "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response("s.user", 60)))
        .expect(1)
        .mount(&server)
        .await;

    let strategy =
        AuthStrategy::new(UserPassAuth::new("jenkins", "hunter2").with_mount("ldap-users"));

    assert_eq!(strategy.authenticate(&client(&server)).await.unwrap(), "s.user");
}

#[tokio::test]
async fn test_kubernetes_login_rereads_rotated_jwt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/kubernetes/login"))
        .and(body_partial_json(serde_json::json!({ "role": "ci", "jwt": "jwt-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response("s.k8s-1", 60)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/kubernetes/login"))
        .and(body_partial_json(serde_json::json!({ "role": "ci", "jwt": "jwt-2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response("s.k8s-2", 60)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let jwt_path = dir.path().join("token");
    std::fs::write(&jwt_path, "jwt-1\n").unwrap();

    let client = client(&server);
    let strategy = AuthStrategy::new(KubernetesAuth::new("ci").with_jwt_path(&jwt_path));

    assert_eq!(strategy.authenticate(&client).await.unwrap(), "s.k8s-1");

    std::fs::write(&jwt_path, "jwt-2\n").unwrap();
    assert_eq!(strategy.authenticate(&client).await.unwrap(), "s.k8s-2");
}

#[tokio::test]
async fn test_rejected_login_surfaces_vault_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "errors": ["invalid role or secret ID"]
        })))
        .mount(&server)
        .await;

    let strategy = AuthStrategy::new(AppRoleAuth::new("role-id", "wrong"));
    let manager = TokenManager::new(strategy, Arc::new(client(&server)));

    let err = manager.get_token().await.unwrap_err();
    assert!(err.is_rejected());
    assert!(err.to_string().contains("invalid role or secret ID"));
    assert!(manager.expires_at().await.is_none());
}

#[tokio::test]
async fn test_blank_configuration_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response("never", 60)))
        .expect(0)
        .mount(&server)
        .await;

    let strategy = AuthStrategy::new(AppRoleAuth::new("role-id", "  "));
    let manager = TokenManager::new(strategy, Arc::new(client(&server)));

    let err = manager.get_token().await.unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_token_file_is_reread_without_calling_vault() {
    let server = MockServer::start().await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "s.first").unwrap();

    let strategy = AuthStrategy::new(StaticTokenAuth::from_file(file.path()));
    let manager = TokenManager::new(strategy, Arc::new(client(&server)));
    assert_eq!(manager.get_token().await.unwrap(), "s.first");

    std::fs::write(file.path(), "s.second\n").unwrap();
    assert_eq!(manager.get_token().await.unwrap(), "s.second");

    assert!(server.received_requests().await.unwrap().is_empty());
}

fn decoded_headers(login_body: &serde_json::Value) -> BTreeMap<String, Vec<String>> {
    let encoded = login_body["iam_request_headers"].as_str().unwrap();
    serde_json::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap()
}

fn decoded(login_body: &serde_json::Value, field: &str) -> String {
    let encoded = login_body[field].as_str().unwrap();
    String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
}

async fn aws_login_body(server_id: Option<&str>) -> serde_json::Value {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/aws/login"))
        .and(body_partial_json(serde_json::json!({
            "role": "ci-role",
            "iam_http_request_method": "POST"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_response("s.aws", 900)))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = CloudCredentials::new("AKIDEXAMPLE", "secret", None);
    let mut context = CloudAuthContext::new(CredentialSource::Static(credentials));
    if let Some(server_id) = server_id {
        context = context.with_server_id(server_id);
    }
    let strategy = AuthStrategy::new(AwsIamAuth::new("ci-role", context));

    assert_eq!(strategy.authenticate(&client(&server)).await.unwrap(), "s.aws");

    let requests = server.received_requests().await.unwrap();
    requests[0].body_json().unwrap()
}

#[tokio::test]
async fn test_aws_iam_login_without_server_id() {
    let body = aws_login_body(Some("")).await;

    assert_eq!(
        decoded(&body, "iam_request_body"),
        "Action=GetCallerIdentity&Version=2011-06-15"
    );
    assert_eq!(decoded(&body, "iam_request_url"), "https://sts.amazonaws.com/");

    let headers = decoded_headers(&body);
    assert!(!headers.contains_key("X-Vault-AWS-IAM-Server-ID"));
    assert!(headers["Authorization"][0].starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
}

#[tokio::test]
async fn test_aws_iam_login_with_server_id() {
    let body = aws_login_body(Some("prod-jenkins")).await;

    let headers = decoded_headers(&body);
    assert_eq!(headers["X-Vault-AWS-IAM-Server-ID"], vec!["prod-jenkins"]);
    assert!(
        headers["Authorization"][0].contains("x-vault-aws-iam-server-id"),
        "server id header must be signed"
    );
}
