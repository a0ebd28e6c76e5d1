//! AWS Signature Version 4 for the STS `GetCallerIdentity` proof.
//!
//! Vault replays the signed request verbatim against STS, so the header set,
//! the body bytes and the URL produced here are exactly what STS verifies.

use super::CloudCredentials;
use crate::VaultError;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings, sign};
use aws_sigv4::sign::v4::SigningParams;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::SystemTime;

pub const STS_ENDPOINT: &str = "https://sts.amazonaws.com/";
pub const STS_HOST: &str = "sts.amazonaws.com";
pub const STS_REGION: &str = "us-east-1";
pub const STS_SERVICE: &str = "sts";
pub const GET_CALLER_IDENTITY_BODY: &str = "Action=GetCallerIdentity&Version=2011-06-15";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
pub const SERVER_ID_HEADER: &str = "X-Vault-AWS-IAM-Server-ID";

const PROVIDER_NAME: &str = "vault-auth";

/// A signed request before it is encoded for Vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequestParts {
    pub method: String,
    pub url: String,
    pub body: Vec<u8>,
    /// One value array per header name.
    pub headers: BTreeMap<String, Vec<String>>,
}

/// A request about to be signed. Every header given here is signed.
struct UnsignedRequest<'a> {
    method: &'a str,
    url: &'a str,
    headers: &'a [(&'a str, &'a str)],
    body: &'a [u8],
}

impl UnsignedRequest<'_> {
    /// Returns the headers to send: the given ones followed by the ones the
    /// signature adds (`X-Amz-Date`, `X-Amz-Security-Token`, `Authorization`).
    fn sign(
        &self,
        credentials: &CloudCredentials,
        region: &str,
        service: &str,
        time: DateTime<Utc>,
    ) -> Result<Vec<(String, String)>, VaultError> {
        let identity = Credentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            credentials.session_token().map(str::to_string),
            None,
            PROVIDER_NAME,
        )
        .into();

        let signing_params = SigningParams::builder()
            .identity(&identity)
            .region(region)
            .name(service)
            .time(SystemTime::from(time))
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| VaultError::Signing(e.to_string()))?
            .into();

        let signable_request = SignableRequest::new(
            self.method,
            self.url,
            self.headers.iter().copied(),
            SignableBody::Bytes(self.body),
        )
        .map_err(|e| VaultError::Signing(e.to_string()))?;

        let (instructions, _signature) = sign(signable_request, &signing_params)
            .map_err(|e| VaultError::Signing(e.to_string()))?
            .into_parts();

        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        headers.extend(
            instructions
                .headers()
                .map(|(name, value)| (header_name(name), value.to_string())),
        );
        Ok(headers)
    }
}

/// `x-amz-date` -> `X-Amz-Date`.
fn header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Signs the fixed `GetCallerIdentity` call.
///
/// The server-id header is attached only when `server_id` is not blank, and is
/// forwarded exactly as given.
pub fn sign_get_caller_identity(
    credentials: &CloudCredentials,
    server_id: Option<&str>,
    time: DateTime<Utc>,
) -> Result<SignedRequestParts, VaultError> {
    let mut headers = vec![("Content-Type", FORM_CONTENT_TYPE), ("Host", STS_HOST)];
    if let Some(server_id) = server_id.filter(|id| !id.trim().is_empty()) {
        headers.push((SERVER_ID_HEADER, server_id));
    }

    let body = GET_CALLER_IDENTITY_BODY.as_bytes();
    let request = UnsignedRequest {
        method: "POST",
        url: STS_ENDPOINT,
        headers: &headers,
        body,
    };
    let signed = request.sign(credentials, STS_REGION, STS_SERVICE, time)?;

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in signed {
        grouped.entry(name).or_default().push(value);
    }

    Ok(SignedRequestParts {
        method: "POST".to_string(),
        url: STS_ENDPOINT.to_string(),
        body: body.to_vec(),
        headers: grouped,
    })
}
