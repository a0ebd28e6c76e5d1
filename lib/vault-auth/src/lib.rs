//! vault-auth - obtain and cache HashiCorp Vault tokens
//!
//! Supported login methods:
//! 1. Static token, inline or read from a file
//! 2. AppRole
//! 3. Userpass
//! 4. Kubernetes service-account JWT
//! 5. GitHub personal token
//! 6. AWS IAM (signed `sts:GetCallerIdentity`)
//!
//! An [`AuthStrategy`] performs one login. A [`TokenManager`] wraps a strategy
//! and hands out the cached token until Vault's confirmed TTL runs out.

pub mod auth;
pub mod aws;
mod client;
mod error;
mod namespace;

#[cfg(test)]
mod testutil;

pub use auth::{
    AppRoleAuth, AuthMethod, AuthMethodKind, AuthStrategy, AwsIamAuth, GithubAuth, IssuedToken,
    KubernetesAuth, StaticTokenAuth, TokenManager, TokenManagerConfig, TokenSource, UserPassAuth,
};
pub use client::{HttpVaultClient, LoginRequest, LoginToken, VaultAuthApi, VaultClientBuilder};
pub use error::{AuthError, VaultError};
pub use namespace::{Namespace, ROOT_SENTINEL};
