//! vault-credentials - turn host supplied credential configs into cached Vault tokens
//!
//! ```no_run
//! use std::sync::Arc;
//! use vault_credentials::{AuthenticationDispatcher, CredentialConfig, HttpVaultClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(HttpVaultClient::from_env()?);
//! let config = CredentialConfig::from_json(r#"{"type": "kubernetes", "role": "ci"}"#)?;
//! let manager = AuthenticationDispatcher::new(client).token_manager(&config)?;
//! let token = manager.get_token().await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatcher;
mod error;

pub use config::{CredentialConfig, CredentialKind};
pub use dispatcher::AuthenticationDispatcher;
pub use error::ConfigError;
pub use vault_auth::{AuthError, HttpVaultClient, TokenManager, VaultClientBuilder, VaultError};
