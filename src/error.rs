use std::path::PathBuf;
use thiserror::Error;
use vault_auth::AuthError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid credential config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read credential config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ConfigError {
    /// The configuration parsed but a required parameter is blank.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Auth(e) if e.is_configuration())
    }
}
