use crate::VaultError;
use std::path::PathBuf;

/// Where a pre-issued token comes from.
#[derive(Clone)]
pub enum TokenSource {
    Inline(String),
    /// Re-read on every call so a rotated file is picked up.
    File(PathBuf),
}

/// Static token authentication
pub struct StaticTokenAuth {
    source: TokenSource,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Inline(token.into()),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: TokenSource::File(path.into()),
        }
    }

    pub fn source(&self) -> &TokenSource {
        &self.source
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match &self.source {
            TokenSource::Inline(token) => super::require(token, "token"),
            TokenSource::File(path) if path.as_os_str().is_empty() => {
                Err("token file path is empty".to_string())
            }
            TokenSource::File(_) => Ok(()),
        }
    }

    pub(crate) async fn token(&self) -> Result<String, VaultError> {
        match &self.source {
            TokenSource::Inline(token) => Ok(token.clone()),
            TokenSource::File(path) => {
                let io_error = |source| VaultError::Io {
                    path: path.clone(),
                    source,
                };
                let content = tokio::fs::read_to_string(path).await.map_err(io_error)?;
                let token = content.trim();
                if token.is_empty() {
                    return Err(io_error(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "token file is empty",
                    )));
                }
                Ok(token.to_string())
            }
        }
    }
}
