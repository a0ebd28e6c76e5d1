use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vault_credentials::{AuthenticationDispatcher, CredentialConfig, HttpVaultClient};

/// Prints a Vault token for the credential config given as the only argument.
///
/// Vault address and default namespace come from `VAULT_ADDR` and
/// `VAULT_NAMESPACE`. Logs go to stderr, filtered by `RUST_LOG`.
#[tokio::main]
async fn main() -> ExitCode {
    init_logger();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: vault-token <credential-config.json>");
        return ExitCode::from(2);
    };

    match run(&path).await {
        Ok(token) => {
            println!("{}", token);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to obtain Vault token");
            ExitCode::FAILURE
        }
    }
}

async fn run(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let config = CredentialConfig::from_file(path).await?;
    let client = HttpVaultClient::builder()
        .application_name(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let timeout = client.timeout();
    let manager = AuthenticationDispatcher::new(Arc::new(client))
        .with_cloud_timeout(timeout)
        .token_manager(&config)?;
    Ok(manager.get_token().await?)
}

fn init_logger() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
