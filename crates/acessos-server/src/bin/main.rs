//! Credential-sharing API server
//!
//! Data, settings and the key salt live in one directory. A token secret is
//! generated and saved on first start unless one is supplied.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use acessos_core::{JsonFileStore, SettingsManager, Vault};
use acessos_server::ApiServer;

/// Credential-sharing service with private and shared credentials
#[derive(Parser, Debug)]
#[command(name = "acessos-server")]
#[command(version)]
#[command(about = "Credential-sharing HTTP API server")]
struct Args {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, env = "ACESSOS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Base64 token signing secret (overrides the saved one)
    #[arg(long, env = "ACESSOS_TOKEN_SECRET", hide_env_values = true)]
    token_secret: Option<String>,

    /// Password for the bootstrap administrator account
    #[arg(long, env = "ACESSOS_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => JsonFileStore::default_dir()?,
    };
    tokio::fs::create_dir_all(&data_dir).await?;
    info!("Using data directory {:?}", data_dir);

    let mut settings_manager = SettingsManager::load(&data_dir)
        .map_err(|e| format!("Failed to load settings: {}", e))?;
    if args.token_secret.is_none() {
        settings_manager.ensure_token_secret().await?;
    }

    let mut settings = settings_manager.into_settings();
    if let Some(secret) = args.token_secret {
        settings.token_secret = Some(secret);
    }
    if let Some(bind) = args.bind {
        settings.bind_address = bind;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(password) = args.admin_password {
        settings.bootstrap_admin.senha = Some(password);
    }

    let vault = Vault::open(settings, &data_dir)
        .await
        .map_err(|e| format!("Failed to open vault: {}", e))?;

    if !vault.ensure_admin().await? && vault.settings().bootstrap_admin.senha.is_none() {
        warn!("No bootstrap administrator password configured (set ACESSOS_ADMIN_PASSWORD)");
    }

    ApiServer::new(Arc::new(vault)).run().await
}
