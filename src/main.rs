//! Tusk - user management API server

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tusk_backend::{
    api::build_router,
    config::{Args, Config},
    init_auth,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::try_from(Args::parse()).context("Invalid configuration")?;

    info!("🚀 Tusk API starting");

    let auth_state = init_auth(&config)?;

    let attachment_dir = config.attachment_dir.as_path();
    if !attachment_dir.is_dir() {
        warn!(
            "Attachment directory {} does not exist, /attachment will return 404",
            attachment_dir.display()
        );
    }

    let app = build_router(auth_state, Some(attachment_dir));

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("🎯 API server listening on {}", config.bind);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tusk_backend=debug,tusk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also try the crate directory when launched from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
