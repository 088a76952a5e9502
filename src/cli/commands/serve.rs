use anyhow::Context;
use clap::Args;

use crate::auth::JwtKeys;
use crate::config::config;
use crate::routes::app;
use crate::services::Services;
use crate::state::AppState;

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address (defaults to ITSM_API_HOST or the environment preset)")]
    pub host: Option<String>,

    #[arg(long, help = "Port (defaults to ITSM_API_PORT / PORT or 3000)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = config().clone();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if config.security.jwt_secret.is_empty() {
        if crate::is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        anyhow::bail!("JWT_SECRET is empty; set it or use APP_ENV=development");
    }

    tracing::info!("Starting ITSM API in {:?} mode", config.environment);

    let state = AppState::new(Services::in_memory(), JwtKeys::new(config.security.jwt_secret.clone()));
    let router = app(state, &config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("ITSM API listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
