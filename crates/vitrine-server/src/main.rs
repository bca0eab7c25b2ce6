mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vitrine_assets::{AssetHost, AssetHostClient};

use crate::api::{build_app, AppState, Assets};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(vitrine_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(config = ?config, "starting vitrine-server");

    let pool = vitrine_db::connect_pool_from_config(&config).await?;
    let applied = vitrine_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations up to date");

    let assets = match config.assets_private_key.as_deref() {
        Some(key) => {
            let client = AssetHostClient::with_base_urls(
                key,
                config.assets_timeout_secs,
                &config.assets_api_base_url,
                &config.assets_upload_base_url,
            )?;
            if config.assets_url_endpoint.is_none() {
                tracing::warn!(
                    "VITRINE_ASSETS_URL_ENDPOINT not set; no stored URL will be treated as hosted \
                     and remote cleanup is disabled"
                );
            }
            let host: Arc<dyn AssetHost> = Arc::new(client);
            Some(Assets::new(host, &config))
        }
        None => {
            tracing::warn!("VITRINE_ASSETS_PRIVATE_KEY not set; uploads disabled");
            None
        }
    };

    let bind_addr = config.bind_addr;
    let app = build_app(AppState {
        pool,
        config,
        assets,
    });

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
