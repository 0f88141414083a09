mod api;
mod middleware;

use std::sync::Arc;

use anyhow::Context;
use pdpscout_scraper::{JobRegistry, ResolutionEngine};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pdpscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = pdpscout_core::load_stores(&config.stores_path)
        .with_context(|| {
            format!(
                "failed to load store catalog from {}",
                config.stores_path.display()
            )
        })?
        .stores;
    let engine = ResolutionEngine::from_app_config(&config, &catalog)?;
    tracing::info!(
        stores = catalog.len(),
        env = ?config.env,
        bind_addr = %config.bind_addr,
        "starting pdpscout-server"
    );

    let app = build_app(AppState {
        engine: Arc::new(engine),
        catalog: Arc::new(catalog),
        jobs: JobRegistry::new(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(error = %error, "failed to install signal handler");
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
