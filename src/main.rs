//! The messenger between error reporting and the people who fix errors.
//!
//! Iris accepts error report webhooks and posts an alert for each one into
//! the [Slack][slack] channel configured for the reporting project.
//!
//! Configuration is entirely via environment variables; see [config].

use config::Config;
use dotenvy::dotenv;
use router::Deps;
use std::{future::Future, net::SocketAddr, process};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod report;
mod router;
mod slack;

/// Application entrypoint. Initialises tracing, loads configuration, binds to
/// 0.0.0.0, and starts the server. Exits non-zero on bad configuration.
#[tokio::main]
async fn main() {
    // Loaded first so that `.env` can supply `RUST_LOG`.
    let has_dotenv = dotenv().is_ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    if !has_dotenv {
        warn!("No .env found");
    }

    let config = Config::from_env().unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });

    if config.basic_auth.is_none() {
        warn!("No $BASIC_AUTH_USERNAME/$BASIC_AUTH_PASSWORD found, all webhooks will be refused");
    }

    info!(
        default_channel = %config.channels.default_channel(),
        mapped_projects = config.channels.mapped_projects(),
        format = %config.message_format,
        "Loaded channel routing"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let deps = Deps::from_config(config).unwrap_or_else(|e| {
        error!("Failed to build Slack client: {}", e);
        process::exit(1);
    });

    let listener = TcpListener::bind(addr).await.unwrap_or_else(|e| {
        error!("Failed to bind {}: {}", addr, e);
        process::exit(1);
    });

    if let Err(e) = server(listener, deps, shutdown_signal()).await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}

/// Resolves on Ctrl-C, or never if the handler can't be installed.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }

    info!("Shutting down");
}

/// Serve on `listener` until `shutdown` resolves.
async fn server<F>(listener: TcpListener, deps: Deps, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router::new(deps).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}
