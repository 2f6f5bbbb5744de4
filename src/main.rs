mod cli;

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use clap::Parser;
use payment_app::config::{Config, LogFormat};
use payment_app::handlers::NEXT_CURSOR_HEADER;
use payment_app::middleware::request_logger::REQUEST_ID_HEADER;
use payment_app::{create_app, postgres_health, Modules};
use tokio::sync::oneshot;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_info = Config::from_env()?;
    init_tracing(config_info.config.log_format);

    tracing::info!(
        profile = config_info.profile.as_str(),
        overrides = ?config_info.overrides,
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config_info.config, config_info.profile.as_str()).await,
        Commands::CronUpdatePayment { batch_size, dry_run } => {
            cli::handle_cron_update_payment(&config_info.config, batch_size, dry_run).await
        }
        Commands::Config => cli::handle_config_validate(&config_info),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

async fn serve(config: &Config, environment: &str) -> anyhow::Result<()> {
    let pool = payment_app::db::create_pool(config).await?;

    if config.run_migrations {
        payment_app::db::run_migrations(&pool, Path::new("./migrations")).await?;
    }

    let state = Modules::postgres(pool.clone()).into_state(
        postgres_health(pool, environment),
        Duration::from_secs(config.request_timeout_secs),
    );
    let app = create_app(state).layer(cors_layer(config.cors_allowed_origins.as_deref())?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let (draining_tx, draining_rx) = oneshot::channel::<()>();
    let server = axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = draining_tx.send(());
        });

    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    tokio::select! {
        result = server => result?,
        _ = async {
            if draining_rx.await.is_ok() {
                tokio::time::sleep(shutdown_timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "In-flight requests did not drain in time, shutting down anyway"
            );
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn cors_layer(origins: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(NEXT_CURSOR_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ]);

    let Some(origins) = origins else {
        return Ok(layer.allow_origin(Any));
    };

    let origins = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("invalid CORS_ALLOWED_ORIGINS: {}", e))?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
