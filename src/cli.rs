use std::sync::Arc;

use clap::{Parser, Subcommand};
use payment_app::config::{Config, ConfigInfo};
use payment_app::services::{PaymentUpdater, UpdaterConfig, UpdaterError};
use payment_app::Modules;

#[derive(Parser)]
#[command(name = "payment-app")]
#[command(about = "Payments and payment settings service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Advance one batch of pending payments to processing, then exit
    CronUpdatePayment {
        /// Maximum number of payments to process (defaults to CRON_BATCH_SIZE)
        #[arg(long, value_name = "N")]
        batch_size: Option<i64>,

        /// Log intended changes without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Flags override the configured defaults; `--dry-run` can only switch dry-run on.
pub fn updater_config(config: &Config, batch_size: Option<i64>, dry_run: bool) -> UpdaterConfig {
    UpdaterConfig::new(
        batch_size.unwrap_or(config.cron_batch_size),
        dry_run || config.cron_dry_run,
    )
}

pub async fn handle_cron_update_payment(
    config: &Config,
    batch_size: Option<i64>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let pool = payment_app::db::create_pool(config).await?;
    let modules = Modules::postgres(pool);
    let updater = PaymentUpdater::new(
        Arc::clone(&modules.payments),
        updater_config(config, batch_size, dry_run),
    );

    match updater.execute().await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            println!("✓ Payment update job {}", result.job_status());
            Ok(())
        }
        Err(UpdaterError::PartialFailure(result)) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            anyhow::bail!(
                "payment update job {}: {} of {} failed",
                result.job_status(),
                result.error_count,
                result.processed_count
            )
        }
        Err(e) => Err(e.into()),
    }
}

pub fn handle_config_validate(info: &ConfigInfo) -> anyhow::Result<()> {
    let config = &info.config;
    tracing::info!("Validating configuration...");

    println!("Configuration ({} profile):", info.profile.as_str());
    println!("  Server Port: {}", config.server_port);
    println!("  Database URL: {}", mask_password(&config.database_url));
    println!(
        "  DB Connections: {}..{} (acquire timeout {}s)",
        config.db_min_connections, config.db_max_connections, config.db_acquire_timeout_secs
    );
    println!("  Request Timeout: {}s", config.request_timeout_secs);
    println!("  Shutdown Timeout: {}s", config.shutdown_timeout_secs);
    println!(
        "  CORS Origins: {}",
        config.cors_allowed_origins.as_deref().unwrap_or("*")
    );
    println!("  Log Format: {:?}", config.log_format);
    println!("  Run Migrations: {}", config.run_migrations);
    println!("  Cron Batch Size: {}", config.cron_batch_size);
    println!("  Cron Dry Run: {}", config.cron_dry_run);
    if !info.overrides.is_empty() {
        println!("  Overridden by environment: {}", info.overrides.join(", "));
    }

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user = &url[slash_pos + 2..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}
