pub mod profiles;

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use serde::Deserialize;

use profiles::{Profile, ProfileDefaults};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
    pub cors_allowed_origins: Option<String>,
    pub log_format: LogFormat,
    pub run_migrations: bool,
    pub cron_batch_size: i64,
    pub cron_dry_run: bool,
}

pub struct ConfigInfo {
    pub config: Config,
    pub profile: Profile,
    pub overrides: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<ConfigInfo> {
        dotenv().ok();
        Self::from_lookup(Profile::from_env(), |key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup` layered over the profile defaults.
    pub fn from_lookup(
        profile: Profile,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<ConfigInfo> {
        let defaults = ProfileDefaults::for_profile(profile);
        let mut overrides = Vec::new();

        let mut parsed = |key: &str| -> Option<String> {
            lookup(key).filter(|v| !v.is_empty()).map(|v| {
                overrides.push(key.to_string());
                v
            })
        };

        let server_port = parse_or(parsed("SERVER_PORT"), "SERVER_PORT", defaults.server_port)?;

        let database_url = match parsed("DATABASE_URL") {
            Some(url) => url,
            None => defaults
                .database_url
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
        };

        let db_max_connections = parse_or(
            parsed("DB_MAX_CONNECTIONS"),
            "DB_MAX_CONNECTIONS",
            defaults.db_max_connections,
        )?;
        let db_min_connections = parse_or(
            parsed("DB_MIN_CONNECTIONS"),
            "DB_MIN_CONNECTIONS",
            defaults.db_min_connections,
        )?;
        let db_acquire_timeout_secs =
            parse_or(parsed("DB_ACQUIRE_TIMEOUT_SECS"), "DB_ACQUIRE_TIMEOUT_SECS", 5)?;
        let request_timeout_secs = parse_or(
            parsed("REQUEST_TIMEOUT_SECS"),
            "REQUEST_TIMEOUT_SECS",
            defaults.request_timeout_secs,
        )?;
        let shutdown_timeout_secs =
            parse_or(parsed("SHUTDOWN_TIMEOUT_SECS"), "SHUTDOWN_TIMEOUT_SECS", 30)?;

        let cors_allowed_origins = parsed("CORS_ALLOWED_ORIGINS").or(defaults.cors_allowed_origins);

        let default_format = if defaults.json_logs { LogFormat::Json } else { LogFormat::Text };
        let log_format = parse_or(parsed("LOG_FORMAT"), "LOG_FORMAT", default_format)?;

        let run_migrations = parse_bool_or(parsed("RUN_MIGRATIONS"), "RUN_MIGRATIONS", true)?;
        let cron_batch_size = parse_or(parsed("CRON_BATCH_SIZE"), "CRON_BATCH_SIZE", 50)?;
        let cron_dry_run = parse_bool_or(parsed("CRON_DRY_RUN"), "CRON_DRY_RUN", false)?;

        if db_min_connections > db_max_connections {
            anyhow::bail!(
                "DB_MIN_CONNECTIONS ({}) cannot exceed DB_MAX_CONNECTIONS ({})",
                db_min_connections,
                db_max_connections
            );
        }

        Ok(ConfigInfo {
            config: Config {
                server_port,
                database_url,
                db_max_connections,
                db_min_connections,
                db_acquire_timeout_secs,
                request_timeout_secs,
                shutdown_timeout_secs,
                cors_allowed_origins,
                log_format,
                run_migrations,
                cron_batch_size,
                cron_dry_run,
            },
            profile,
            overrides,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {}: '{}' ({})", key, v, e)),
        None => Ok(default),
    }
}

fn parse_bool_or(value: Option<String>, key: &str, default: bool) -> anyhow::Result<bool> {
    match value.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("invalid boolean for {}: '{}'", key, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(profile: Profile, vars: &[(&str, &str)]) -> anyhow::Result<ConfigInfo> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(profile, move |key| map.get(key).cloned())
    }

    #[test]
    fn test_development_defaults() {
        let info = load(Profile::Development, &[]).unwrap();
        assert_eq!(info.config.server_port, 8080);
        assert_eq!(info.config.cron_batch_size, 50);
        assert!(!info.config.cron_dry_run);
        assert_eq!(info.config.log_format, LogFormat::Text);
        assert!(info.overrides.is_empty());
    }

    #[test]
    fn test_overrides_are_recorded() {
        let info = load(
            Profile::Development,
            &[("SERVER_PORT", "9000"), ("CRON_DRY_RUN", "true"), ("LOG_FORMAT", "json")],
        )
        .unwrap();
        assert_eq!(info.config.server_port, 9000);
        assert!(info.config.cron_dry_run);
        assert_eq!(info.config.log_format, LogFormat::Json);
        assert_eq!(info.overrides, vec!["SERVER_PORT", "LOG_FORMAT", "CRON_DRY_RUN"]);
    }

    #[test]
    fn test_production_requires_database_url() {
        let err = load(Profile::Production, &[]).err().unwrap();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let err = load(Profile::Development, &[("CRON_BATCH_SIZE", "lots")]).err().unwrap();
        assert!(err.to_string().contains("CRON_BATCH_SIZE"));
    }

    #[test]
    fn test_min_connections_cannot_exceed_max() {
        let result = load(
            Profile::Development,
            &[("DB_MIN_CONNECTIONS", "30"), ("DB_MAX_CONNECTIONS", "10")],
        );
        assert!(result.is_err());
    }
}
