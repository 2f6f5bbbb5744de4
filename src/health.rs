use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use utoipa::ToSchema;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub dependencies: HashMap<String, DependencyStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DependencyStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyStatus {
    fn healthy(start: Instant) -> Self {
        Self {
            status: "healthy".to_string(),
            latency_ms: Some(start.elapsed().as_millis() as u64),
            error: None,
        }
    }

    fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            latency_ms: None,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait DependencyChecker: Send + Sync {
    async fn check(&self) -> DependencyStatus;
    fn name(&self) -> &'static str;
}

pub struct PostgresChecker {
    pool: sqlx::PgPool,
}

impl PostgresChecker {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DependencyChecker for PostgresChecker {
    async fn check(&self) -> DependencyStatus {
        let start = Instant::now();
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => DependencyStatus::healthy(start),
            Err(e) => {
                tracing::warn!(error = %e, "Postgres health check failed");
                DependencyStatus::unhealthy("database unreachable")
            }
        }
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

pub struct HealthChecker {
    checkers: Vec<Box<dyn DependencyChecker>>,
    environment: String,
    start_time: Instant,
}

impl HealthChecker {
    pub fn new(environment: &str) -> Self {
        Self {
            checkers: Vec::new(),
            environment: environment.to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn add_checker(mut self, checker: Box<dyn DependencyChecker>) -> Self {
        self.checkers.push(checker);
        self
    }

    pub async fn check_all(&self) -> HealthResponse {
        let futures = self.checkers.iter().map(|checker| async move {
            let status = match timeout(CHECK_TIMEOUT, checker.check()).await {
                Ok(status) => status,
                Err(_) => DependencyStatus::unhealthy("timeout"),
            };
            (checker.name().to_string(), status)
        });

        let results = futures::future::join_all(futures).await;
        let healthy = results.iter().all(|(_, s)| s.status == "healthy");

        HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: self.environment.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            dependencies: results.into_iter().collect(),
        }
    }
}
