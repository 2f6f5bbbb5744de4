pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod schemas;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware as axum_middleware, routing::get, Router};
use sqlx::PgPool;

use crate::db::memory::{MemoryPaymentSettingStore, MemoryPaymentStore};
use crate::db::{PgPaymentSettingStore, PgPaymentStore};
use crate::health::{HealthChecker, PostgresChecker};
use crate::services::ports::{PaymentSettingStore, PaymentSettingsPort, PaymentStore};
use crate::services::{PaymentService, PaymentSettingsService};

#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<PaymentService>,
    pub payment_settings: Arc<PaymentSettingsService>,
    pub health: Arc<HealthChecker>,
    pub request_timeout: Duration,
}

/// The two feature modules, wired once. The payment module sees the settings
/// module only through [`PaymentSettingsPort`].
pub struct Modules {
    pub payments: Arc<PaymentService>,
    pub payment_settings: Arc<PaymentSettingsService>,
}

impl Modules {
    pub fn new(
        payment_store: Arc<dyn PaymentStore>,
        setting_store: Arc<dyn PaymentSettingStore>,
    ) -> Self {
        let payment_settings = Arc::new(PaymentSettingsService::new(setting_store));
        let settings_port: Arc<dyn PaymentSettingsPort> = payment_settings.clone();
        let payments = Arc::new(PaymentService::new(payment_store, settings_port));

        Self {
            payments,
            payment_settings,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgPaymentStore::new(pool.clone())),
            Arc::new(PgPaymentSettingStore::new(pool)),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryPaymentStore::new()),
            Arc::new(MemoryPaymentSettingStore::new()),
        )
    }

    /// Routes of every module, relative to the API prefix.
    pub fn routes() -> Router<AppState> {
        Router::new()
            .merge(handlers::payments::routes())
            .merge(handlers::payment_settings::routes())
    }

    pub fn into_state(self, health: HealthChecker, request_timeout: Duration) -> AppState {
        AppState {
            payments: self.payments,
            payment_settings: self.payment_settings,
            health: Arc::new(health),
            request_timeout,
        }
    }
}

/// Health checker for a PostgreSQL-backed deployment.
pub fn postgres_health(pool: PgPool, environment: &str) -> HealthChecker {
    HealthChecker::new(environment).add_checker(Box::new(PostgresChecker::new(pool)))
}

pub fn create_app(app_state: AppState) -> Router {
    let request_timeout = app_state.request_timeout;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(handlers::openapi))
        .nest("/api/v1", Modules::routes())
        .layer(axum_middleware::from_fn_with_state(
            request_timeout,
            middleware::timeout::timeout_middleware,
        ))
        .layer(axum_middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .with_state(app_state)
}
