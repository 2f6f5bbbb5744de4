use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::translate_error;
use crate::domain::{
    NewPaymentSetting, PaymentSetting, PaymentSettingChanges, PaymentSettingFilter,
};
use crate::error::AppError;
use crate::services::ports::PaymentSettingStore;
use crate::utils::id::{generate_pk, PAYMENT_SETTING_PREFIX};

const ENTITY: &str = "payment setting";

pub struct PgPaymentSettingStore {
    pool: PgPool,
}

impl PgPaymentSettingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentSettingStore for PgPaymentSettingStore {
    async fn create(&self, new: NewPaymentSetting) -> Result<PaymentSetting, AppError> {
        let id = generate_pk(PAYMENT_SETTING_PREFIX);
        let now = Utc::now();

        sqlx::query_as::<_, PaymentSetting>(
            r#"
            INSERT INTO payment_settings (id, setting_key, setting_value, currency, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, setting_key, setting_value, currency, status, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(&new.setting_key)
        .bind(&new.setting_value)
        .bind(&new.currency)
        .bind(&new.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_error(e, ENTITY))
    }

    async fn get(&self, id: &str) -> Result<PaymentSetting, AppError> {
        sqlx::query_as::<_, PaymentSetting>(
            "SELECT id, setting_key, setting_value, currency, status, created_at, updated_at FROM payment_settings WHERE id = $1"
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_error(e, ENTITY))
    }

    async fn range_query(
        &self,
        filter: &PaymentSettingFilter,
        before_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<PaymentSetting>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, setting_key, setting_value, currency, status, created_at, updated_at FROM payment_settings WHERE TRUE",
        );
        if let Some(currency) = &filter.currency {
            query.push(" AND currency = ").push_bind(currency.clone());
        }
        if let Some(key) = &filter.setting_key {
            query.push(" AND setting_key = ").push_bind(key.clone());
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ").push_bind(status.clone());
        }
        if let Some(before) = before_id {
            query.push(" AND id < ").push_bind(before.to_string());
        }
        query.push(" ORDER BY id DESC LIMIT ").push_bind(limit);

        query
            .build_query_as::<PaymentSetting>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| translate_error(e, ENTITY))
    }

    async fn update(
        &self,
        id: &str,
        changes: PaymentSettingChanges,
    ) -> Result<PaymentSetting, AppError> {
        let updated = sqlx::query_as::<_, PaymentSetting>(
            r#"
            UPDATE payment_settings
            SET setting_key = $1, setting_value = $2, currency = $3, status = $4,
                updated_at = GREATEST($5, created_at)
            WHERE id = $6
            RETURNING id, setting_key, setting_value, currency, status, created_at, updated_at
            "#,
        )
        .bind(&changes.setting_key)
        .bind(&changes.setting_value)
        .bind(&changes.currency)
        .bind(&changes.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate_error(e, ENTITY))?;

        updated.ok_or_else(|| AppError::NotFound(format!("{} not found", ENTITY)))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM payment_settings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| translate_error(e, ENTITY))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} not found", ENTITY)));
        }
        Ok(())
    }
}
