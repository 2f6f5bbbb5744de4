use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::translate_error;
use crate::domain::{NewPayment, Payment, PaymentChanges, PaymentFilter};
use crate::error::AppError;
use crate::services::ports::PaymentStore;
use crate::utils::id::{generate_pk, PAYMENT_PREFIX};

const ENTITY: &str = "payment";

pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn create(&self, new: NewPayment) -> Result<Payment, AppError> {
        let id = generate_pk(PAYMENT_PREFIX);
        let now = Utc::now();

        sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, amount, currency, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $5) RETURNING id, amount, currency, status, created_at, updated_at"
        )
        .bind(&id)
        .bind(&new.amount)
        .bind(&new.currency)
        .bind(&new.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_error(e, ENTITY))
    }

    async fn get(&self, id: &str) -> Result<Payment, AppError> {
        sqlx::query_as::<_, Payment>(
            "SELECT id, amount, currency, status, created_at, updated_at FROM payments WHERE id = $1"
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_error(e, ENTITY))
    }

    async fn range_query(
        &self,
        filter: &PaymentFilter,
        before_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Payment>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, amount, currency, status, created_at, updated_at FROM payments WHERE TRUE",
        );
        if let Some(currency) = &filter.currency {
            query.push(" AND currency = ").push_bind(currency.clone());
        }
        if let Some(status) = &filter.status {
            query.push(" AND status = ").push_bind(status.clone());
        }
        if let Some(before) = before_id {
            query.push(" AND id < ").push_bind(before.to_string());
        }
        query.push(" ORDER BY id DESC LIMIT ").push_bind(limit);

        query
            .build_query_as::<Payment>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| translate_error(e, ENTITY))
    }

    async fn update(&self, id: &str, changes: PaymentChanges) -> Result<Payment, AppError> {
        let updated = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET amount = $1, currency = $2, status = $3, updated_at = GREATEST($4, created_at)
            WHERE id = $5
            RETURNING id, amount, currency, status, created_at, updated_at
            "#,
        )
        .bind(&changes.amount)
        .bind(&changes.currency)
        .bind(&changes.status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate_error(e, ENTITY))?;

        updated.ok_or_else(|| AppError::NotFound(format!("{} not found", ENTITY)))
    }

    async fn transition_status(
        &self,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = $1, updated_at = GREATEST($2, created_at)
            WHERE id = $3 AND status = $4
            RETURNING id, amount, currency, status, created_at, updated_at
            "#,
        )
        .bind(to)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| translate_error(e, ENTITY))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
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
