//! Scheduled batch job that advances pending payments.
//!
//! One run fetches a single page of pending payments, moves each one along the
//! transition table and keeps going when an item fails. Failed items stay
//! pending and are picked up by the next run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::payment::{STATUS_PENDING, STATUS_PROCESSING};
use crate::domain::{PaymentFetchParams, PaymentFilter};
use crate::error::AppError;
use crate::services::payment::PaymentService;

pub const DEFAULT_BATCH_SIZE: i64 = 50;

/// Status edges the batch job is allowed to take: (from, to).
const BATCH_TRANSITIONS: &[(&str, &str)] = &[(STATUS_PENDING, STATUS_PROCESSING)];

pub fn next_status(current: &str) -> Option<&'static str> {
    BATCH_TRANSITIONS
        .iter()
        .find(|(from, _)| *from == current)
        .map(|(_, to)| *to)
}

#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    pub batch_size: i64,
    pub dry_run: bool,
}

impl UpdaterConfig {
    pub fn new(batch_size: i64, dry_run: bool) -> Self {
        Self {
            batch_size: if batch_size <= 0 { DEFAULT_BATCH_SIZE } else { batch_size },
            dry_run,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub payment_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
    pub dry_run: bool,
    pub processed_count: usize,
    pub success_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub failures: Vec<ItemFailure>,
}

impl ExecutionResult {
    fn started(dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            duration_ms: 0,
            dry_run,
            processed_count: 0,
            success_count: 0,
            skipped_count: 0,
            error_count: 0,
            failures: Vec::new(),
        }
    }

    fn finish(&mut self) {
        self.end_time = Utc::now();
        self.duration_ms = (self.end_time - self.start_time).num_milliseconds();
    }

    pub fn job_status(&self) -> &'static str {
        if self.error_count == 0 {
            "SUCCESS"
        } else {
            "COMPLETED WITH ERRORS"
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdaterError {
    #[error("failed to fetch payments: {0}")]
    Fetch(#[source] AppError),
    #[error("batch completed with {} error(s)", .0.error_count)]
    PartialFailure(ExecutionResult),
}

enum Outcome {
    Updated,
    Skipped,
}

pub struct PaymentUpdater {
    payments: Arc<PaymentService>,
    config: UpdaterConfig,
}

impl PaymentUpdater {
    pub fn new(payments: Arc<PaymentService>, config: UpdaterConfig) -> Self {
        Self { payments, config }
    }

    pub async fn execute(&self) -> Result<ExecutionResult, UpdaterError> {
        let mut result = ExecutionResult::started(self.config.dry_run);
        info!(
            batch_size = self.config.batch_size,
            dry_run = self.config.dry_run,
            "Payment update job started"
        );

        let page = self
            .payments
            .fetch_batch(PaymentFetchParams {
                filter: PaymentFilter {
                    status: Some(STATUS_PENDING.to_string()),
                    currency: None,
                },
                cursor: None,
                limit: self.config.batch_size,
            })
            .await
            .map_err(UpdaterError::Fetch)?;

        let total = page.items.len();
        info!(found = total, "Pending payments fetched");

        let cap = usize::try_from(self.config.batch_size).unwrap_or(0);
        for (i, payment) in page.items.into_iter().take(cap).enumerate() {
            result.processed_count += 1;
            info!(
                item = i + 1,
                total,
                payment_id = %payment.id,
                status = %payment.status,
                amount = %payment.amount,
                currency = %payment.currency,
                "Processing payment"
            );

            match self.process(&payment).await {
                Ok(Outcome::Updated) => result.success_count += 1,
                Ok(Outcome::Skipped) => result.skipped_count += 1,
                Err(e) => {
                    error!(payment_id = %payment.id, error = %e, "Failed to process payment");
                    result.error_count += 1;
                    result.failures.push(ItemFailure {
                        payment_id: payment.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        result.finish();
        info!(
            duration_ms = result.duration_ms,
            processed = result.processed_count,
            succeeded = result.success_count,
            skipped = result.skipped_count,
            errors = result.error_count,
            status = result.job_status(),
            "Payment update job summary"
        );

        if result.error_count > 0 {
            return Err(UpdaterError::PartialFailure(result));
        }
        Ok(result)
    }

    async fn process(&self, payment: &crate::domain::Payment) -> Result<Outcome, AppError> {
        let Some(target) = next_status(&payment.status) else {
            warn!(payment_id = %payment.id, status = %payment.status, "Skipped payment");
            return Ok(Outcome::Skipped);
        };

        if self.config.dry_run {
            info!(payment_id = %payment.id, to = target, "[dry-run] Would update payment");
            return Ok(Outcome::Updated);
        }

        match self
            .payments
            .transition_status(&payment.id, &payment.status, target)
            .await?
        {
            Some(_) => {
                info!(payment_id = %payment.id, to = target, "Updated payment");
                Ok(Outcome::Updated)
            }
            None => {
                warn!(payment_id = %payment.id, "Payment changed since fetch, skipped");
                Ok(Outcome::Skipped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{MemoryPaymentSettingStore, MemoryPaymentStore};
    use crate::domain::{NewPayment, Payment, PaymentChanges};
    use crate::services::payment_settings::PaymentSettingsService;
    use crate::services::ports::PaymentStore;
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use std::collections::HashSet;

    /// Delegates to the memory store but refuses updates for chosen ids.
    struct FlakyStore {
        inner: MemoryPaymentStore,
        fail_ids: tokio::sync::RwLock<HashSet<String>>,
        fail_fetch: bool,
    }

    #[async_trait]
    impl PaymentStore for FlakyStore {
        async fn create(&self, new: NewPayment) -> Result<Payment, AppError> {
            self.inner.create(new).await
        }
        async fn get(&self, id: &str) -> Result<Payment, AppError> {
            self.inner.get(id).await
        }
        async fn range_query(
            &self,
            filter: &PaymentFilter,
            before_id: Option<&str>,
            limit: i64,
        ) -> Result<Vec<Payment>, AppError> {
            if self.fail_fetch {
                return Err(AppError::Unexpected("connection reset".into()));
            }
            self.inner.range_query(filter, before_id, limit).await
        }
        async fn update(&self, id: &str, changes: PaymentChanges) -> Result<Payment, AppError> {
            self.inner.update(id, changes).await
        }
        async fn transition_status(
            &self,
            id: &str,
            from: &str,
            to: &str,
        ) -> Result<Option<Payment>, AppError> {
            if self.fail_ids.read().await.contains(id) {
                return Err(AppError::Timeout("update timed out".into()));
            }
            self.inner.transition_status(id, from, to).await
        }
        async fn delete(&self, id: &str) -> Result<(), AppError> {
            self.inner.delete(id).await
        }
    }

    fn setup(fail_fetch: bool) -> (Arc<FlakyStore>, Arc<PaymentService>) {
        let store = Arc::new(FlakyStore {
            inner: MemoryPaymentStore::new(),
            fail_ids: Default::default(),
            fail_fetch,
        });
        let settings = PaymentSettingsService::new(Arc::new(MemoryPaymentSettingStore::new()));
        let service = Arc::new(PaymentService::new(store.clone(), Arc::new(settings)));
        (store, service)
    }

    async fn seed(service: &PaymentService, statuses: &[&str]) -> Vec<Payment> {
        let mut out = Vec::new();
        for s in statuses {
            out.push(
                service
                    .create(NewPayment::new(BigDecimal::from(10), "USD".into(), Some(s.to_string())))
                    .await
                    .unwrap(),
            );
        }
        out
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(next_status("pending"), Some("processing"));
        assert_eq!(next_status("processing"), None);
        assert_eq!(next_status("completed"), None);
    }

    #[test]
    fn test_default_batch_size() {
        assert_eq!(UpdaterConfig::new(0, false).batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(UpdaterConfig::new(5, true).batch_size, 5);
    }

    #[tokio::test]
    async fn test_execute_moves_pending_to_processing() {
        let (store, service) = setup(false);
        let created = seed(&service, &["pending", "completed", "pending"]).await;

        let updater = PaymentUpdater::new(service, UpdaterConfig::new(10, false));
        let result = updater.execute().await.unwrap();

        assert_eq!(result.processed_count, 2);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.error_count, 0);
        assert_eq!(result.job_status(), "SUCCESS");
        assert_eq!(store.get(&created[0].id).await.unwrap().status, "processing");
        assert_eq!(store.get(&created[1].id).await.unwrap().status, "completed");
        assert_eq!(store.get(&created[2].id).await.unwrap().status, "processing");
    }

    #[tokio::test]
    async fn test_execute_respects_batch_size() {
        let (store, service) = setup(false);
        seed(&service, &["pending"; 5]).await;

        let updater = PaymentUpdater::new(service, UpdaterConfig::new(3, false));
        let result = updater.execute().await.unwrap();
        assert_eq!(result.processed_count, 3);

        let still_pending = store
            .range_query(
                &PaymentFilter { status: Some("pending".into()), currency: None },
                None,
                10,
            )
            .await
            .unwrap();
        assert_eq!(still_pending.len(), 2);
    }

    #[tokio::test]
    async fn test_execute_batch_larger_than_page_cap() {
        let (store, service) = setup(false);
        seed(&service, &["pending"; 150]).await;

        let updater = PaymentUpdater::new(service, UpdaterConfig::new(150, false));
        let result = updater.execute().await.unwrap();
        assert_eq!(result.processed_count, 150);
        assert_eq!(result.success_count, 150);

        let still_pending = store
            .range_query(
                &PaymentFilter { status: Some("pending".into()), currency: None },
                None,
                200,
            )
            .await
            .unwrap();
        assert!(still_pending.is_empty());
    }

    #[tokio::test]
    async fn test_transition_status_only_touches_status() {
        let (store, service) = setup(false);
        let created = seed(&service, &["pending"]).await;
        let id = created[0].id.clone();

        // An edit that lands after the batch fetched its snapshot.
        store
            .update(
                &id,
                PaymentChanges {
                    amount: BigDecimal::from(99),
                    currency: "EUR".into(),
                    status: "pending".into(),
                },
            )
            .await
            .unwrap();

        let moved = service.transition_status(&id, "pending", "processing").await.unwrap();
        let moved = moved.expect("pending payment should move");
        assert_eq!(moved.status, "processing");
        assert_eq!(moved.amount, BigDecimal::from(99));
        assert_eq!(moved.currency, "EUR");

        // Already moved on: a second transition is a no-op.
        assert!(service
            .transition_status(&id, "pending", "processing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_execute_skips_payment_moved_by_someone_else() {
        let (store, service) = setup(false);
        let created = seed(&service, &["pending"]).await;
        store
            .inner
            .transition_status(&created[0].id, "pending", "completed")
            .await
            .unwrap();

        // Snapshot still says pending; the conditional transition must not apply.
        let updater = PaymentUpdater::new(service, UpdaterConfig::new(10, false));
        let outcome = updater.process(&created[0]).await.unwrap();
        assert!(matches!(outcome, Outcome::Skipped));
        assert_eq!(store.get(&created[0].id).await.unwrap().status, "completed");
    }

    #[tokio::test]
    async fn test_execute_dry_run_does_not_mutate() {
        let (store, service) = setup(false);
        let created = seed(&service, &["pending", "pending"]).await;

        let updater = PaymentUpdater::new(service, UpdaterConfig::new(10, true));
        let result = updater.execute().await.unwrap();

        assert!(result.dry_run);
        assert_eq!(result.success_count, 2);
        for p in created {
            assert_eq!(store.get(&p.id).await.unwrap().status, "pending");
        }
    }

    #[tokio::test]
    async fn test_execute_partial_failure() {
        let (store, service) = setup(false);
        let created = seed(&service, &["pending"; 4]).await;
        {
            let mut fail = store.fail_ids.write().await;
            fail.insert(created[1].id.clone());
            fail.insert(created[3].id.clone());
        }

        let updater = PaymentUpdater::new(service, UpdaterConfig::new(10, false));
        let err = updater.execute().await.unwrap_err();
        let result = match err {
            UpdaterError::PartialFailure(result) => result,
            other => panic!("expected partial failure, got {other:?}"),
        };

        assert_eq!(result.processed_count, 4);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.error_count, 2);
        assert_eq!(result.job_status(), "COMPLETED WITH ERRORS");

        let failed: HashSet<_> = result.failures.iter().map(|f| f.payment_id.clone()).collect();
        assert!(failed.contains(&created[1].id));
        assert!(failed.contains(&created[3].id));
        assert_eq!(store.get(&created[1].id).await.unwrap().status, "pending");
        assert_eq!(store.get(&created[3].id).await.unwrap().status, "pending");
        assert_eq!(store.get(&created[0].id).await.unwrap().status, "processing");
    }

    #[tokio::test]
    async fn test_execute_aborts_when_fetch_fails() {
        let (_store, service) = setup(true);
        let updater = PaymentUpdater::new(service, UpdaterConfig::new(10, false));
        assert!(matches!(updater.execute().await, Err(UpdaterError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_execute_with_nothing_pending() {
        let (_store, service) = setup(false);
        let result = PaymentUpdater::new(service, UpdaterConfig::new(10, false))
            .execute()
            .await
            .unwrap();
        assert_eq!(result.processed_count, 0);
    }
}
