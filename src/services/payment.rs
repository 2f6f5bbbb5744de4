use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    NewPayment, Page, Payment, PaymentChanges, PaymentFetchParams, PaymentSettingFetchParams,
    PaymentSettingFilter,
};
use crate::error::AppError;
use crate::services::pagination;
use crate::services::ports::{PaymentSettingsPort, PaymentStore};

/// Payment module core. Reads payment settings only through [`PaymentSettingsPort`].
pub struct PaymentService {
    store: Arc<dyn PaymentStore>,
    settings: Arc<dyn PaymentSettingsPort>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn PaymentStore>, settings: Arc<dyn PaymentSettingsPort>) -> Self {
        Self { store, settings }
    }

    /// Creates a payment after consulting the settings for its currency.
    /// A failed settings lookup aborts the creation.
    pub async fn create(&self, new: NewPayment) -> Result<Payment, AppError> {
        if new.currency.trim().is_empty() {
            return Err(AppError::Validation("currency is required".to_string()));
        }

        let settings = self
            .settings
            .fetch_payment_settings(PaymentSettingFetchParams {
                filter: PaymentSettingFilter {
                    currency: Some(new.currency.clone()),
                    ..Default::default()
                },
                cursor: None,
                limit: 1,
            })
            .await?;
        debug!(
            currency = %new.currency,
            settings_found = settings.items.len(),
            "Payment settings consulted"
        );

        self.store.create(new).await
    }

    pub async fn get(&self, id: &str) -> Result<Payment, AppError> {
        self.store.get(id).await
    }

    pub async fn fetch(&self, params: PaymentFetchParams) -> Result<Page<Payment>, AppError> {
        self.fetch_within(params, pagination::MAX_LIMIT).await
    }

    /// Like [`fetch`](Self::fetch) but without the client-facing page cap, for
    /// internal jobs whose batch size is set by the operator.
    pub async fn fetch_batch(&self, params: PaymentFetchParams) -> Result<Page<Payment>, AppError> {
        self.fetch_within(params, i64::MAX - 1).await
    }

    async fn fetch_within(
        &self,
        params: PaymentFetchParams,
        max_limit: i64,
    ) -> Result<Page<Payment>, AppError> {
        let limit = pagination::normalize_limit_within(params.limit, max_limit);
        let before_id = pagination::decode_cursor(params.cursor.as_deref())?;
        let rows = self
            .store
            .range_query(&params.filter, before_id.as_deref(), limit + 1)
            .await?;
        Ok(pagination::into_page(rows, limit))
    }

    pub async fn update(&self, id: &str, changes: PaymentChanges) -> Result<Payment, AppError> {
        if changes.currency.trim().is_empty() {
            return Err(AppError::Validation("currency is required".to_string()));
        }
        self.store.update(id, changes).await
    }

    /// Status-only transition; `None` when the payment is gone or already moved on.
    pub async fn transition_status(
        &self,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<Option<Payment>, AppError> {
        self.store.transition_status(id, from, to).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{MemoryPaymentSettingStore, MemoryPaymentStore};
    use crate::domain::{PaymentFilter, PaymentSetting};
    use crate::services::payment_settings::PaymentSettingsService;
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;

    struct BrokenSettings;

    #[async_trait]
    impl PaymentSettingsPort for BrokenSettings {
        async fn fetch_payment_settings(
            &self,
            _params: PaymentSettingFetchParams,
        ) -> Result<Page<PaymentSetting>, AppError> {
            Err(AppError::Timeout("settings lookup timed out".to_string()))
        }
    }

    fn service() -> PaymentService {
        let settings = PaymentSettingsService::new(Arc::new(MemoryPaymentSettingStore::new()));
        PaymentService::new(Arc::new(MemoryPaymentStore::new()), Arc::new(settings))
    }

    async fn create(svc: &PaymentService, currency: &str) -> Payment {
        svc.create(NewPayment::new(BigDecimal::from(100), currency.to_string(), None))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_filters_by_currency() {
        let svc = service();
        for c in ["USD", "USD", "EUR"] {
            create(&svc, c).await;
        }

        let page = svc
            .fetch(PaymentFetchParams {
                filter: PaymentFilter {
                    currency: Some("USD".into()),
                    status: None,
                },
                cursor: None,
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|p| p.currency == "USD"));
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_fetch_two_pages() {
        let svc = service();
        for c in ["USD", "USD", "EUR"] {
            create(&svc, c).await;
        }

        let first = svc
            .fetch(PaymentFetchParams { limit: 2, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        let cursor = first.next_cursor.clone().expect("expected a next cursor");

        let second = svc
            .fetch(PaymentFetchParams { cursor: Some(cursor), limit: 2, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.next_cursor, None);
        assert!(second.items[0].id < first.items[1].id);
    }

    #[tokio::test]
    async fn test_fetch_empty_store() {
        let page = service().fetch(PaymentFetchParams::default()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_fetch_default_limit() {
        let svc = service();
        for _ in 0..12 {
            create(&svc, "USD").await;
        }
        let page = svc.fetch(PaymentFetchParams { limit: 0, ..Default::default() }).await.unwrap();
        assert_eq!(page.items.len(), pagination::DEFAULT_LIMIT as usize);
        assert!(page.next_cursor.is_some());
    }

    #[tokio::test]
    async fn test_fetch_caps_page_but_fetch_batch_does_not() {
        let svc = service();
        for _ in 0..pagination::MAX_LIMIT + 5 {
            create(&svc, "USD").await;
        }

        let capped = svc.fetch(PaymentFetchParams { limit: 500, ..Default::default() }).await.unwrap();
        assert_eq!(capped.items.len(), pagination::MAX_LIMIT as usize);
        assert!(capped.next_cursor.is_some());

        let batch = svc
            .fetch_batch(PaymentFetchParams { limit: 500, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(batch.items.len(), pagination::MAX_LIMIT as usize + 5);
        assert_eq!(batch.next_cursor, None);
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_cursor() {
        let err = service()
            .fetch(PaymentFetchParams {
                cursor: Some("not-base64!!".into()),
                limit: 5,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_fetch_cursor_past_end() {
        let svc = service();
        create(&svc, "USD").await;
        let page = svc
            .fetch(PaymentFetchParams {
                cursor: Some(crate::utils::cursor::encode("pay-0")),
                limit: 5,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[tokio::test]
    async fn test_create_fails_closed_when_settings_unavailable() {
        let store = Arc::new(MemoryPaymentStore::new());
        let svc = PaymentService::new(store.clone(), Arc::new(BrokenSettings));

        let err = svc
            .create(NewPayment::new(BigDecimal::from(1), "USD".into(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));

        let rows = store.range_query(&PaymentFilter::default(), None, 10).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_currency() {
        let err = service()
            .create(NewPayment::new(BigDecimal::from(1), "  ".into(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_refreshes_timestamp() {
        let svc = service();
        let p = create(&svc, "USD").await;

        let updated = svc
            .update(
                &p.id,
                PaymentChanges {
                    amount: BigDecimal::from(7),
                    currency: "EUR".into(),
                    status: "completed".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, p.id);
        assert_eq!(updated.created_at, p.created_at);
        assert!(updated.updated_at >= updated.created_at);
        assert_eq!(updated.currency, "EUR");
    }

    #[tokio::test]
    async fn test_update_delete_missing_not_found() {
        let svc = service();
        let changes = PaymentChanges {
            amount: BigDecimal::from(1),
            currency: "USD".into(),
            status: "pending".into(),
        };
        assert!(matches!(svc.update("pay-nope", changes).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete("pay-nope").await, Err(AppError::NotFound(_))));
    }
}
