//! Outbound ports. Services depend on these traits, never on a concrete store,
//! and the composition root picks the adapter (PostgreSQL or in-memory).

use async_trait::async_trait;

use crate::domain::{
    NewPayment, NewPaymentSetting, Page, Payment, PaymentChanges, PaymentFilter, PaymentSetting,
    PaymentSettingChanges, PaymentSettingFetchParams, PaymentSettingFilter,
};
use crate::error::AppError;

/// Persistence for payments.
///
/// `range_query` returns rows with `id < before_id` (when given) that match every
/// filter field that is set, ordered by id descending, at most `limit` rows.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, new: NewPayment) -> Result<Payment, AppError>;
    async fn get(&self, id: &str) -> Result<Payment, AppError>;
    async fn range_query(
        &self,
        filter: &PaymentFilter,
        before_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Payment>, AppError>;
    async fn update(&self, id: &str, changes: PaymentChanges) -> Result<Payment, AppError>;
    /// Moves `id` from status `from` to `to` and touches nothing else.
    /// `Ok(None)` when the row is gone or no longer in `from`.
    async fn transition_status(
        &self,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<Option<Payment>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Persistence for payment settings. Same contract as [`PaymentStore`].
#[async_trait]
pub trait PaymentSettingStore: Send + Sync {
    async fn create(&self, new: NewPaymentSetting) -> Result<PaymentSetting, AppError>;
    async fn get(&self, id: &str) -> Result<PaymentSetting, AppError>;
    async fn range_query(
        &self,
        filter: &PaymentSettingFilter,
        before_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<PaymentSetting>, AppError>;
    async fn update(
        &self,
        id: &str,
        changes: PaymentSettingChanges,
    ) -> Result<PaymentSetting, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// What the payment module needs from the payment-settings module, and nothing more.
#[async_trait]
pub trait PaymentSettingsPort: Send + Sync {
    async fn fetch_payment_settings(
        &self,
        params: PaymentSettingFetchParams,
    ) -> Result<Page<PaymentSetting>, AppError>;
}
