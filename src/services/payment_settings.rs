use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    NewPaymentSetting, Page, PaymentSetting, PaymentSettingChanges, PaymentSettingFetchParams,
};
use crate::error::AppError;
use crate::services::pagination;
use crate::services::ports::{PaymentSettingStore, PaymentSettingsPort};

/// Payment-settings module core.
pub struct PaymentSettingsService {
    store: Arc<dyn PaymentSettingStore>,
}

impl PaymentSettingsService {
    pub fn new(store: Arc<dyn PaymentSettingStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewPaymentSetting) -> Result<PaymentSetting, AppError> {
        validate(&new.setting_key, &new.currency)?;
        self.store.create(new).await
    }

    pub async fn get(&self, id: &str) -> Result<PaymentSetting, AppError> {
        self.store.get(id).await
    }

    pub async fn fetch(
        &self,
        params: PaymentSettingFetchParams,
    ) -> Result<Page<PaymentSetting>, AppError> {
        let limit = pagination::normalize_limit(params.limit);
        let before_id = pagination::decode_cursor(params.cursor.as_deref())?;
        let rows = self
            .store
            .range_query(&params.filter, before_id.as_deref(), limit + 1)
            .await?;
        Ok(pagination::into_page(rows, limit))
    }

    pub async fn update(
        &self,
        id: &str,
        changes: PaymentSettingChanges,
    ) -> Result<PaymentSetting, AppError> {
        validate(&changes.setting_key, &changes.currency)?;
        self.store.update(id, changes).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(id).await
    }
}

fn validate(setting_key: &str, currency: &str) -> Result<(), AppError> {
    if setting_key.trim().is_empty() {
        return Err(AppError::Validation("settingKey is required".to_string()));
    }
    if currency.trim().is_empty() {
        return Err(AppError::Validation("currency is required".to_string()));
    }
    Ok(())
}

/// Adapter: the settings service satisfies the payment module's port.
#[async_trait]
impl PaymentSettingsPort for PaymentSettingsService {
    async fn fetch_payment_settings(
        &self,
        params: PaymentSettingFetchParams,
    ) -> Result<Page<PaymentSetting>, AppError> {
        self.fetch(params).await
    }
}
