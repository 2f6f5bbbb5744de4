//! In-memory store adapters backed by ordered maps.
//!
//! They honour the same contract as the PostgreSQL stores (id ordering, strict
//! cursor bound, NotFound on missing rows) and are used for local wiring and tests.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    NewPayment, NewPaymentSetting, Payment, PaymentChanges, PaymentFilter, PaymentSetting,
    PaymentSettingChanges, PaymentSettingFilter,
};
use crate::error::AppError;
use crate::services::ports::{PaymentSettingStore, PaymentStore};
use crate::utils::id::{generate_pk, PAYMENT_PREFIX, PAYMENT_SETTING_PREFIX};

/// Newest-first scan of `rows` strictly below `before_id`.
fn scan_desc<'a, T: Clone + 'a>(
    rows: &'a BTreeMap<String, T>,
    before_id: Option<&str>,
    limit: i64,
    keep: impl Fn(&T) -> bool,
) -> Vec<T> {
    let upper = match before_id {
        Some(id) => Bound::Excluded(id.to_string()),
        None => Bound::Unbounded,
    };
    let take = usize::try_from(limit).unwrap_or(0);
    rows.range((Bound::Unbounded, upper))
        .rev()
        .map(|(_, row)| row)
        .filter(|row| keep(*row))
        .take(take)
        .cloned()
        .collect()
}

#[derive(Default)]
pub struct MemoryPaymentStore {
    rows: RwLock<BTreeMap<String, Payment>>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn create(&self, new: NewPayment) -> Result<Payment, AppError> {
        let now = Utc::now();
        let payment = Payment {
            id: generate_pk(PAYMENT_PREFIX),
            amount: new.amount,
            currency: new.currency,
            status: new.status,
            created_at: now,
            updated_at: now,
        };

        let mut rows = self.rows.write().await;
        if rows.contains_key(&payment.id) {
            return Err(AppError::DuplicateKey(format!("payment {} already exists", payment.id)));
        }
        rows.insert(payment.id.clone(), payment.clone());
        Ok(payment)
    }

    async fn get(&self, id: &str) -> Result<Payment, AppError> {
        self.rows
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("payment not found".to_string()))
    }

    async fn range_query(
        &self,
        filter: &PaymentFilter,
        before_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Payment>, AppError> {
        let rows = self.rows.read().await;
        Ok(scan_desc(&rows, before_id, limit, |p| filter.matches(p)))
    }

    async fn update(&self, id: &str, changes: PaymentChanges) -> Result<Payment, AppError> {
        let mut rows = self.rows.write().await;
        let payment = rows
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("payment not found".to_string()))?;
        payment.amount = changes.amount;
        payment.currency = changes.currency;
        payment.status = changes.status;
        payment.updated_at = Utc::now().max(payment.created_at);
        Ok(payment.clone())
    }

    async fn transition_status(
        &self,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<Option<Payment>, AppError> {
        let mut rows = self.rows.write().await;
        let Some(payment) = rows.get_mut(id).filter(|p| p.status == from) else {
            return Ok(None);
        };
        payment.status = to.to_string();
        payment.updated_at = Utc::now().max(payment.created_at);
        Ok(Some(payment.clone()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.rows
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("payment not found".to_string()))
    }
}

#[derive(Default)]
pub struct MemoryPaymentSettingStore {
    rows: RwLock<BTreeMap<String, PaymentSetting>>,
}

impl MemoryPaymentSettingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentSettingStore for MemoryPaymentSettingStore {
    async fn create(&self, new: NewPaymentSetting) -> Result<PaymentSetting, AppError> {
        let now = Utc::now();
        let setting = PaymentSetting {
            id: generate_pk(PAYMENT_SETTING_PREFIX),
            setting_key: new.setting_key,
            setting_value: new.setting_value,
            currency: new.currency,
            status: new.status,
            created_at: now,
            updated_at: now,
        };

        let mut rows = self.rows.write().await;
        if rows.contains_key(&setting.id) {
            return Err(AppError::DuplicateKey(format!(
                "payment setting {} already exists",
                setting.id
            )));
        }
        rows.insert(setting.id.clone(), setting.clone());
        Ok(setting)
    }

    async fn get(&self, id: &str) -> Result<PaymentSetting, AppError> {
        self.rows
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("payment setting not found".to_string()))
    }

    async fn range_query(
        &self,
        filter: &PaymentSettingFilter,
        before_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<PaymentSetting>, AppError> {
        let rows = self.rows.read().await;
        Ok(scan_desc(&rows, before_id, limit, |s| filter.matches(s)))
    }

    async fn update(
        &self,
        id: &str,
        changes: PaymentSettingChanges,
    ) -> Result<PaymentSetting, AppError> {
        let mut rows = self.rows.write().await;
        let setting = rows
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("payment setting not found".to_string()))?;
        setting.setting_key = changes.setting_key;
        setting.setting_value = changes.setting_value;
        setting.currency = changes.currency;
        setting.status = changes.status;
        setting.updated_at = Utc::now().max(setting.created_at);
        Ok(setting.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.rows
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("payment setting not found".to_string()))
    }
}
