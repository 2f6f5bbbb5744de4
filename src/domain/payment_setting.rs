//! Payment setting domain entity: a flexible key/value pair scoped to a currency.

use chrono::{DateTime, Utc};

use super::Identified;

pub const STATUS_ACTIVE: &str = "active";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PaymentSetting {
    pub id: String,
    pub setting_key: String,
    pub setting_value: String,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for PaymentSetting {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentSetting {
    pub setting_key: String,
    pub setting_value: String,
    pub currency: String,
    pub status: String,
}

impl NewPaymentSetting {
    pub fn new(
        setting_key: String,
        setting_value: String,
        currency: String,
        status: Option<String>,
    ) -> Self {
        Self {
            setting_key,
            setting_value,
            currency,
            status: status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| STATUS_ACTIVE.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSettingChanges {
    pub setting_key: String,
    pub setting_value: String,
    pub currency: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentSettingFilter {
    pub currency: Option<String>,
    pub setting_key: Option<String>,
    pub status: Option<String>,
}

impl PaymentSettingFilter {
    pub fn matches(&self, s: &PaymentSetting) -> bool {
        self.currency.as_deref().map_or(true, |c| c == s.currency)
            && self.setting_key.as_deref().map_or(true, |k| k == s.setting_key)
            && self.status.as_deref().map_or(true, |st| st == s.status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentSettingFetchParams {
    pub filter: PaymentSettingFilter,
    pub cursor: Option<String>,
    pub limit: i64,
}
