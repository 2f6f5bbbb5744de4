//! Payment domain entity.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::Identified;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Payment {
    pub id: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Payment {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields supplied by the caller on create. Id and timestamps are stamped by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub amount: BigDecimal,
    pub currency: String,
    pub status: String,
}

impl NewPayment {
    pub fn new(amount: BigDecimal, currency: String, status: Option<String>) -> Self {
        Self {
            amount,
            currency,
            status: status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| STATUS_PENDING.to_string()),
        }
    }
}

/// Mutable fields replaced by an update.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentChanges {
    pub amount: BigDecimal,
    pub currency: String,
    pub status: String,
}

/// Equality filters for payment listing. `None` means "not applied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub currency: Option<String>,
    pub status: Option<String>,
}

impl PaymentFilter {
    pub fn matches(&self, p: &Payment) -> bool {
        self.currency.as_deref().map_or(true, |c| c == p.currency)
            && self.status.as_deref().map_or(true, |s| s == p.status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFetchParams {
    pub filter: PaymentFilter,
    pub cursor: Option<String>,
    pub limit: i64,
}
