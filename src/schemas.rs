//! Wire shapes for the HTTP API. Field names are camelCase on the wire.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    NewPayment, NewPaymentSetting, Payment, PaymentChanges, PaymentFetchParams, PaymentFilter,
    PaymentSetting, PaymentSettingChanges, PaymentSettingFetchParams, PaymentSettingFilter,
};

/// Query strings like `?currency=` arrive as `Some("")`; treat them as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[schema(value_type = String, example = "100.50")]
    pub amount: BigDecimal,
    #[schema(example = "USD")]
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<CreatePaymentRequest> for NewPayment {
    fn from(req: CreatePaymentRequest) -> Self {
        NewPayment::new(req.amount, req.currency, req.status)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    #[schema(value_type = String, example = "100.50")]
    pub amount: BigDecimal,
    pub currency: String,
    pub status: String,
}

impl From<UpdatePaymentRequest> for PaymentChanges {
    fn from(req: UpdatePaymentRequest) -> Self {
        PaymentChanges {
            amount: req.amount,
            currency: req.currency,
            status: req.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: String,
    #[schema(value_type = String)]
    pub amount: BigDecimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            amount: p.amount,
            currency: p.currency,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPaymentsQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<String>,
    /// Opaque token from a previous response's `X-Next-Cursor` header.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

impl From<ListPaymentsQuery> for PaymentFetchParams {
    fn from(q: ListPaymentsQuery) -> Self {
        PaymentFetchParams {
            filter: PaymentFilter {
                currency: q.currency,
                status: q.status,
            },
            cursor: q.cursor,
            limit: q.limit.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentSettingRequest {
    #[schema(example = "max_amount")]
    pub setting_key: String,
    #[schema(example = "10000")]
    pub setting_value: String,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<CreatePaymentSettingRequest> for NewPaymentSetting {
    fn from(req: CreatePaymentSettingRequest) -> Self {
        NewPaymentSetting::new(req.setting_key, req.setting_value, req.currency, req.status)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentSettingRequest {
    pub setting_key: String,
    pub setting_value: String,
    pub currency: String,
    pub status: String,
}

impl From<UpdatePaymentSettingRequest> for PaymentSettingChanges {
    fn from(req: UpdatePaymentSettingRequest) -> Self {
        PaymentSettingChanges {
            setting_key: req.setting_key,
            setting_value: req.setting_value,
            currency: req.currency,
            status: req.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettingResponse {
    pub id: String,
    pub setting_key: String,
    pub setting_value: String,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentSetting> for PaymentSettingResponse {
    fn from(s: PaymentSetting) -> Self {
        Self {
            id: s.id,
            setting_key: s.setting_key,
            setting_value: s.setting_value,
            currency: s.currency,
            status: s.status,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPaymentSettingsQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub setting_key: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

impl From<ListPaymentSettingsQuery> for PaymentSettingFetchParams {
    fn from(q: ListPaymentSettingsQuery) -> Self {
        PaymentSettingFetchParams {
            filter: PaymentSettingFilter {
                currency: q.currency,
                setting_key: q.setting_key,
                status: q.status,
            },
            cursor: q.cursor,
            limit: q.limit.unwrap_or(0),
        }
    }
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "DATA_NOT_FOUND")]
    pub code: String,
    pub message: String,
}
