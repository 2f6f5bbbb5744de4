//! Framework-agnostic entities shared by stores, services and handlers.

pub mod payment;
pub mod payment_setting;

pub use payment::{NewPayment, Payment, PaymentChanges, PaymentFetchParams, PaymentFilter};
pub use payment_setting::{
    NewPaymentSetting, PaymentSetting, PaymentSettingChanges, PaymentSettingFetchParams,
    PaymentSettingFilter,
};

/// Records whose id doubles as their pagination position.
pub trait Identified {
    fn id(&self) -> &str;
}

/// One page of a cursor-paginated listing. `next_cursor` is `None` on the last page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

