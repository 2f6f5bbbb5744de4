pub mod pagination;
pub mod payment;
pub mod payment_settings;
pub mod payment_updater;
pub mod ports;

pub use payment::PaymentService;
pub use payment_settings::PaymentSettingsService;
pub use payment_updater::{ExecutionResult, PaymentUpdater, UpdaterConfig, UpdaterError};
