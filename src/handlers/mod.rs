pub mod payment_settings;
pub mod payments;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::OpenApi;

use crate::health::HealthResponse;
use crate::AppState;

pub const NEXT_CURSOR_HEADER: &str = "x-next-cursor";

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        payments::create_payment,
        payments::get_payment,
        payments::list_payments,
        payments::update_payment,
        payments::delete_payment,
        payment_settings::create_payment_setting,
        payment_settings::get_payment_setting,
        payment_settings::list_payment_settings,
        payment_settings::update_payment_setting,
        payment_settings::delete_payment_setting,
    ),
    components(schemas(
        crate::health::HealthResponse,
        crate::health::DependencyStatus,
        crate::schemas::CreatePaymentRequest,
        crate::schemas::UpdatePaymentRequest,
        crate::schemas::PaymentResponse,
        crate::schemas::CreatePaymentSettingRequest,
        crate::schemas::UpdatePaymentSettingRequest,
        crate::schemas::PaymentSettingResponse,
        crate::schemas::ErrorResponse,
    )),
    info(
        title = "Payment API",
        version = "0.1.0",
        description = "Payments and payment settings with cursor pagination"
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Payments", description = "Payment records"),
        (name = "PaymentSettings", description = "Per-currency payment settings"),
    )
)]
pub struct ApiDoc;

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "All dependencies healthy", body = HealthResponse),
        (status = 503, description = "A dependency is unhealthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = state.health.check_all().await;

    let status_code = match response.status.as_str() {
        "healthy" => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// JSON array of `items`, with `X-Next-Cursor` set when another page exists.
pub(crate) fn page_response<T: Serialize>(items: Vec<T>, next_cursor: Option<String>) -> Response {
    let mut response = Json(items).into_response();
    if let Some(value) = next_cursor.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().insert(NEXT_CURSOR_HEADER, value);
    }
    response
}
