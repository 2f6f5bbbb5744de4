use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::error::AppError;
use crate::handlers::page_response;
use crate::schemas::{
    CreatePaymentSettingRequest, ErrorResponse, ListPaymentSettingsQuery, PaymentSettingResponse,
    UpdatePaymentSettingRequest,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/payment-settings",
            post(create_payment_setting).get(list_payment_settings),
        )
        .route(
            "/payment-settings/:id",
            get(get_payment_setting)
                .put(update_payment_setting)
                .delete(delete_payment_setting),
        )
}

#[utoipa::path(
    post,
    path = "/api/v1/payment-settings",
    request_body = CreatePaymentSettingRequest,
    responses(
        (status = 201, description = "Setting created", body = PaymentSettingResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse)
    ),
    tag = "PaymentSettings"
)]
pub async fn create_payment_setting(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentSettingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let setting = state.payment_settings.create(body.into()).await?;
    tracing::info!(
        setting_id = %setting.id,
        setting_key = %setting.setting_key,
        currency = %setting.currency,
        "Payment setting created"
    );
    Ok((StatusCode::CREATED, Json(PaymentSettingResponse::from(setting))))
}

#[utoipa::path(
    get,
    path = "/api/v1/payment-settings/{id}",
    params(("id" = String, Path, description = "Payment setting ID")),
    responses(
        (status = 200, description = "Setting found", body = PaymentSettingResponse),
        (status = 404, description = "Setting not found", body = ErrorResponse)
    ),
    tag = "PaymentSettings"
)]
pub async fn get_payment_setting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentSettingResponse>, AppError> {
    let setting = state.payment_settings.get(&id).await?;
    Ok(Json(setting.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/payment-settings",
    params(ListPaymentSettingsQuery),
    responses(
        (status = 200, description = "One page of settings", body = [PaymentSettingResponse],
            headers(("x-next-cursor" = String, description = "Absent on the last page"))),
        (status = 400, description = "Malformed query or cursor", body = ErrorResponse)
    ),
    tag = "PaymentSettings"
)]
pub async fn list_payment_settings(
    State(state): State<AppState>,
    query: Result<Query<ListPaymentSettingsQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let page = state.payment_settings.fetch(query.into()).await?;
    let items: Vec<PaymentSettingResponse> = page.items.into_iter().map(Into::into).collect();
    Ok(page_response(items, page.next_cursor))
}

#[utoipa::path(
    put,
    path = "/api/v1/payment-settings/{id}",
    params(("id" = String, Path, description = "Payment setting ID")),
    request_body = UpdatePaymentSettingRequest,
    responses(
        (status = 200, description = "Setting updated", body = PaymentSettingResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Setting not found", body = ErrorResponse)
    ),
    tag = "PaymentSettings"
)]
pub async fn update_payment_setting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePaymentSettingRequest>, JsonRejection>,
) -> Result<Json<PaymentSettingResponse>, AppError> {
    let Json(body) = payload?;
    let setting = state.payment_settings.update(&id, body.into()).await?;
    Ok(Json(setting.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/payment-settings/{id}",
    params(("id" = String, Path, description = "Payment setting ID")),
    responses(
        (status = 204, description = "Setting deleted"),
        (status = 404, description = "Setting not found", body = ErrorResponse)
    ),
    tag = "PaymentSettings"
)]
pub async fn delete_payment_setting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.payment_settings.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
