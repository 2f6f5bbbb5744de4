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
    CreatePaymentRequest, ErrorResponse, ListPaymentsQuery, PaymentResponse, UpdatePaymentRequest,
};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_payment).get(list_payments))
        .route(
            "/payments/:id",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
}

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created", body = PaymentResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 408, description = "Settings lookup or store timed out", body = ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let payment = state.payments.create(body.into()).await?;
    tracing::info!(payment_id = %payment.id, currency = %payment.currency, "Payment created");
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment found", body = PaymentResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, AppError> {
    let payment = state.payments.get(&id).await?;
    Ok(Json(payment.into()))
}

/// List payments newest first. The next page token comes back in `X-Next-Cursor`.
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(ListPaymentsQuery),
    responses(
        (status = 200, description = "One page of payments", body = [PaymentResponse],
            headers(("x-next-cursor" = String, description = "Absent on the last page"))),
        (status = 400, description = "Malformed query or cursor", body = ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    query: Result<Query<ListPaymentsQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let page = state.payments.fetch(query.into()).await?;
    let items: Vec<PaymentResponse> = page.items.into_iter().map(Into::into).collect();
    Ok(page_response(items, page.next_cursor))
}

#[utoipa::path(
    put,
    path = "/api/v1/payments/{id}",
    params(("id" = String, Path, description = "Payment ID")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment updated", body = PaymentResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentResponse>, AppError> {
    let Json(body) = payload?;
    let payment = state.payments.update(&id, body.into()).await?;
    Ok(Json(payment.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/payments/{id}",
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.payments.delete(&id).await?;
    tracing::info!(payment_id = %id, "Payment deleted");
    Ok(StatusCode::NO_CONTENT)
}
