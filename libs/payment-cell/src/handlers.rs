use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};

use shared_models::appointment::Appointment;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest};
use crate::services::orchestrator::PaymentService;
use crate::PaymentCellState;

/// POST /payments/create-order
pub async fn create_order(
    State(state): State<PaymentCellState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    require_role(&user, Role::Patient)?;

    let service = PaymentService::new(&state);
    let response = service
        .create_order(request.appointment_id, &user, auth.token())
        .await?;

    Ok(Json(response))
}

/// POST /payments/verify-payment
pub async fn verify_payment(
    State(state): State<PaymentCellState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<Appointment>, AppError> {
    require_role(&user, Role::Patient)?;

    let service = PaymentService::new(&state);
    let appointment = service
        .verify_payment(&request, &user, auth.token())
        .await?;

    Ok(Json(appointment))
}
