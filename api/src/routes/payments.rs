//! Payment Endpoints
//!
//! # Flow
//!
//! ```text
//! POST /payments/checkout  → merchant_uid + 금액 (결제창 호출용)
//!        (클라이언트가 PortOne 결제창에서 결제)
//! POST /payments/validate  → 결제사 조회로 금액 / 상태 검증 → 수강 등록
//! ```

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::{
    auth::AuthUser,
    db::Payment,
    error::ApiError,
    services::commerce::{self, CheckoutOrder, PaymentValidation},
    AppState,
};

/// POST /payments/checkout
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CheckoutOrder>, ApiError> {
    Ok(Json(commerce::checkout(state.repo.as_ref(), &user, Utc::now()).await?))
}

/// POST /payments/validate
///
/// ```json
/// { "imp_uid": "imp_123", "merchant_uid": "ORD-20250301-...", "amount": 80000 }
/// ```
pub async fn validate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<PaymentValidation>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments =
        commerce::validate_payment(state.repo.as_ref(), state.gateway.as_ref(), &user, &req).await?;
    Ok(Json(payments))
}

/// GET /payments
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Payment>>, ApiError> {
    Ok(Json(commerce::payment_history(state.repo.as_ref(), &user).await?))
}

/// GET /payments/:id
pub async fn detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(payment_id): Path<i64>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(commerce::payment_detail(state.repo.as_ref(), &user, payment_id).await?))
}
