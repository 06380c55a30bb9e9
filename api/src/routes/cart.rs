//! Cart endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::AuthUser,
    error::ApiError,
    services::commerce::{self, CartView},
    AppState,
};

/// GET /cart
pub async fn view(State(state): State<AppState>, user: AuthUser) -> Result<Json<CartView>, ApiError> {
    Ok(Json(commerce::cart_view(state.repo.as_ref(), &user).await?))
}

/// DELETE /cart
pub async fn clear(State(state): State<AppState>, user: AuthUser) -> Result<Json<CartView>, ApiError> {
    Ok(Json(commerce::clear_cart(state.repo.as_ref(), &user).await?))
}

/// POST /cart/items/:course_id
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<i64>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(commerce::add_to_cart(state.repo.as_ref(), &user, course_id).await?))
}

/// DELETE /cart/items/:item_id
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<i64>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(commerce::remove_from_cart(state.repo.as_ref(), &user, item_id).await?))
}
