use axum::{
    Json, Router,
    extract::{Path, State},
    routing::patch,
};
use uuid::Uuid;

use crate::{
    dto::{
        inventory::{InventoryAdjustRequest, StockView},
        orders::{OrderView, UpdateOrderStatusRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::{inventory_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/inventory/{id}", patch(adjust_inventory))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order moved to the requested status", body = ApiResponse<OrderView>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Transition not allowed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let order = order_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Order updated",
        order,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/inventory/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = InventoryAdjustRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<StockView>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Adjustment would drive stock negative"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InventoryAdjustRequest>,
) -> AppResult<Json<ApiResponse<StockView>>> {
    let stock = inventory_service::adjust_inventory(&state, &user, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Inventory updated",
        stock,
        Some(Meta::empty()),
    )))
}
