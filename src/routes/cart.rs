use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, UpdateCartItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_to_cart))
        .route("/items/{id}", put(update_cart_item).delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Current cart with totals", body = ApiResponse<CartView>),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = cart_service::get_cart(&state, &user).await?;
    Ok(Json(ApiResponse::success(
        "Cart retrieved successfully",
        cart,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Item added, full cart returned", body = ApiResponse<CartView>),
        (status = 404, description = "Product not found or inactive"),
        (status = 409, description = "Insufficient stock"),
        (status = 422, description = "Invalid quantity"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = cart_service::add_to_cart(&state, &user, payload).await?;
    Ok(Json(ApiResponse::success(
        "Item added to cart successfully",
        cart,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity replaced, full cart returned", body = ApiResponse<CartView>),
        (status = 404, description = "Cart item not found"),
        (status = 409, description = "Insufficient stock"),
        (status = 422, description = "Invalid quantity"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = cart_service::update_cart_item(&state, &user, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Cart item updated successfully",
        cart,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    cart_service::remove_from_cart(&state, &user, id).await?;
    Ok(Json(ApiResponse::success(
        "Item removed from cart successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
