use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        cart::{
            AddToCartRequest, AddToCartResponse, CartView, CheckoutRequest, UpdateQuantityRequest,
        },
        orders::OrderWithItems,
    },
    error::AppResult,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{cart_key}", get(get_cart).delete(clear_cart))
        .route("/{cart_key}/items", post(add_to_cart))
        .route(
            "/{cart_key}/items/{line_id}",
            patch(update_quantity).delete(remove_from_cart),
        )
        .route("/{cart_key}/checkout", post(checkout))
}

#[utoipa::path(
    get,
    path = "/api/carts/{cart_key}",
    params(
        ("cart_key" = String, Path, description = "Client-generated cart key")
    ),
    responses(
        (status = 200, description = "Cart lines with totals", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_key): Path<String>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::get_cart(&state, &cart_key).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/carts/{cart_key}/items",
    params(
        ("cart_key" = String, Path, description = "Client-generated cart key")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "New cart line", body = ApiResponse<AddToCartResponse>),
        (status = 400, description = "Invalid quantity or unavailable item"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(cart_key): Path<String>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<AddToCartResponse>>> {
    let resp = cart_service::add_to_cart(&state, &cart_key, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/carts/{cart_key}/items/{line_id}",
    params(
        ("cart_key" = String, Path, description = "Client-generated cart key"),
        ("line_id" = Uuid, Path, description = "Cart line ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated; zero or less removes the line",
            body = ApiResponse<CartView>),
        (status = 400, description = "Quantity above the per-line limit"),
    ),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path((cart_key, line_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::update_quantity(&state, &cart_key, line_id, payload.quantity).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{cart_key}/items/{line_id}",
    params(
        ("cart_key" = String, Path, description = "Client-generated cart key"),
        ("line_id" = Uuid, Path, description = "Cart line ID")
    ),
    responses(
        (status = 200, description = "Line removed if present", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path((cart_key, line_id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::remove_from_cart(&state, &cart_key, line_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/carts/{cart_key}",
    params(
        ("cart_key" = String, Path, description = "Client-generated cart key")
    ),
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Path(cart_key): Path<String>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::clear_cart(&state, &cart_key).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/carts/{cart_key}/checkout",
    params(
        ("cart_key" = String, Path, description = "Client-generated cart key")
    ),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order created and cart cleared",
            body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Cart is empty"),
        (status = 500, description = "Order could not be stored; cart kept"),
    ),
    tag = "Cart"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Path(cart_key): Path<String>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = cart_service::checkout(&state, &cart_key, payload).await?;
    Ok(Json(resp))
}
