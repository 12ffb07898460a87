use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::menu::{CategoryList, ExtraList, MenuItemList, MenuStats},
    error::AppResult,
    models::MenuItem,
    response::ApiResponse,
    routes::params::MenuQuery,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/menu-items", get(list_menu_items))
        .route("/menu-items/stats", get(menu_stats))
        .route("/menu-items/{id}", get(get_menu_item))
        .route("/extras", get(list_extras))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Active categories in menu order",
            body = ApiResponse<CategoryList>)
    ),
    tag = "Menu"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = menu_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu-items",
    params(
        ("q" = Option<String>, Query, description = "Search name or description"),
        ("category" = Option<String>, Query, description = "Category slug"),
        ("min_price" = Option<String>, Query, description = "Minimum price"),
        ("max_price" = Option<String>, Query, description = "Maximum price"),
        ("is_fasting" = Option<bool>, Query, description = "Fasting dishes only"),
        ("is_available" = Option<bool>, Query, description = "Availability, default true")
    ),
    responses(
        (status = 200, description = "Filtered menu items", body = ApiResponse<MenuItemList>)
    ),
    tag = "Menu"
)]
pub async fn list_menu_items(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = menu_service::list_menu_items(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu-items/stats",
    responses(
        (status = 200, description = "Item count, price range and fasting count",
            body = ApiResponse<MenuStats>)
    ),
    tag = "Menu"
)]
pub async fn menu_stats(State(state): State<AppState>) -> AppResult<Json<ApiResponse<MenuStats>>> {
    let resp = menu_service::menu_stats(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu-items/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "Menu item", body = ApiResponse<MenuItem>),
        (status = 404, description = "Menu item not found"),
    ),
    tag = "Menu"
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::get_menu_item(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/extras",
    responses(
        (status = 200, description = "Active extras", body = ApiResponse<ExtraList>)
    ),
    tag = "Menu"
)]
pub async fn list_extras(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ExtraList>>> {
    let resp = menu_service::list_extras(&state).await?;
    Ok(Json(resp))
}
