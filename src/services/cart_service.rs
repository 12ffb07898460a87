use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart::{CartExtra, CartSession, PgSnapshotStore},
    dto::{
        cart::{AddToCartRequest, AddToCartResponse, CartView, CheckoutRequest},
        orders::{CreateOrderRequest, OrderWithItems},
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    services::{
        menu_service::{find_active_extras, find_orderable_item},
        order_service,
    },
    state::AppState,
};

async fn open_session(state: &AppState, cart_key: &str) -> AppResult<CartSession<PgSnapshotStore>> {
    let cart_key = cart_key.trim();
    if cart_key.is_empty() || cart_key.len() > 128 {
        return Err(AppError::BadRequest("invalid cart key".to_string()));
    }
    Ok(CartSession::restore(PgSnapshotStore::new(state.pool.clone()), cart_key).await)
}

pub async fn get_cart(state: &AppState, cart_key: &str) -> AppResult<ApiResponse<CartView>> {
    let session = open_session(state, cart_key).await?;
    Ok(ApiResponse::success(
        "OK",
        CartView::from(session.state()),
        Some(Meta::empty()),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    cart_key: &str,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<AddToCartResponse>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let menu_item = find_orderable_item(&state.orm, payload.menu_item_id).await?;
    let extra_ids: Vec<Uuid> = payload.extras.iter().map(|e| e.extra_id).collect();
    let extras = find_active_extras(&state.orm, &extra_ids).await?;
    let selected_extras = extras
        .into_iter()
        .zip(payload.extras.iter())
        .map(|(extra, requested)| CartExtra {
            extra,
            quantity: requested.quantity,
        })
        .collect();

    let mut session = open_session(state, cart_key).await?;
    let line_id = session
        .add_item(menu_item, payload.quantity, selected_extras)
        .await?;

    tracing::debug!(cart_key, %line_id, "cart line added");

    Ok(ApiResponse::success(
        "Added to cart",
        AddToCartResponse {
            line_id,
            cart: CartView::from(session.state()),
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_quantity(
    state: &AppState,
    cart_key: &str,
    line_id: Uuid,
    quantity: i32,
) -> AppResult<ApiResponse<CartView>> {
    let mut session = open_session(state, cart_key).await?;
    session.update_quantity(line_id, quantity).await?;
    Ok(ApiResponse::success(
        "OK",
        CartView::from(session.state()),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    cart_key: &str,
    line_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let mut session = open_session(state, cart_key).await?;
    session.remove_item(line_id).await;
    Ok(ApiResponse::success(
        "Removed from cart",
        CartView::from(session.state()),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, cart_key: &str) -> AppResult<ApiResponse<CartView>> {
    let mut session = open_session(state, cart_key).await?;
    session.clear_cart().await;
    Ok(ApiResponse::success(
        "Cart cleared",
        CartView::from(session.state()),
        Some(Meta::empty()),
    ))
}

/// Turn the current cart into an order. The cart is only emptied once the
/// order is stored, so a failed checkout can simply be retried.
pub async fn checkout(
    state: &AppState,
    cart_key: &str,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let mut session = open_session(state, cart_key).await?;
    if session.state().is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let request = CreateOrderRequest {
        customer_name: payload.customer_name,
        customer_phone: payload.customer_phone,
        order_type: payload.order_type,
        items: session.state().lines.clone(),
        notes: payload.notes,
    };

    let created = match order_service::place_order(state, request).await {
        Ok(created) => created,
        Err(err) => {
            tracing::warn!(error = %err, cart_key, "checkout failed, cart kept");
            return Err(err);
        }
    };

    session.clear_cart().await;

    let order_id = created.data.as_ref().map(|data| data.order.id);
    if let Err(err) = log_audit(
        &state.pool,
        None,
        "cart_checkout",
        Some("cart_snapshots"),
        Some(serde_json::json!({ "cart_key": cart_key, "order_id": order_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(created)
}
