use std::collections::HashMap;

use anyhow::anyhow;
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart::{CartExtra, CartLine, MAX_CART_LINES, session::validate_selection},
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    entity::{
        extras::Entity as Extras,
        menu_items::Entity as MenuItems,
        order_item_extras::{
            ActiveModel as OrderItemExtraActive, Column as OrderItemExtraCol,
            Entity as OrderItemExtras, Model as OrderItemExtraModel,
        },
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{StaffUser, ensure_staff},
    models::{Extra, MenuItem, Order, OrderItem, OrderItemExtra, OrderStatus, OrderType},
    pricing::{MAX_AMOUNT, TaxBreakdown, line_total, order_gross},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::menu_service::{
        extra_from_entity, find_active_extras, find_orderable_item, menu_item_from_entity,
    },
    state::AppState,
};

/// Order submitted directly with client-built lines. Every menu item and
/// extra is looked up again and priced from the catalog; prices in the
/// request body are ignored.
pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    check_line_count(&payload.items)?;

    let mut items = Vec::with_capacity(payload.items.len());
    for line in payload.items {
        items.push(price_from_catalog(&state.orm, line).await?);
    }

    place_order(state, CreateOrderRequest { items, ..payload }).await
}

/// Persist an order built from server-side cart lines.
///
/// Prices are copied from the lines as they stand now; later catalog changes
/// never touch a stored order. The order, its items and their extras are
/// written in one transaction.
pub(crate) async fn place_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    check_line_count(&payload.items)?;
    for line in &payload.items {
        validate_selection(&line.menu_item, line.quantity, &line.selected_extras)?;
    }
    if order_gross(&payload.items) > MAX_AMOUNT {
        return Err(AppError::BadRequest(format!(
            "order total cannot exceed {MAX_AMOUNT}"
        )));
    }

    let totals = TaxBreakdown::for_order(&payload.items);
    let order_number = generate_order_number();

    let txn = state.orm.begin().await?;

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        order_number: Set(order_number),
        customer_name: Set(non_blank(payload.customer_name)),
        customer_phone: Set(non_blank(payload.customer_phone)),
        order_type: Set(payload.order_type.as_str().to_string()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        subtotal: Set(totals.subtotal),
        tax_amount: Set(totals.tax_amount),
        total_amount: Set(totals.total),
        notes: Set(non_blank(payload.notes)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(payload.items.len());
    for line in payload.items {
        let unit_price = line.menu_item.price;
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(line.menu_item.id),
            quantity: Set(line.quantity),
            unit_price: Set(unit_price),
            total_price: Set(unit_price * Decimal::from(line.quantity)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let mut extras = Vec::with_capacity(line.selected_extras.len());
        for selected in line.selected_extras {
            let unit_price = selected.extra.price;
            let row = OrderItemExtraActive {
                id: Set(Uuid::new_v4()),
                order_item_id: Set(item.id),
                extra_id: Set(selected.extra.id),
                quantity: Set(selected.quantity),
                unit_price: Set(unit_price),
                total_price: Set(unit_price * Decimal::from(selected.quantity)),
                created_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await?;
            extras.push(order_item_extra_from_entity(row, Some(selected.extra)));
        }

        items.push(order_item_from_entity(item, Some(line.menu_item), extras));
    }

    txn.commit().await?;

    tracing::info!(
        order_number = %order.order_number,
        total_amount = %order.total_amount,
        items = items.len(),
        "order created"
    );

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "order_create",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "order_number": order.order_number,
            "total_amount": order.total_amount.to_string(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let data = load_order_detail(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

pub async fn get_order_by_number(
    state: &AppState,
    order_number: &str,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(OrderCol::OrderNumber.eq(order_number))
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let data = load_order_detail(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

pub async fn list_orders(
    state: &AppState,
    staff: &StaffUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_staff(staff)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    staff: &StaffUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(staff)?;
    let txn = state.orm.begin().await?;

    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = parse_status(&existing)?;
    if !current.can_transition_to(payload.status) {
        return Err(AppError::BadRequest(format!(
            "cannot move order from {} to {}",
            current, payload.status
        )));
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(&staff.subject),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({
            "order_id": order.id,
            "from": current.as_str(),
            "to": order.status,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}

/// `BGS` + last six digits of the millisecond clock + three random digits.
/// Two orders in the same millisecond window can collide; the unique index on
/// `orders.order_number` turns that into a failed insert.
pub fn generate_order_number() -> String {
    let suffix = rand::thread_rng().gen_range(0..1000);
    format_order_number(Utc::now().timestamp_millis(), suffix)
}

pub fn format_order_number(timestamp_millis: i64, suffix: u16) -> String {
    format!(
        "BGS{:06}{:03}",
        timestamp_millis.rem_euclid(1_000_000),
        suffix % 1000
    )
}

fn check_line_count(items: &[CartLine]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::BadRequest("Missing required fields".into()));
    }
    if items.len() > MAX_CART_LINES {
        return Err(AppError::BadRequest(format!(
            "an order cannot hold more than {MAX_CART_LINES} lines"
        )));
    }
    Ok(())
}

/// Rebuild a client-supplied line from the catalog. Unknown or unavailable
/// items and inactive extras are rejected.
async fn price_from_catalog<C: ConnectionTrait>(conn: &C, line: CartLine) -> AppResult<CartLine> {
    let menu_item = find_orderable_item(conn, line.menu_item.id).await?;
    let extra_ids: Vec<Uuid> = line.selected_extras.iter().map(|s| s.extra.id).collect();
    let extras = find_active_extras(conn, &extra_ids).await?;
    let selected_extras: Vec<CartExtra> = extras
        .into_iter()
        .zip(line.selected_extras.iter())
        .map(|(extra, requested)| CartExtra {
            extra,
            quantity: requested.quantity,
        })
        .collect();

    Ok(CartLine {
        id: line.id,
        total_price: line_total(&menu_item, line.quantity, &selected_extras),
        menu_item,
        quantity: line.quantity,
        selected_extras,
    })
}

async fn load_order_detail<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<OrderWithItems> {
    let rows = OrderItems::find()
        .find_also_related(MenuItems)
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?;

    let item_ids: Vec<Uuid> = rows.iter().map(|(item, _)| item.id).collect();
    let extra_rows = if item_ids.is_empty() {
        Vec::new()
    } else {
        OrderItemExtras::find()
            .find_also_related(Extras)
            .filter(OrderItemExtraCol::OrderItemId.is_in(item_ids))
            .order_by_asc(OrderItemExtraCol::CreatedAt)
            .all(conn)
            .await?
    };

    let mut extras_by_item: HashMap<Uuid, Vec<OrderItemExtra>> = HashMap::new();
    for (row, extra) in extra_rows {
        extras_by_item
            .entry(row.order_item_id)
            .or_default()
            .push(order_item_extra_from_entity(row, extra.map(extra_from_entity)));
    }

    let items = rows
        .into_iter()
        .map(|(item, menu_item)| {
            let extras = extras_by_item.remove(&item.id).unwrap_or_default();
            let menu_item = menu_item.map(|model| menu_item_from_entity(model, None));
            order_item_from_entity(item, menu_item, extras)
        })
        .collect();

    Ok(OrderWithItems {
        order: order_from_entity(order)?,
        items,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_status(model: &OrderModel) -> AppResult<OrderStatus> {
    model.status.parse().map_err(|_| {
        AppError::Internal(anyhow!(
            "order {} has unknown status {}",
            model.id,
            model.status
        ))
    })
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = parse_status(&model)?;
    let order_type: OrderType = model.order_type.parse().map_err(|_| {
        AppError::Internal(anyhow!(
            "order {} has unknown type {}",
            model.id,
            model.order_type
        ))
    })?;
    Ok(Order {
        id: model.id,
        order_number: model.order_number,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        order_type,
        status,
        subtotal: model.subtotal,
        tax_amount: model.tax_amount,
        total_amount: model.total_amount,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn order_item_from_entity(
    model: OrderItemModel,
    menu_item: Option<MenuItem>,
    extras: Vec<OrderItemExtra>,
) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        menu_item_id: model.menu_item_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        total_price: model.total_price,
        created_at: model.created_at.with_timezone(&Utc),
        menu_item,
        extras,
    }
}

fn order_item_extra_from_entity(
    model: OrderItemExtraModel,
    extra: Option<Extra>,
) -> OrderItemExtra {
    OrderItemExtra {
        id: model.id,
        order_item_id: model.order_item_id,
        extra_id: model.extra_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        total_price: model.total_price,
        created_at: model.created_at.with_timezone(&Utc),
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_uses_clock_tail_and_padded_suffix() {
        assert_eq!(format_order_number(1_700_000_123_456, 7), "BGS123456007");
        assert_eq!(format_order_number(1_700_000_000_042, 999), "BGS000042999");
    }

    #[test]
    fn generated_order_number_shape() {
        let number = generate_order_number();

        assert_eq!(number.len(), 12);
        assert!(number.starts_with("BGS"));
        assert!(number[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn blank_contact_fields_are_dropped() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" Abebe ".into())).as_deref(), Some("Abebe"));
    }
}
