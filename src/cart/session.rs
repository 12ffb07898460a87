use std::mem;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    reducer::{CartCommand, reduce},
    state::{CartExtra, CartState},
    store::{SnapshotStore, snapshot_slot},
};
use crate::{
    error::{AppError, AppResult},
    models::MenuItem,
    pricing::MAX_AMOUNT,
};

/// Most portions of one dish, or of one extra, on a single line.
pub const MAX_QUANTITY: i32 = 999;

/// Most lines one cart may hold.
pub const MAX_CART_LINES: usize = 50;

/// The cart of one customer. Every mutation is applied in memory first and
/// then written through to the snapshot store; write failures are logged and
/// never returned to the caller.
pub struct CartSession<S> {
    store: S,
    slot: String,
    state: CartState,
}

impl<S: SnapshotStore> CartSession<S> {
    /// Start a session from whatever snapshot the store holds for `cart_key`.
    /// Missing or unreadable snapshots yield an empty cart.
    pub async fn restore(store: S, cart_key: &str) -> Self {
        let slot = snapshot_slot(cart_key);
        let state = match store.load(&slot).await {
            Ok(Some(payload)) => match serde_json::from_str::<CartState>(&payload) {
                Ok(snapshot) => reduce(CartState::default(), CartCommand::Load(snapshot)),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        slot = %slot,
                        "discarding malformed cart snapshot"
                    );
                    CartState::default()
                }
            },
            Ok(None) => CartState::default(),
            Err(err) => {
                tracing::warn!(error = %err, slot = %slot, "cart snapshot load failed");
                CartState::default()
            }
        };

        Self { store, slot, state }
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn into_state(self) -> CartState {
        self.state
    }

    /// Always creates a new line, even when an identical one exists.
    pub async fn add_item(
        &mut self,
        menu_item: MenuItem,
        quantity: i32,
        selected_extras: Vec<CartExtra>,
    ) -> AppResult<Uuid> {
        validate_selection(&menu_item, quantity, &selected_extras)?;
        if self.state.lines.len() >= MAX_CART_LINES {
            return Err(AppError::BadRequest(format!(
                "cart cannot hold more than {MAX_CART_LINES} lines"
            )));
        }

        let mut line_id = Uuid::new_v4();
        while self.state.contains(line_id) {
            line_id = Uuid::new_v4();
        }

        self.dispatch(CartCommand::Add {
            line_id,
            menu_item,
            quantity,
            selected_extras,
        })
        .await;
        Ok(line_id)
    }

    pub async fn remove_item(&mut self, line_id: Uuid) {
        self.dispatch(CartCommand::Remove { line_id }).await;
    }

    /// `quantity <= 0` removes the line.
    pub async fn update_quantity(&mut self, line_id: Uuid, quantity: i32) -> AppResult<()> {
        if quantity <= 0 {
            self.remove_item(line_id).await;
        } else {
            check_quantity(quantity)?;
            self.dispatch(CartCommand::SetQuantity { line_id, quantity })
                .await;
        }
        Ok(())
    }

    pub async fn clear_cart(&mut self) {
        self.dispatch(CartCommand::Clear).await;
    }

    pub fn item_count(&self) -> i64 {
        self.state.item_count()
    }

    async fn dispatch(&mut self, command: CartCommand) {
        let current = mem::take(&mut self.state);
        self.state = reduce(current, command);
        self.persist().await;
    }

    async fn persist(&self) {
        let payload = match serde_json::to_string(&self.state) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, slot = %self.slot, "cart snapshot encode failed");
                return;
            }
        };
        if let Err(err) = self.store.save(&self.slot, &payload).await {
            tracing::warn!(error = %err, slot = %self.slot, "cart snapshot save failed");
        }
    }
}

/// Reject selections that cannot be priced or stored: non-positive or
/// oversized quantities and prices outside `0..=MAX_AMOUNT`.
pub(crate) fn validate_selection(
    menu_item: &MenuItem,
    quantity: i32,
    selected_extras: &[CartExtra],
) -> AppResult<()> {
    check_quantity(quantity)?;
    check_price(menu_item.price, "menu item", menu_item.id)?;
    for selected in selected_extras {
        if selected.quantity <= 0 || selected.quantity > MAX_QUANTITY {
            return Err(AppError::BadRequest(format!(
                "extra {} quantity must be between 1 and {MAX_QUANTITY}",
                selected.extra.id
            )));
        }
        check_price(selected.extra.price, "extra", selected.extra.id)?;
    }
    Ok(())
}

fn check_quantity(quantity: i32) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity cannot exceed {MAX_QUANTITY}"
        )));
    }
    Ok(())
}

fn check_price(price: Decimal, kind: &str, id: Uuid) -> AppResult<()> {
    if price < Decimal::ZERO || price > MAX_AMOUNT {
        return Err(AppError::BadRequest(format!(
            "{kind} {id} has a price outside 0..={MAX_AMOUNT}"
        )));
    }
    Ok(())
}
