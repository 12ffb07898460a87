use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    cart::{CartLine, CartState},
    models::OrderType,
    pricing::TaxBreakdown,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectedExtraRequest {
    pub extra_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub extras: Vec<SelectedExtraRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub order_type: OrderType,
    pub notes: Option<String>,
}

/// What the cart page and the checkout summary render.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub item_count: i64,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub tax_amount: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
}

impl From<&CartState> for CartView {
    fn from(state: &CartState) -> Self {
        let breakdown = TaxBreakdown::from_inclusive(state.total);
        Self {
            items: state.lines.clone(),
            item_count: state.item_count(),
            subtotal: breakdown.subtotal,
            tax_amount: breakdown.tax_amount,
            total: breakdown.total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddToCartResponse {
    pub line_id: Uuid,
    pub cart: CartView,
}
