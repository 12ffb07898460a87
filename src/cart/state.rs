use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Extra, MenuItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartExtra {
    pub extra: Extra,
    pub quantity: i32,
}

/// One customised entry in the cart. `id` is independent of the menu item so
/// the same dish can sit in the cart twice with different extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub menu_item: MenuItem,
    pub quantity: i32,
    pub selected_extras: Vec<CartExtra>,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartState {
    pub lines: Vec<CartLine>,
    #[schema(value_type = String)]
    pub total: Decimal,
}

impl CartState {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, id: Uuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.line(id).is_some()
    }

    /// Total number of portions across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }
}
