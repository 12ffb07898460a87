use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Category, Extra, MenuItem};

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MenuItemList {
    #[schema(value_type = Vec<MenuItem>)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ExtraList {
    #[schema(value_type = Vec<Extra>)]
    pub items: Vec<Extra>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceRange {
    #[schema(value_type = String)]
    pub min: Decimal,
    #[schema(value_type = String)]
    pub max: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MenuStats {
    pub total_items: i64,
    pub price_range: PriceRange,
    pub fasting_items_count: i64,
}
