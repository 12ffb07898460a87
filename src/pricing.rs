//! Order totals.
//!
//! Catalog prices are tax-inclusive. The cart view, the checkout summary and
//! order creation all go through the functions here so the figures a customer
//! sees are the figures that get recorded.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    cart::{CartExtra, CartLine},
    models::MenuItem,
};

/// Flat VAT rate (15%) included in every catalog price.
pub const TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Largest amount a `NUMERIC(10, 2)` money column holds: 99 999 999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// `price * quantity + Σ(extra.price * extra.quantity)`.
///
/// Saturates instead of overflowing; anything above [`MAX_AMOUNT`] is
/// rejected before it reaches storage.
pub fn line_total(menu_item: &MenuItem, quantity: i32, extras: &[CartExtra]) -> Decimal {
    let item_total = menu_item.price.saturating_mul(Decimal::from(quantity));
    extras.iter().fold(item_total, |acc, selected| {
        acc.saturating_add(selected.extra.price.saturating_mul(Decimal::from(selected.quantity)))
    })
}

/// Sum of the cached line totals.
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.total_price))
}

/// Gross of an order, recomputed from line contents.
pub fn order_gross(lines: &[CartLine]) -> Decimal {
    lines.iter().fold(Decimal::ZERO, |acc, line| {
        acc.saturating_add(line_total(&line.menu_item, line.quantity, &line.selected_extras))
    })
}

/// Round to cents, halves away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBreakdown {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl TaxBreakdown {
    /// Split a tax-inclusive total for display. The tax is whatever remains
    /// after removing the subtotal, so the parts always add up to `total`.
    pub fn from_inclusive(total: Decimal) -> Self {
        let subtotal = round_cents(total / (Decimal::ONE + TAX_RATE));
        Self {
            subtotal,
            tax_amount: total - subtotal,
            total,
        }
    }

    /// Authoritative figures persisted on an order. The gross is recomputed
    /// from the line contents rather than trusting cached line totals.
    pub fn for_order(lines: &[CartLine]) -> Self {
        let gross = order_gross(lines);
        let subtotal = round_cents(gross / (Decimal::ONE + TAX_RATE));
        let tax_amount = round_cents(subtotal * TAX_RATE);
        Self {
            subtotal,
            tax_amount,
            total: subtotal.saturating_add(tax_amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::Extra;

    fn dish(price: Decimal) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: "Special Tibs".into(),
            description: None,
            price,
            image_url: None,
            is_available: true,
            is_fasting: false,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            category: None,
        }
    }

    fn extra(price: Decimal, quantity: i32) -> CartExtra {
        CartExtra {
            extra: Extra {
                id: Uuid::new_v4(),
                name: "Extra Injera".into(),
                price,
                is_active: true,
                created_at: Utc::now(),
            },
            quantity,
        }
    }

    #[test]
    fn tax_rate_is_fifteen_percent() {
        assert_eq!(TAX_RATE, Decimal::new(15, 2));
    }

    #[test]
    fn line_total_adds_extras_once() {
        let item = dish(Decimal::new(10000, 2));
        let extras = [extra(Decimal::new(2000, 2), 1)];

        assert_eq!(line_total(&item, 2, &extras), Decimal::new(22000, 2));
        assert_eq!(line_total(&item, 1, &[]), Decimal::new(10000, 2));
    }

    #[test]
    fn inclusive_split_for_sample_order() {
        let split = TaxBreakdown::from_inclusive(Decimal::new(22000, 2));

        assert_eq!(split.subtotal, Decimal::new(19130, 2));
        assert_eq!(split.tax_amount, Decimal::new(2870, 2));
        assert_eq!(split.subtotal + split.tax_amount, split.total);
    }

    #[test]
    fn inclusive_split_parts_always_sum_to_total() {
        for cents in [0_i64, 1, 99, 115, 1999, 12345, 987_654] {
            let total = Decimal::new(cents, 2);
            let split = TaxBreakdown::from_inclusive(total);
            assert_eq!(split.subtotal + split.tax_amount, total, "total {total}");
            assert!(split.tax_amount >= Decimal::ZERO);
        }
    }

    #[test]
    fn order_totals_use_pre_tax_subtotal() {
        let line = CartLine {
            id: Uuid::new_v4(),
            menu_item: dish(Decimal::new(10000, 2)),
            quantity: 2,
            selected_extras: vec![extra(Decimal::new(2000, 2), 1)],
            // a stale cache must not leak into the recorded figures
            total_price: Decimal::new(1, 0),
        };

        let totals = TaxBreakdown::for_order(&[line]);

        assert_eq!(totals.subtotal, Decimal::new(19130, 2));
        assert_eq!(totals.tax_amount, Decimal::new(2870, 2));
        assert_eq!(totals.total, Decimal::new(22000, 2));
    }

    #[test]
    fn max_amount_fits_money_columns() {
        assert_eq!(MAX_AMOUNT, Decimal::new(9_999_999_999, 2));
    }

    #[test]
    fn oversized_prices_saturate_instead_of_panicking() {
        let line = CartLine {
            id: Uuid::new_v4(),
            menu_item: dish(Decimal::MAX),
            quantity: 2,
            selected_extras: vec![extra(Decimal::MAX, 3)],
            total_price: Decimal::ZERO,
        };

        assert_eq!(order_gross(std::slice::from_ref(&line)), Decimal::MAX);
        let totals = TaxBreakdown::for_order(&[line]);
        assert!(totals.total > MAX_AMOUNT);
    }

    #[test]
    fn empty_order_is_zero() {
        let totals = TaxBreakdown::for_order(&[]);
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }
}
