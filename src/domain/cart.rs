//! Cart View
//!
//! Totals are computed server-side from the persisted rows: each line
//! total is the frozen unit price times quantity, and the subtotal is
//! the sum over all lines. The unit price is captured at add time and
//! deliberately not re-read from the catalog, so the view also carries
//! the current catalog price for display.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::CartItemRow;

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub current_price: Decimal,
    pub line_total: Decimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            items: vec![],
            subtotal: Decimal::ZERO,
        }
    }

    pub fn from_rows(rows: Vec<CartItemRow>) -> Self {
        let items: Vec<CartLine> = rows
            .into_iter()
            .map(|row| {
                let line_total = row.unit_price * Decimal::from(row.quantity);
                CartLine {
                    id: row.id,
                    product_id: row.product_id,
                    product_name: row.product_name,
                    quantity: row.quantity,
                    unit_price: row.unit_price,
                    current_price: row.current_price,
                    line_total,
                    image_url: row.image_url,
                }
            })
            .collect();
        let subtotal = items.iter().map(|line| line.line_total).sum();
        Self { items, subtotal }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(quantity: i32, unit_price: Decimal) -> CartItemRow {
        CartItemRow {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Runner Mk II".into(),
            quantity,
            unit_price,
            current_price: unit_price,
            image_url: None,
        }
    }

    #[test]
    fn test_line_and_subtotal_math() {
        // 100.00 x 2 -> 200.00
        let view = CartView::from_rows(vec![row(2, Decimal::new(10000, 2))]);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].line_total, Decimal::new(20000, 2));
        assert_eq!(view.subtotal, Decimal::new(20000, 2));

        // Quantity merged to 3 on the same line -> 300.00
        let view = CartView::from_rows(vec![row(3, Decimal::new(10000, 2))]);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.subtotal, Decimal::new(30000, 2));
    }

    #[test]
    fn test_subtotal_sums_across_lines() {
        let view = CartView::from_rows(vec![
            row(1, Decimal::new(49990, 2)),
            row(2, Decimal::new(12950, 2)),
        ]);
        assert_eq!(view.subtotal, Decimal::new(75890, 2));
    }

    #[test]
    fn test_empty_cart() {
        let view = CartView::empty();
        assert!(view.is_empty());
        assert_eq!(view.subtotal, Decimal::ZERO);
    }
}
