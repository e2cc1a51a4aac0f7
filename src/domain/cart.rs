//! Cart totals.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::CartLine;

/// Totals derived from the cart's current lines. Never cached; recomputed on
/// every read so price changes show up immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub total: Decimal,
    pub total_items: i64,
}

impl CartSummary {
    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            total: lines.iter().map(line_subtotal).sum(),
            total_items: lines.iter().map(|l| i64::from(l.quantity)).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

pub fn line_subtotal(line: &CartLine) -> Decimal {
    line.price * Decimal::from(line.quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn line(price: Decimal, quantity: i32) -> CartLine {
        CartLine {
            item_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            name: "Widget".into(),
            price,
            quantity,
        }
    }

    #[test]
    fn totals_sum_price_times_quantity() {
        // $10.00 x 2 + $5.50 x 1 = $25.50, three items
        let lines = vec![line(Decimal::new(1000, 2), 2), line(Decimal::new(550, 2), 1)];
        let summary = CartSummary::from_lines(&lines);
        assert_eq!(summary.total, Decimal::new(2550, 2));
        assert_eq!(summary.total_items, 3);
        assert!(!summary.is_empty());
    }

    #[test]
    fn empty_cart_totals_zero() {
        let summary = CartSummary::from_lines(&[]);
        assert_eq!(summary.total, Decimal::ZERO);
        assert_eq!(summary.total_items, 0);
        assert!(summary.is_empty());
    }

    #[test]
    fn line_subtotal_scales_with_quantity() {
        assert_eq!(line_subtotal(&line(Decimal::new(999, 2), 3)), Decimal::new(2997, 2));
    }
}
