//! Order snapshot construction.
//!
//! At checkout commit the cart's lines are turned into an [`OrderDraft`]: the
//! unit price of every line is copied from the live product as of that moment
//! and frozen, and the order total is the sum over the frozen lines. The draft
//! is built in memory first so the database write is a straight insert.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::cart::line_subtotal;
use crate::models::CartLine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub total_amount: Decimal,
    pub items: Vec<OrderItemDraft>,
    /// Ids of the exact cart rows this snapshot was built from. The commit
    /// deletes these rows and no others, so a line added concurrently after
    /// the snapshot survives in the cart instead of vanishing unordered.
    pub cart_item_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemDraft {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderDraft {
    /// Builds the snapshot, or `None` when the cart is empty. An empty cart
    /// must never materialize into a zero-item order.
    pub fn from_lines(lines: &[CartLine]) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }
        Some(Self {
            total_amount: lines.iter().map(line_subtotal).sum(),
            items: lines
                .iter()
                .map(|l| OrderItemDraft {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    price: l.price,
                })
                .collect(),
            cart_item_ids: lines.iter().map(|l| l.item_id).collect(),
        })
    }
}

/// Human-facing order reference, e.g. `ORD-00421337`.
pub fn new_order_number() -> String {
    format!("ORD-{:08}", rand::random::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn empty_cart_yields_no_draft() {
        assert_eq!(OrderDraft::from_lines(&[]), None);
    }

    #[test]
    fn draft_freezes_prices_and_totals() {
        let lines = vec![line(Decimal::new(1000, 2), 2), line(Decimal::new(550, 2), 1)];
        let draft = OrderDraft::from_lines(&lines).unwrap();

        assert_eq!(draft.total_amount, Decimal::new(2550, 2));
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].price, Decimal::new(1000, 2));
        assert_eq!(draft.items[0].quantity, 2);
        assert_eq!(draft.items[1].price, Decimal::new(550, 2));

        // Total always equals the sum over the frozen lines.
        let recomputed: Decimal = draft
            .items
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum();
        assert_eq!(recomputed, draft.total_amount);
    }

    #[test]
    fn draft_targets_exactly_the_snapshotted_cart_rows() {
        let lines = vec![line(Decimal::new(1000, 2), 2), line(Decimal::new(550, 2), 1)];
        let draft = OrderDraft::from_lines(&lines).unwrap();

        // The commit deletes by these ids; they must be the snapshotted rows,
        // nothing more and nothing less. A row inserted after the snapshot has
        // a different id and stays in the cart.
        let snapshotted: Vec<Uuid> = lines.iter().map(|l| l.item_id).collect();
        assert_eq!(draft.cart_item_ids, snapshotted);

        let late_arrival = line(Decimal::new(300, 2), 1);
        assert!(!draft.cart_item_ids.contains(&late_arrival.item_id));
    }

    #[test]
    fn draft_covers_every_line_exactly_once() {
        let lines = vec![
            line(Decimal::new(1000, 2), 2),
            line(Decimal::new(550, 2), 1),
            line(Decimal::new(125, 2), 4),
        ];
        let draft = OrderDraft::from_lines(&lines).unwrap();
        assert_eq!(draft.items.len(), lines.len());
        assert_eq!(draft.cart_item_ids.len(), lines.len());
    }

    #[test]
    fn order_number_has_fixed_prefix() {
        let n = new_order_number();
        assert!(n.starts_with("ORD-"));
        assert!(n.len() >= 12);
    }
}
