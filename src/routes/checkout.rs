//! Checkout flow: review, address selection, payment, commit, confirmation.
//!
//! Every step requires a non-empty cart. An empty or missing cart is a soft
//! precondition failure answered with a redirect back to the cart view, never
//! an error page. Only the commit step mutates state, and it does so inside a
//! single transaction: order + items are written and the cart is emptied
//! all-or-nothing.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::domain::order::new_order_number;
use crate::domain::{CartSummary, OrderDraft};
use crate::error::AppError;
use crate::models::{CartLine, Order, OrderItem};
use crate::routes::cart::load_cart_lines;
use crate::state::AppState;

/// Address management lives with an external collaborator; the checkout flow
/// only presents a fixed choice list.
#[derive(Debug, Clone, Serialize)]
pub struct AddressOption {
    pub id: i32,
    pub address: &'static str,
}

pub fn sample_addresses() -> Vec<AddressOption> {
    vec![
        AddressOption {
            id: 1,
            address: "123 Main Street, New York, NY 10001",
        },
        AddressOption {
            id: 2,
            address: "456 Oak Avenue, Los Angeles, CA 90001",
        },
    ]
}

fn resolve_address(address_id: i32) -> String {
    sample_addresses()
        .into_iter()
        .find(|a| a.id == address_id)
        .map(|a| a.address.to_string())
        .unwrap_or_else(|| format!("Address ID: {address_id}"))
}

#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub items: Vec<CartLine>,
    #[serde(flatten)]
    pub summary: CartSummary,
}

async fn non_empty_cart(
    state: &AppState,
    user_id: Uuid,
) -> Result<Option<(Vec<CartLine>, CartSummary)>, AppError> {
    let lines = load_cart_lines(&state.db, user_id).await?;
    if lines.is_empty() {
        return Ok(None);
    }
    let summary = CartSummary::from_lines(&lines);
    Ok(Some((lines, summary)))
}

/// Checkout review: totals only, no mutation.
pub async fn checkout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, AppError> {
    let Some((items, summary)) = non_empty_cart(&state, user_id).await? else {
        return Ok(Redirect::to("/cart").into_response());
    };
    Ok(Json(CheckoutView { items, summary }).into_response())
}

#[derive(Debug, Serialize)]
pub struct SelectAddressView {
    pub items: Vec<CartLine>,
    #[serde(flatten)]
    pub summary: CartSummary,
    pub addresses: Vec<AddressOption>,
}

pub async fn select_address(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, AppError> {
    let Some((items, summary)) = non_empty_cart(&state, user_id).await? else {
        return Ok(Redirect::to("/cart").into_response());
    };
    Ok(Json(SelectAddressView {
        items,
        summary,
        addresses: sample_addresses(),
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct PaymentParams {
    pub address: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct PaymentView {
    pub items: Vec<CartLine>,
    #[serde(flatten)]
    pub summary: CartSummary,
    pub address_id: i32,
}

pub async fn payment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<PaymentParams>,
) -> Result<Response, AppError> {
    let Some((items, summary)) = non_empty_cart(&state, user_id).await? else {
        return Ok(Redirect::to("/cart").into_response());
    };
    Ok(Json(PaymentView {
        items,
        summary,
        address_id: params.address.unwrap_or(1),
    })
    .into_response())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProcessPaymentForm {
    pub address_id: Option<i32>,
    // No gateway integration; the method identifier is accepted as-is.
    #[validate(length(min = 1, message = "payment_method must not be empty"))]
    pub payment_method: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

/// Commit step. Snapshots the cart into an order and empties the cart in one
/// transaction. If the cart emptied between the payment page and this call,
/// nothing is written and the caller lands back on the cart view.
pub async fn process_payment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Form(form): Form<ProcessPaymentForm>,
) -> Result<Response, AppError> {
    form.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut tx = state.db.begin().await?;

    // Lock the cart lines so a concurrent add/update/remove by the same user
    // serializes against this commit.
    let lines: Vec<CartLine> = sqlx::query_as(
        "SELECT ci.id AS item_id, ci.product_id, p.name, p.price, ci.quantity \
         FROM cart_items ci \
         JOIN carts c ON c.id = ci.cart_id \
         JOIN products p ON p.id = ci.product_id \
         WHERE c.user_id = $1 \
         ORDER BY ci.added_at \
         FOR UPDATE OF ci",
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    let Some(draft) = OrderDraft::from_lines(&lines) else {
        tx.rollback().await?;
        return Ok(Redirect::to("/cart").into_response());
    };

    let order_id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO orders \
         (id, order_number, user_id, total_amount, status, shipping_address, phone, city, postal_code) \
         VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8)",
    )
    .bind(order_id)
    .bind(new_order_number())
    .bind(user_id)
    .bind(draft.total_amount)
    .bind(resolve_address(form.address_id.unwrap_or(1)))
    .bind(&form.phone)
    .bind(&form.city)
    .bind(&form.postal_code)
    .execute(&mut *tx)
    .await?;

    for item in &draft.items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, quantity, price) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;
    }

    // Delete only the rows the snapshot was built from. A row inserted by a
    // concurrent add after the SELECT is not covered by the row locks, and a
    // blanket delete-by-user would drop it without it ever becoming an
    // order item.
    sqlx::query("DELETE FROM cart_items WHERE id = ANY($1)")
        .bind(&draft.cart_item_ids)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(%order_id, %user_id, "order placed");
    Ok(Redirect::to(&format!("/order-confirmation/{order_id}")).into_response())
}

#[derive(Debug, Serialize)]
pub struct OrderConfirmation {
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

/// Read-only confirmation, scoped to the requesting user. Someone else's
/// order id reads as missing rather than forbidden.
pub async fn order_confirmation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderConfirmation>, AppError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let order_items =
        sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
            .bind(order.id)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(OrderConfirmation { order, order_items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_address_ids_resolve_to_full_addresses() {
        assert_eq!(resolve_address(1), "123 Main Street, New York, NY 10001");
        assert_eq!(resolve_address(2), "456 Oak Avenue, Los Angeles, CA 90001");
    }

    #[test]
    fn unknown_address_id_keeps_the_reference() {
        assert_eq!(resolve_address(99), "Address ID: 99");
    }
}
