//! Cart operations: view, add, update quantity, remove.
//!
//! Mutations answer with a redirect back to the cart view, matching the
//! storefront's navigation flow. Every item mutation is scoped to the
//! caller's own cart; an item id from another user's cart reads as missing.

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::domain::cart::line_subtotal;
use crate::domain::CartSummary;
use crate::error::AppError;
use crate::models::{Cart, CartLine};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub subtotal: rust_decimal::Decimal,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub cart: Option<Cart>,
    pub items: Vec<CartLineView>,
    #[serde(flatten)]
    pub summary: CartSummary,
}

/// Loads the caller's cart lines joined to live product data, newest last.
pub(crate) async fn load_cart_lines(
    db: &sqlx::PgPool,
    user_id: Uuid,
) -> Result<Vec<CartLine>, sqlx::Error> {
    sqlx::query_as::<_, CartLine>(
        "SELECT ci.id AS item_id, ci.product_id, p.name, p.price, ci.quantity \
         FROM cart_items ci \
         JOIN carts c ON c.id = ci.cart_id \
         JOIN products p ON p.id = ci.product_id \
         WHERE c.user_id = $1 \
         ORDER BY ci.added_at",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Never auto-creates a cart; a user without one sees an explicit empty view.
pub async fn view_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CartView>, AppError> {
    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;

    let lines = match &cart {
        Some(_) => load_cart_lines(&state.db, user_id).await?,
        None => Vec::new(),
    };

    let summary = CartSummary::from_lines(&lines);
    let items = lines
        .into_iter()
        .map(|line| CartLineView {
            subtotal: line_subtotal(&line),
            line,
        })
        .collect();

    Ok(Json(CartView {
        cart,
        items,
        summary,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartForm {
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: Option<i32>,
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(product_id): Path<Uuid>,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect, AppError> {
    form.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let quantity = form.quantity.unwrap_or(1);

    sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    // Get-or-create in one statement so concurrent adds cannot race into
    // duplicate carts for the same user.
    let cart = sqlx::query_as::<_, Cart>(
        "INSERT INTO carts (id, user_id) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW() \
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .fetch_one(&state.db)
    .await?;

    // Re-adding a product bumps its quantity atomically instead of inserting
    // a second row for the same (cart, product) pair.
    sqlx::query(
        "INSERT INTO cart_items (id, cart_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (cart_id, product_id) \
         DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
    )
    .bind(Uuid::now_v7())
    .bind(cart.id)
    .bind(product_id)
    .bind(quantity)
    .execute(&state.db)
    .await?;

    Ok(Redirect::to("/cart"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemForm {
    pub quantity: Option<i32>,
}

/// A quantity of zero or less deletes the line; non-positive quantities are
/// never persisted.
pub async fn update_cart_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(cart_item_id): Path<Uuid>,
    Form(form): Form<UpdateCartItemForm>,
) -> Result<Redirect, AppError> {
    let quantity = form.quantity.unwrap_or(1);

    let touched = if quantity <= 0 {
        sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM cart_items ci USING carts c \
             WHERE ci.id = $1 AND c.id = ci.cart_id AND c.user_id = $2 \
             RETURNING ci.id",
        )
        .bind(cart_item_id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
    } else {
        sqlx::query_scalar::<_, Uuid>(
            "UPDATE cart_items ci SET quantity = $3 FROM carts c \
             WHERE ci.id = $1 AND c.id = ci.cart_id AND c.user_id = $2 \
             RETURNING ci.id",
        )
        .bind(cart_item_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(&state.db)
        .await?
    };

    touched.ok_or(AppError::NotFound)?;
    Ok(Redirect::to("/cart"))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(cart_item_id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    sqlx::query_scalar::<_, Uuid>(
        "DELETE FROM cart_items ci USING carts c \
         WHERE ci.id = $1 AND c.id = ci.cart_id AND c.user_id = $2 \
         RETURNING ci.id",
    )
    .bind(cart_item_id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(Redirect::to("/cart"))
}
