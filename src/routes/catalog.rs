//! Catalog browsing: home page data, product listing and product detail.
//! Read-only; the cart and checkout flows only ever look up prices here.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Category, Product};
use crate::state::AppState;

const PAGE_SIZE: u32 = 12;

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub featured_products: Vec<Product>,
    pub latest_products: Vec<Product>,
    pub categories: Vec<Category>,
}

pub async fn home(State(state): State<AppState>) -> Result<Json<HomePage>, AppError> {
    let featured_products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE is_featured ORDER BY created_at DESC LIMIT 8",
    )
    .fetch_all(&state.db)
    .await?;

    let latest_products =
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC LIMIT 12")
            .fetch_all(&state.db)
            .await?;

    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(HomePage {
        featured_products,
        latest_products,
        categories,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<Uuid>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub total: i64,
    pub page: u32,
}

/// Maps a caller-supplied sort key to a fixed ORDER BY clause. Anything
/// outside the whitelist falls back to newest-first.
pub fn sort_clause(sort: Option<&str>) -> &'static str {
    match sort {
        Some("price_asc") => "price ASC",
        Some("price_desc") => "price DESC",
        Some("name") => "name ASC",
        Some("rating") => "rating DESC",
        _ => "created_at DESC",
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProductListing>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let search = params.search.as_deref().unwrap_or("").trim().to_string();
    let pattern = format!("%{}%", search);

    let filter = "($1::uuid IS NULL OR category_id = $1) \
         AND ($2 = '' OR name ILIKE $3 OR description ILIKE $3)";

    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT * FROM products WHERE {filter} ORDER BY {} LIMIT $4 OFFSET $5",
        sort_clause(params.sort.as_deref())
    ))
    .bind(params.category)
    .bind(&search)
    .bind(&pattern)
    .bind(i64::from(PAGE_SIZE))
    .bind(i64::from((page - 1) * PAGE_SIZE))
    .fetch_all(&state.db)
    .await?;

    let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM products WHERE {filter}"))
        .bind(params.category)
        .bind(&search)
        .bind(&pattern)
        .fetch_one(&state.db)
        .await?;

    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(ProductListing {
        products,
        categories,
        total: total.0,
        page,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub related_products: Vec<Product>,
}

pub async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDetail>, AppError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound)?;

    let related_products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products \
         WHERE category_id IS NOT DISTINCT FROM $1 AND id <> $2 \
         ORDER BY created_at DESC LIMIT 4",
    )
    .bind(product.category_id)
    .bind(product.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ProductDetail {
        product,
        related_products,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_whitelist_rejects_unknown_keys() {
        assert_eq!(sort_clause(Some("price_asc")), "price ASC");
        assert_eq!(sort_clause(Some("rating")), "rating DESC");
        assert_eq!(sort_clause(Some("1; DROP TABLE products")), "created_at DESC");
        assert_eq!(sort_clause(None), "created_at DESC");
    }
}
