//! EStore - E-commerce Storefront Backend

use anyhow::Result;
use axum::routing::{get, post};
use axum::{Json, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use estore::chat::ChatClient;
use estore::routes::{cart, catalog, chat, checkout};
use estore::{AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let state = AppState {
        db,
        chat: ChatClient::new(&config.chat)?,
    };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "estore"})) }))
        .route("/", get(catalog::home))
        .route("/products", get(catalog::list_products))
        .route("/product/:id", get(catalog::product_detail))
        .route("/cart", get(cart::view_cart))
        .route("/cart/add/:product_id", post(cart::add_to_cart))
        .route("/cart/update/:cart_item_id", post(cart::update_cart_item))
        .route("/cart/remove/:cart_item_id", post(cart::remove_from_cart))
        .route("/checkout", get(checkout::checkout))
        .route("/checkout/address", get(checkout::select_address))
        .route("/checkout/payment", get(checkout::payment))
        .route("/checkout/process-payment", post(checkout::process_payment))
        .route("/order-confirmation/:order_id", get(checkout::order_confirmation))
        .route("/api/chatbot", post(chat::chatbot_query))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("🚀 EStore listening on 0.0.0.0:{}", config.port);
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?,
        app,
    )
    .await?;
    Ok(())
}
