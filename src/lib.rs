//! EStore Storefront Backend
//!
//! Server-rendered e-commerce storefront:
//! - Product catalog browsing (search, category filter, pagination)
//! - Per-user shopping cart
//! - Linear checkout: review → address → payment → order
//! - AI-assisted customer-support chat

pub mod auth;
pub mod chat;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
