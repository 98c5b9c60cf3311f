//! Solestore - Self-hosted Sneaker Storefront
//!
//! A single-binary storefront service backed by Postgres.
//!
//! ## Features
//! - Product catalog with categories and review aggregates
//! - Per-user shopping cart with merged line items
//! - Favorites and user profiles
//! - One-review-per-product submissions
//! - Product image uploads with a single principal image per product

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod storage;

pub use config::Config;
pub use error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub tokens: auth::TokenService,
    pub media: storage::MediaStore,
}
