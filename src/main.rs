//! Solestore - Self-hosted Sneaker Storefront

use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use solestore::api::{cart, catalog, favorites, images, profile, reviews};
use solestore::auth::{self, TokenService};
use solestore::storage::MediaStore;
use solestore::{AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let media = MediaStore::new(&config.media_root, &config.public_base_url)?;
    let state = AppState {
        db,
        tokens: TokenService::new(&config.jwt_secret),
        media,
        config: Arc::new(config),
    };
    let port = state.config.port;
    let media_root = state.config.media_root.clone();

    let app = Router::new()
        .route("/health", get(|| async {
            Json(serde_json::json!({"status": "healthy", "service": "solestore"}))
        }))
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/signin", post(auth::signin))
        .route("/api/v1/auth/signout", post(auth::signout))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/products", get(catalog::list_products).post(catalog::create_product))
        .route("/api/v1/products/featured", get(catalog::featured_products))
        .route("/api/v1/products/:id", get(catalog::get_product).put(catalog::update_product))
        .route("/api/v1/products/:id/reviews", get(reviews::list_for_product))
        .route("/api/v1/products/:id/images", get(images::list_images).post(images::upload))
        .route("/api/v1/products/:id/images/order", put(images::reorder))
        .route("/api/v1/categories", get(catalog::list_categories))
        .route("/api/v1/cart", get(cart::get_cart))
        .route("/api/v1/cart/items", post(cart::add_item))
        .route("/api/v1/cart/items/:id", delete(cart::remove_item))
        .route("/api/v1/favorites", get(favorites::list_favorites))
        .route(
            "/api/v1/favorites/:product_id",
            put(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route("/api/v1/reviews", post(reviews::submit))
        .route(
            "/api/v1/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/api/v1/images/:id", delete(images::delete_image))
        .route("/api/v1/images/:id/principal", put(images::set_principal))
        .nest_service("/media", ServeDir::new(media_root))
        .layer(DefaultBodyLimit::max(images::MAX_UPLOAD_BYTES + 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("🚀 solestore listening on 0.0.0.0:{}", port);
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?,
        app,
    )
    .await?;
    Ok(())
}
