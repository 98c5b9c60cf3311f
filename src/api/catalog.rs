//! Catalog Handlers
//!
//! Product listings carry their review aggregates (average rating and
//! count) computed in the same query, so no caller ever recomputes
//! them from raw review rows.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminAccess;
use crate::error::{ApiError, ApiResult};
use crate::models::{Category, Product, ProductListing};
use crate::AppState;

const LISTING_COLUMNS: &str = "p.*, \
    COALESCE(AVG(r.rating), 0)::FLOAT8 AS avg_rating, \
    COUNT(r.id) AS review_count";

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

/// GET /api/v1/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PaginatedResponse<ProductListing>>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).clamp(1, 100);

    let sql = format!(
        "SELECT {LISTING_COLUMNS} \
         FROM products p LEFT JOIN reviews r ON r.product_id = p.id \
         WHERE p.active \
           AND ($1::uuid IS NULL OR p.category_id = $1) \
           AND ($2::text IS NULL OR p.name ILIKE '%' || $2 || '%') \
         GROUP BY p.id \
         ORDER BY p.created_at DESC \
         LIMIT $3 OFFSET $4"
    );
    let products = sqlx::query_as::<_, ProductListing>(&sql)
        .bind(params.category)
        .bind(&params.search)
        .bind(per_page as i64)
        .bind(((page - 1) * per_page) as i64)
        .fetch_all(&state.db)
        .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products p \
         WHERE p.active \
           AND ($1::uuid IS NULL OR p.category_id = $1) \
           AND ($2::text IS NULL OR p.name ILIKE '%' || $2 || '%')",
    )
    .bind(params.category)
    .bind(&params.search)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(PaginatedResponse {
        data: products,
        total: total.0,
        page,
    }))
}

#[derive(Debug, Deserialize)]
pub struct FeaturedParams {
    pub limit: Option<u32>,
}

/// GET /api/v1/products/featured
///
/// Best-reviewed active products: highest average rating first, review
/// count as the tie breaker.
pub async fn featured_products(
    State(state): State<AppState>,
    Query(params): Query<FeaturedParams>,
) -> ApiResult<Json<Vec<ProductListing>>> {
    let limit = params.limit.unwrap_or(6).clamp(1, 24);
    let sql = format!(
        "SELECT {LISTING_COLUMNS} \
         FROM products p LEFT JOIN reviews r ON r.product_id = p.id \
         WHERE p.active \
         GROUP BY p.id \
         ORDER BY avg_rating DESC, review_count DESC, p.created_at DESC \
         LIMIT $1"
    );
    let products = sqlx::query_as::<_, ProductListing>(&sql)
        .bind(limit as i64)
        .fetch_all(&state.db)
        .await?;
    Ok(Json(products))
}

/// GET /api/v1/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProductListing>> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS} \
         FROM products p LEFT JOIN reviews r ON r.product_id = p.id \
         WHERE p.id = $1 AND p.active \
         GROUP BY p.id"
    );
    let product = sqlx::query_as::<_, ProductListing>(&sql)
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(Json(product))
}

/// GET /api/v1/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE active ORDER BY name")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(categories))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size_label: Option<String>,
    pub gender: Option<String>,
    pub material: Option<String>,
    pub featured: Option<bool>,
}

fn check_price(price: Decimal) -> ApiResult<()> {
    if price <= Decimal::ZERO {
        return Err(ApiError::validation("price must be positive"));
    }
    Ok(())
}

/// POST /api/v1/products (admin)
pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Json(req): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    req.validate()?;
    check_price(req.price)?;

    let sku = format!("SKU-{:08}", rand::random::<u32>() % 100_000_000);
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products \
           (id, sku, name, description, price, sale_price, stock, category_id, \
            brand, color, size_label, gender, material, featured) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&sku)
    .bind(req.name.trim())
    .bind(&req.description)
    .bind(req.price)
    .bind(req.sale_price)
    .bind(req.stock.unwrap_or(0))
    .bind(req.category_id)
    .bind(&req.brand)
    .bind(&req.color)
    .bind(&req.size_label)
    .bind(&req.gender)
    .bind(&req.material)
    .bind(req.featured.unwrap_or(false))
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size_label: Option<String>,
    pub gender: Option<String>,
    pub material: Option<String>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
}

/// PUT /api/v1/products/:id (admin)
pub async fn update_product(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> ApiResult<Json<Product>> {
    req.validate()?;
    check_price(req.price)?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET \
           name = $2, description = $3, price = $4, sale_price = $5, stock = $6, \
           category_id = $7, brand = $8, color = $9, size_label = $10, gender = $11, \
           material = $12, featured = COALESCE($13, featured), \
           active = COALESCE($14, active), updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(req.name.trim())
    .bind(&req.description)
    .bind(req.price)
    .bind(req.sale_price)
    .bind(req.stock.unwrap_or(0))
    .bind(req.category_id)
    .bind(&req.brand)
    .bind(&req.color)
    .bind(&req.size_label)
    .bind(&req.gender)
    .bind(&req.material)
    .bind(req.featured)
    .bind(req.active)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("product"))?;

    Ok(Json(product))
}
