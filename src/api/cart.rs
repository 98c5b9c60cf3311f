//! Cart Handlers
//!
//! One cart per user, created lazily. Both the cart row and the line
//! item are written through upserts against the unique constraints, so
//! concurrent adds from two tabs merge into one row instead of racing:
//! the quantity increment happens inside the database, never as a
//! read-then-write in the application.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::domain::cart::CartView;
use crate::error::{ApiError, ApiResult};
use crate::models::CartItemRow;
use crate::AppState;

/// The joined rows backing the cart view: product name, the current
/// catalog price and the primary image, alongside the frozen line data.
async fn fetch_view(db: &PgPool, user_id: Uuid) -> ApiResult<CartView> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        "SELECT ci.id, ci.product_id, p.name AS product_name, ci.quantity, ci.unit_price, \
                p.price AS current_price, \
                (SELECT i.public_url FROM product_images i \
                  WHERE i.product_id = p.id AND i.is_primary) AS image_url \
         FROM cart_items ci \
         JOIN carts c ON c.id = ci.cart_id \
         JOIN products p ON p.id = ci.product_id \
         WHERE c.user_id = $1 \
         ORDER BY ci.created_at",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(CartView::from_rows(rows))
}

/// GET /api/v1/cart
pub async fn get_cart(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<CartView>> {
    Ok(Json(fetch_view(&state.db, user.id).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
}

/// POST /api/v1/cart/items
///
/// Revalidates the product (active, positively priced), resolves or
/// creates the user's cart, and merges the line item — one transaction.
pub async fn add_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<(StatusCode, Json<CartView>)> {
    req.validate()?;
    let quantity = req.quantity.unwrap_or(1);

    let mut tx = state.db.begin().await?;

    let product: Option<(Uuid, rust_decimal::Decimal)> = sqlx::query_as(
        "SELECT id, price FROM products WHERE id = $1 AND active AND price > 0",
    )
    .bind(req.product_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (product_id, unit_price) = product.ok_or(ApiError::ProductUnavailable)?;

    // Get-or-create against the unique user_id constraint. DO UPDATE
    // instead of DO NOTHING so the existing row still comes back.
    let (cart_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO carts (id, user_id) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW() \
         RETURNING id",
    )
    .bind(Uuid::now_v7())
    .bind(user.id)
    .fetch_one(&mut *tx)
    .await?;

    // Unit price freezes on first insert; a merge only bumps quantity.
    sqlx::query(
        "INSERT INTO cart_items (id, cart_id, product_id, quantity, unit_price) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (cart_id, product_id) DO UPDATE \
           SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = NOW()",
    )
    .bind(Uuid::now_v7())
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .bind(unit_price)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let view = fetch_view(&state.db, user.id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/v1/cart/items/:id
///
/// Scoped to the caller's cart; deleting someone else's line item is a 404.
pub async fn remove_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Json<CartView>> {
    let result = sqlx::query(
        "DELETE FROM cart_items ci USING carts c \
         WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2",
    )
    .bind(item_id)
    .bind(user.id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("cart item"));
    }

    Ok(Json(fetch_view(&state.db, user.id).await?))
}
