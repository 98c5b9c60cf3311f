//! Favorites Handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Profiles are normally created at sign-up, but accounts that predate
/// that (or were provisioned externally) may lack one. Insert-on-conflict
/// keeps this safe under concurrent callers.
async fn ensure_profile(db: &PgPool, user_id: Uuid) -> ApiResult<()> {
    sqlx::query(
        "INSERT INTO profiles (id, name, email) \
         SELECT id, split_part(email, '@', 1), email FROM users WHERE id = $1 \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(())
}

/// GET /api/v1/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Uuid>>> {
    let ids: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT product_id FROM favorites WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(ids.into_iter().map(|(id,)| id).collect()))
}

/// PUT /api/v1/favorites/:product_id
///
/// Idempotent: favoriting an already-favorited product is a no-op.
pub async fn add_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(ApiError::NotFound("product"));
    }

    ensure_profile(&state.db, user.id).await?;

    sqlx::query(
        "INSERT INTO favorites (id, user_id, product_id) VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, product_id) DO NOTHING",
    )
    .bind(Uuid::now_v7())
    .bind(user.id)
    .bind(product_id)
    .execute(&state.db)
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/favorites/:product_id
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
        .bind(user.id)
        .bind(product_id)
        .execute(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
