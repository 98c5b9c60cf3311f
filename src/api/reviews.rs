//! Review Handlers
//!
//! One review per (user, product), enforced by a unique constraint and
//! written as a single upsert: resubmitting updates the existing row in
//! place (same id, refreshed timestamp). The rating is validated before
//! any write happens.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::domain::rating::{self, ReviewSummary};
use crate::error::{ApiError, ApiResult};
use crate::models::{Review, ReviewWithAuthor};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProductReviews {
    pub summary: ReviewSummary,
    pub reviews: Vec<ReviewWithAuthor>,
}

/// GET /api/v1/products/:id/reviews
pub async fn list_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<ProductReviews>> {
    let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
        "SELECT r.*, p.name AS author_name, p.avatar_url AS author_avatar \
         FROM reviews r LEFT JOIN profiles p ON p.id = r.user_id \
         WHERE r.product_id = $1 \
         ORDER BY r.created_at DESC",
    )
    .bind(product_id)
    .fetch_all(&state.db)
    .await?;

    let ratings: Vec<i16> = reviews.iter().map(|r| r.review.rating).collect();
    Ok(Json(ProductReviews {
        summary: rating::summarize(&ratings),
        reviews,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReviewRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 4000))]
    pub comment: Option<String>,
    pub recommended: Option<bool>,
}

/// POST /api/v1/reviews
pub async fn submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<SubmitReviewRequest>,
) -> ApiResult<Json<Review>> {
    req.validate()?;

    let product: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM products WHERE id = $1 AND active")
            .bind(req.product_id)
            .fetch_optional(&state.db)
            .await?;
    if product.is_none() {
        return Err(ApiError::NotFound("product"));
    }

    let review = sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (id, product_id, user_id, rating, title, comment, recommended) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (user_id, product_id) DO UPDATE \
           SET rating = EXCLUDED.rating, title = EXCLUDED.title, \
               comment = EXCLUDED.comment, recommended = EXCLUDED.recommended, \
               updated_at = NOW() \
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(req.product_id)
    .bind(user.id)
    .bind(req.rating)
    .bind(&req.title)
    .bind(&req.comment)
    .bind(req.recommended)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(review))
}
