//! Profile Handlers

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::models::Profile;
use crate::AppState;

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
}

/// PUT /api/v1/profile
///
/// Partial update: absent fields keep their current value.
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Profile>> {
    req.validate()?;
    let profile = sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET \
           name = COALESCE($2, name), phone = COALESCE($3, phone), \
           birth_date = COALESCE($4, birth_date), gender = COALESCE($5, gender), \
           avatar_url = COALESCE($6, avatar_url), updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .bind(&req.name)
    .bind(&req.phone)
    .bind(req.birth_date)
    .bind(&req.gender)
    .bind(&req.avatar_url)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(profile))
}
