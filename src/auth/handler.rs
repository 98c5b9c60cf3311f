//! Auth Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{hash_password, verify_password, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::models::User;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// POST /api/v1/auth/signup
///
/// Creates the account and its profile row in one transaction.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;
    let email = req.email.trim().to_lowercase();
    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let user_id = Uuid::now_v7();
    let mut tx = state.db.begin().await?;
    sqlx::query("INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, $3, 'customer')")
        .bind(user_id)
        .bind(&email)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("email already registered".into())
            }
            _ => ApiError::from(e),
        })?;
    sqlx::query("INSERT INTO profiles (id, name, email) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(req.name.trim())
        .bind(&email)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(user_id = %user_id, "account created");

    let token = state
        .tokens
        .issue(user_id, &email, "customer")
        .map_err(|e| ApiError::Internal(format!("token generation failed: {e}")))?;
    let response = AuthResponse {
        token,
        user: UserInfo {
            id: user_id,
            email,
            role: "customer".into(),
        },
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = req.email.trim().to_lowercase();
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    // One failure path for unknown email and bad password alike.
    let user = match user {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => return Err(ApiError::InvalidCredentials),
    };

    let token = state
        .tokens
        .issue(user.id, &user.email, &user.role)
        .map_err(|e| ApiError::Internal(format!("token generation failed: {e}")))?;
    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            email: user.email,
            role: user.role,
        },
    }))
}

/// POST /api/v1/auth/signout
///
/// Sessions are stateless bearer tokens; there is nothing to revoke
/// server-side. The endpoint exists so clients have a uniform call to
/// end a session with.
pub async fn signout(_user: CurrentUser) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/me
///
/// Resolved from the token alone; the profile endpoint serves the full
/// profile row.
pub async fn me(user: CurrentUser) -> Json<UserInfo> {
    Json(UserInfo {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}
