//! Product Image Handlers
//!
//! Upload stores the bytes on disk, probes pixel dimensions by decoding,
//! and inserts the metadata row. Everything touching `is_primary` runs
//! inside one transaction (demote siblings, promote the target) so the
//! at-most-one-primary-per-product invariant is never observably
//! violated; a partial unique index backs it up in the schema.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AdminAccess;
use crate::error::{ApiError, ApiResult};
use crate::models::ProductImage;
use crate::storage::{extension_for, MediaStore};
use crate::AppState;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

fn validate_upload(mime_type: &str, size: usize) -> ApiResult<()> {
    if !mime_type.starts_with("image/") {
        return Err(ApiError::validation("file must be an image"));
    }
    if size == 0 {
        return Err(ApiError::validation("file is empty"));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ApiError::validation(format!(
            "image exceeds the {} MB limit",
            MAX_UPLOAD_BYTES / 1024 / 1024
        )));
    }
    Ok(())
}

fn probe_dimensions(bytes: &[u8]) -> ApiResult<(i32, i32)> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ApiError::validation(format!("file is not a decodable image: {e}")))?;
    Ok((decoded.width() as i32, decoded.height() as i32))
}

async fn fetch_images(db: &PgPool, product_id: Uuid) -> ApiResult<Vec<ProductImage>> {
    let images = sqlx::query_as::<_, ProductImage>(
        "SELECT * FROM product_images WHERE product_id = $1 ORDER BY position, created_at",
    )
    .bind(product_id)
    .fetch_all(db)
    .await?;
    Ok(images)
}

/// GET /api/v1/products/:id/images
pub async fn list_images(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProductImage>>> {
    Ok(Json(fetch_images(&state.db, product_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub principal: Option<bool>,
}

struct UploadedFile {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

async fn read_file_field(multipart: &mut Multipart) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .or_else(|| mime_guess::from_path(&file_name).first_raw().map(str::to_string))
            .ok_or_else(|| ApiError::validation("missing content type for file field"))?;
        let bytes = field.bytes().await?.to_vec();
        return Ok(UploadedFile {
            file_name,
            mime_type,
            bytes,
        });
    }
    Err(ApiError::validation("multipart field 'file' is required"))
}

/// POST /api/v1/products/:id/images?principal= (admin)
pub async fn upload(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(product_id): Path<Uuid>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ProductImage>)> {
    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.db)
        .await?;
    if product.is_none() {
        return Err(ApiError::NotFound("product"));
    }

    let file = read_file_field(&mut multipart).await?;
    validate_upload(&file.mime_type, file.bytes.len())?;
    let (width, height) = probe_dimensions(&file.bytes)?;

    let object_path = MediaStore::object_path(product_id, extension_for(&file.mime_type));
    state.media.save(&object_path, &file.bytes)?;
    let public_url = state.media.public_url(&object_path);

    let principal = params.principal.unwrap_or(false);
    let result = persist_image(&state.db, product_id, &file, &object_path, &public_url, width, height, principal).await;
    match result {
        Ok(image) => {
            tracing::info!(
                product_id = %product_id,
                image_id = %image.id,
                size = file.bytes.len(),
                principal,
                "product image uploaded"
            );
            Ok((StatusCode::CREATED, Json(image)))
        }
        Err(e) => {
            // The blob is orphaned if the metadata write failed; drop it
            // so storage and database stay in step.
            if let Err(cleanup) = state.media.remove(&object_path) {
                tracing::warn!(path = %object_path, error = %cleanup, "failed to clean up orphaned upload");
            }
            Err(e)
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn persist_image(
    db: &PgPool,
    product_id: Uuid,
    file: &UploadedFile,
    object_path: &str,
    public_url: &str,
    width: i32,
    height: i32,
    principal: bool,
) -> ApiResult<ProductImage> {
    let mut tx = db.begin().await?;

    let mut image = sqlx::query_as::<_, ProductImage>(
        "INSERT INTO product_images \
           (id, product_id, file_name, storage_path, public_url, size_bytes, \
            mime_type, width, height, position) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, \
                 COALESCE((SELECT MAX(position) + 1 FROM product_images WHERE product_id = $2), 0)) \
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(product_id)
    .bind(&file.file_name)
    .bind(object_path)
    .bind(public_url)
    .bind(file.bytes.len() as i64)
    .bind(&file.mime_type)
    .bind(width)
    .bind(height)
    .fetch_one(&mut *tx)
    .await?;

    if principal {
        promote_in_tx(&mut tx, product_id, image.id).await?;
        image.is_primary = true;
    }

    tx.commit().await?;
    Ok(image)
}

/// Demote-then-promote inside the caller's transaction. Demoting first
/// keeps the partial unique index satisfied at every step.
async fn promote_in_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: Uuid,
    image_id: Uuid,
) -> ApiResult<()> {
    sqlx::query(
        "UPDATE product_images SET is_primary = FALSE, updated_at = NOW() \
         WHERE product_id = $1 AND is_primary AND id <> $2",
    )
    .bind(product_id)
    .bind(image_id)
    .execute(&mut **tx)
    .await?;
    sqlx::query(
        "UPDATE product_images SET is_primary = TRUE, updated_at = NOW() WHERE id = $1",
    )
    .bind(image_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// PUT /api/v1/images/:id/principal (admin)
pub async fn set_principal(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(image_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProductImage>>> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT product_id FROM product_images WHERE id = $1")
            .bind(image_id)
            .fetch_optional(&state.db)
            .await?;
    let (product_id,) = row.ok_or(ApiError::NotFound("image"))?;

    let mut tx = state.db.begin().await?;
    promote_in_tx(&mut tx, product_id, image_id).await?;
    tx.commit().await?;

    Ok(Json(fetch_images(&state.db, product_id).await?))
}

/// DELETE /api/v1/images/:id (admin)
///
/// Blob removal is best-effort: a storage failure is logged but does not
/// keep the metadata row alive.
pub async fn delete_image(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(image_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT storage_path FROM product_images WHERE id = $1")
            .bind(image_id)
            .fetch_optional(&state.db)
            .await?;
    let (storage_path,) = row.ok_or(ApiError::NotFound("image"))?;

    if let Err(e) = state.media.remove(&storage_path) {
        tracing::warn!(path = %storage_path, error = %e, "failed to remove image blob");
    }

    sqlx::query("DELETE FROM product_images WHERE id = $1")
        .bind(image_id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/products/:id/images/order (admin)
///
/// Rewrites `position` to each image's index in the submitted list.
/// All-or-nothing: an unknown id rolls the whole batch back.
pub async fn reorder(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(product_id): Path<Uuid>,
    Json(image_ids): Json<Vec<Uuid>>,
) -> ApiResult<Json<Vec<ProductImage>>> {
    let mut tx = state.db.begin().await?;
    for (index, image_id) in image_ids.iter().enumerate() {
        let result = sqlx::query(
            "UPDATE product_images SET position = $1, updated_at = NOW() \
             WHERE id = $2 AND product_id = $3",
        )
        .bind(index as i32)
        .bind(image_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("image"));
        }
    }
    tx.commit().await?;

    Ok(Json(fetch_images(&state.db, product_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload_accepts_images() {
        assert!(validate_upload("image/png", 1024).is_ok());
        assert!(validate_upload("image/jpeg", MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_validate_upload_rejects_non_images() {
        assert!(validate_upload("application/pdf", 1024).is_err());
        assert!(validate_upload("text/html", 1024).is_err());
    }

    #[test]
    fn test_validate_upload_rejects_oversize_and_empty() {
        assert!(validate_upload("image/png", MAX_UPLOAD_BYTES + 1).is_err());
        assert!(validate_upload("image/png", 0).is_err());
    }

    #[test]
    fn test_probe_dimensions() {
        let mut bytes = Vec::new();
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 3));
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        assert_eq!(probe_dimensions(&bytes).unwrap(), (2, 3));
    }

    #[test]
    fn test_probe_dimensions_rejects_garbage() {
        assert!(probe_dimensions(b"definitely not an image").is_err());
    }
}
