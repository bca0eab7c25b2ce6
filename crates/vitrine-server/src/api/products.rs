//! Product handlers. Photo edits persist first and clean up the host after.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vitrine_core::{OwnerKind, PhotoSet};
use vitrine_db::ProductRow;

use crate::middleware::RequestId;

use super::uploads::{discard, upload, validate_upload, UploadQuery};
use super::{map_db_error, require_assets, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    id: Uuid,
    name: String,
    photos: PhotoSet,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductItem {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.public_id,
            name: row.name,
            photos: row.photos.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub photos: PhotoSet,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReplacePhotosRequest {
    pub photos: PhotoSet,
}

fn parse_product_id(req_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::new(
            req_id,
            "validation_error",
            format!("product id must be a UUID, got '{raw}'"),
        )
    })
}

fn validate_photos(req_id: &str, photos: &PhotoSet) -> Result<(), ApiError> {
    if let Some(idx) = photos.iter().position(|p| p.url.trim().is_empty()) {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("photos[{idx}].url must not be empty"),
        ));
    }
    Ok(())
}

fn respond<T: Serialize>(req_id: String, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id),
    })
}

/// GET /api/v1/products
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductItem>>>, ApiError> {
    let rows = vitrine_db::list_products(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(respond(req_id.0, rows.into_iter().map(ProductItem::from).collect()))
}

/// POST /api/v1/products
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductItem>>), ApiError> {
    let rid = &req_id.0;

    let name = body.name.trim();
    if name.is_empty() || name.chars().count() > 200 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "name must be 1-200 characters",
        ));
    }
    validate_photos(rid, &body.photos)?;

    let row = vitrine_db::create_product(&state.pool, name, &body.photos)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((StatusCode::CREATED, respond(req_id.0, row.into())))
}

/// GET /api/v1/products/{id}
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProductItem>>, ApiError> {
    let rid = &req_id.0;
    let public_id = parse_product_id(rid, &id)?;

    let row = vitrine_db::get_product(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("product {public_id} not found")))?;

    Ok(respond(req_id.0, row.into()))
}

/// PUT /api/v1/products/{id}/photos
///
/// Persists the desired photo set, then deletes the hosted assets it dropped.
/// The response reflects the write only; cleanup results go to the logs.
pub(super) async fn replace_photos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<ReplacePhotosRequest>,
) -> Result<Json<ApiResponse<ProductItem>>, ApiError> {
    let rid = &req_id.0;
    let public_id = parse_product_id(rid, &id)?;
    validate_photos(rid, &body.photos)?;

    let update = vitrine_db::update_product_photos(&state.pool, public_id, &body.photos)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    match &state.assets {
        Some(assets) => {
            let report = assets
                .reconciler
                .reconcile(&update.previous, update.product.photos())
                .await;
            if report.failed > 0 || report.skipped_unresolved > 0 {
                tracing::warn!(
                    owner = %OwnerKind::Product,
                    product = %public_id,
                    failed = report.failed,
                    unresolved = report.skipped_unresolved,
                    "photo cleanup incomplete; remote assets may be orphaned"
                );
            }
        }
        None => tracing::warn!(
            owner = %OwnerKind::Product,
            product = %public_id,
            "asset host not configured; skipping photo cleanup"
        ),
    }

    Ok(respond(req_id.0, update.product.into()))
}

/// POST /api/v1/products/{id}/photos?file_name=...
///
/// Uploads the raw request body into the product's folder and appends it to
/// the photo set.
pub(super) async fn upload_photo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<ProductItem>>), ApiError> {
    let rid = &req_id.0;
    let public_id = parse_product_id(rid, &id)?;
    let assets = require_assets(&state, rid)?;
    let file_name = validate_upload(rid, &query, &body)?;

    vitrine_db::get_product(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("product {public_id} not found")))?;

    let folder = state.config.product_folder(public_id);
    let tags = [format!("product-{public_id}")];
    let uploaded = upload(rid, assets.host.as_ref(), body, &file_name, &folder, &tags).await?;

    match vitrine_db::append_product_photo(&state.pool, public_id, &uploaded.to_reference()).await {
        Ok(row) => {
            tracing::info!(
                owner = %OwnerKind::Product,
                product = %public_id,
                remote_id = %uploaded.file_id,
                "photo uploaded"
            );
            Ok((StatusCode::CREATED, respond(req_id.0, row.into())))
        }
        Err(e) => {
            discard(assets.host.as_ref(), &uploaded).await;
            Err(map_db_error(rid.clone(), &e))
        }
    }
}
