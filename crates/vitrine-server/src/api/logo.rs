use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Query, State},
    Extension, Json,
};
use serde::Serialize;
use sqlx::PgPool;
use vitrine_core::{AssetReference, OwnerKind};
use vitrine_reconciler::{LogoError, LogoSlot, LogoState, LogoStore};

use crate::middleware::RequestId;

use super::uploads::{discard, upload, validate_upload, UploadQuery};
use super::{map_db_error, require_assets, ApiError, ApiResponse, AppState, ResponseMeta};

const LOGO_TAG: &str = "app-logo";

/// [`LogoStore`] over the `logo_slot` row.
pub(crate) struct PgLogoStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgLogoStore<'a> {
    pub(crate) fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogoStore for PgLogoStore<'_> {
    async fn load(&self) -> Result<LogoState, LogoError> {
        let row = vitrine_db::get_logo_slot(self.pool)
            .await
            .map_err(LogoError::store)?;
        let version = row.version;
        Ok(LogoState {
            asset: row.into_asset(),
            version,
        })
    }

    async fn compare_and_set(
        &self,
        expected_version: i64,
        asset: &AssetReference,
    ) -> Result<Option<i64>, LogoError> {
        vitrine_db::compare_and_set_logo(self.pool, expected_version, asset)
            .await
            .map_err(LogoError::store)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LogoItem {
    asset: Option<AssetReference>,
    version: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct LogoReplaced {
    asset: AssetReference,
    version: i64,
    replaced: bool,
}

/// GET /api/v1/logo
pub(super) async fn get_logo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<LogoItem>>, ApiError> {
    let row = vitrine_db::get_logo_slot(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let version = row.version;

    Ok(Json(ApiResponse {
        data: LogoItem {
            asset: row.into_asset(),
            version,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/logo?file_name=...
///
/// Uploads the new logo, swaps it into the slot, then deletes the logo it
/// displaced. If the swap fails the fresh upload is discarded.
pub(super) async fn replace_logo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<LogoReplaced>>, ApiError> {
    let rid = &req_id.0;
    let assets = require_assets(&state, rid)?;
    let file_name = validate_upload(rid, &query, &body)?;

    let tags = [LOGO_TAG.to_owned()];
    let uploaded = upload(
        rid,
        assets.host.as_ref(),
        body,
        &file_name,
        &state.config.logo_folder,
        &tags,
    )
    .await?;

    let store = PgLogoStore::new(&state.pool);
    let slot = LogoSlot::new(&store, assets.reconciler.as_ref());
    match slot.replace(uploaded.to_reference()).await {
        Ok(replacement) => Ok(Json(ApiResponse {
            data: LogoReplaced {
                asset: replacement.current,
                version: replacement.version,
                replaced: replacement.previous.is_some(),
            },
            meta: ResponseMeta::new(req_id.0),
        })),
        Err(e) => {
            tracing::error!(owner = %OwnerKind::Logo, error = %e, "logo replacement failed");
            discard(assets.host.as_ref(), &uploaded).await;
            Err(match e {
                LogoError::Conflict { .. } => ApiError::new(
                    rid,
                    "conflict",
                    "the logo was changed concurrently; retry the upload",
                ),
                LogoError::Store(_) => {
                    ApiError::new(rid, "internal_error", "database query failed")
                }
            })
        }
    }
}
