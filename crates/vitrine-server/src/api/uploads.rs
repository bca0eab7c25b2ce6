//! Shared handling for raw-body uploads to the asset host.

use axum::body::Bytes;
use serde::Deserialize;
use vitrine_assets::{AssetHost, UploadOptions, UploadedAsset};

use super::ApiError;

const MAX_FILE_NAME_CHARS: usize = 255;

#[derive(Debug, Deserialize)]
pub(super) struct UploadQuery {
    pub file_name: Option<String>,
}

/// Validates the query and body of an upload request and returns the file
/// name to upload under.
pub(super) fn validate_upload(
    req_id: &str,
    query: &UploadQuery,
    body: &Bytes,
) -> Result<String, ApiError> {
    let file_name = query
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::new(req_id, "validation_error", "file_name is required"))?;

    if file_name.chars().count() > MAX_FILE_NAME_CHARS
        || file_name.contains(['/', '\\'])
        || file_name.chars().any(char::is_control)
    {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("file_name must be a plain file name of at most {MAX_FILE_NAME_CHARS} characters"),
        ));
    }

    if body.is_empty() {
        return Err(ApiError::new(req_id, "validation_error", "request body is empty"));
    }

    Ok(file_name.to_owned())
}

pub(super) async fn upload(
    req_id: &str,
    host: &dyn AssetHost,
    body: Bytes,
    file_name: &str,
    folder: &str,
    tags: &[String],
) -> Result<UploadedAsset, ApiError> {
    host.upload(
        body.to_vec(),
        file_name,
        folder,
        &UploadOptions::with_tags(tags.iter().cloned()),
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, file_name, folder, "asset upload failed");
        ApiError::new(req_id, "upstream_error", "asset upload failed")
    })
}

/// Deletes an upload nothing ended up referencing. Failures are logged only.
pub(super) async fn discard(host: &dyn AssetHost, uploaded: &UploadedAsset) {
    match host.delete(&uploaded.file_id).await {
        Ok(()) => tracing::info!(remote_id = %uploaded.file_id, "discarded unreferenced upload"),
        Err(e) => tracing::warn!(
            remote_id = %uploaded.file_id,
            error = %e,
            "could not discard unreferenced upload"
        ),
    }
}
