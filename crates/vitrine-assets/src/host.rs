use async_trait::async_trait;

use crate::error::AssetError;
use crate::types::{AssetRecord, UploadOptions, UploadedAsset};

/// The operations the rest of the system needs from the asset host.
///
/// [`crate::AssetHostClient`] is the HTTP implementation; resolution and
/// reconciliation are written against this trait so they can run against an
/// in-process fake.
#[async_trait]
pub trait AssetHost: Send + Sync {
    /// Uploads `data` as `file_name` into `folder`.
    async fn upload(
        &self,
        data: Vec<u8>,
        file_name: &str,
        folder: &str,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, AssetError>;

    /// Lists the first page of files under `folder` (or the whole account
    /// when `None`), at most `limit` entries. No cursor is followed.
    async fn list(&self, folder: Option<&str>, limit: u32)
        -> Result<Vec<AssetRecord>, AssetError>;

    /// Deletes a file by its remote identifier.
    async fn delete(&self, remote_id: &str) -> Result<(), AssetError>;
}
