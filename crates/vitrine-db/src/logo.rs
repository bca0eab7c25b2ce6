//! Database operations for the single-row `logo_slot` table.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use vitrine_core::AssetReference;

use crate::DbError;

/// The logo slot row. `asset` is `None` until the first logo is stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LogoSlotRow {
    pub asset: Option<Json<AssetReference>>,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl LogoSlotRow {
    #[must_use]
    pub fn into_asset(self) -> Option<AssetReference> {
        self.asset.map(|json| json.0)
    }
}

/// Reads the logo slot.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the seeded row is missing, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_logo_slot(pool: &PgPool) -> Result<LogoSlotRow, DbError> {
    sqlx::query_as::<_, LogoSlotRow>(
        "SELECT asset, version, updated_at FROM logo_slot WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Stores `asset` if the slot is still at `expected_version`.
///
/// Returns the new version, or `None` if another writer got there first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn compare_and_set_logo(
    pool: &PgPool,
    expected_version: i64,
    asset: &AssetReference,
) -> Result<Option<i64>, DbError> {
    let version = sqlx::query_scalar::<_, i64>(
        "UPDATE logo_slot SET asset = $2, version = version + 1, updated_at = NOW() \
         WHERE id = 1 AND version = $1 \
         RETURNING version",
    )
    .bind(expected_version)
    .bind(Json(asset))
    .fetch_optional(pool)
    .await?;

    Ok(version)
}
