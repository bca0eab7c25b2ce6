//! Database operations for the `products` table and its `photos` column.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use vitrine_core::{AssetReference, PhotoSet};

use crate::DbError;

const PRODUCT_COLUMNS: &str = "id, public_id, name, photos, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub photos: Json<PhotoSet>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    #[must_use]
    pub fn photos(&self) -> &PhotoSet {
        &self.photos.0
    }
}

/// Outcome of [`update_product_photos`]: the row as written and the photo
/// set it replaced.
#[derive(Debug, Clone)]
pub struct PhotoUpdate {
    pub product: ProductRow,
    pub previous: PhotoSet,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a product and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_product(
    pool: &PgPool,
    name: &str,
    photos: &PhotoSet,
) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products (name, photos) VALUES ($1, $2) RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(name)
    .bind(Json(photos))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns a product by its public id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, public_id: Uuid) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all products, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replaces a product's photo set and returns the set it replaced.
///
/// The row is locked between reading the old set and writing the new one, so
/// `previous` is exactly what this write overwrote.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `public_id`, or
/// [`DbError::Sqlx`] on query failure.
pub async fn update_product_photos(
    pool: &PgPool,
    public_id: Uuid,
    photos: &PhotoSet,
) -> Result<PhotoUpdate, DbError> {
    let mut tx = pool.begin().await?;

    let previous = sqlx::query_scalar::<_, Json<PhotoSet>>(
        "SELECT photos FROM products WHERE public_id = $1 FOR UPDATE",
    )
    .bind(public_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    let product = sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE products SET photos = $2, updated_at = NOW() \
         WHERE public_id = $1 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(public_id)
    .bind(Json(photos))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(PhotoUpdate {
        product,
        previous: previous.0,
    })
}

/// Appends one photo to the end of a product's photo set.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `public_id`, or
/// [`DbError::Sqlx`] on query failure.
pub async fn append_product_photo(
    pool: &PgPool,
    public_id: Uuid,
    photo: &AssetReference,
) -> Result<ProductRow, DbError> {
    sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE products SET photos = photos || jsonb_build_array($2::jsonb), updated_at = NOW() \
         WHERE public_id = $1 RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(public_id)
    .bind(Json(photo))
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Every distinct photo URL any product currently references.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_referenced_photo_urls(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let urls = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT photo->>'url' \
         FROM products, jsonb_array_elements(products.photos) AS photo \
         WHERE photo->>'url' IS NOT NULL \
         ORDER BY 1",
    )
    .fetch_all(pool)
    .await?;

    Ok(urls)
}
