//! The storefront logo: a single versioned slot.
//!
//! The slot is replaced with compare-and-set on its version, so the asset a
//! replacement deletes is always the one it actually displaced. The new asset
//! stays current whatever happens to the old one.

use std::error::Error as StdError;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use vitrine_core::{AssetReference, PhotoSet};

use crate::reconcile::Reconciler;
use crate::report::DeletionReport;

/// Compare-and-set attempts before a replacement gives up.
pub const MAX_REPLACE_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum LogoError {
    /// Other writers kept moving the slot's version.
    #[error("logo slot changed concurrently {attempts} times; giving up")]
    Conflict { attempts: u32 },

    #[error("logo store error: {0}")]
    Store(#[source] Box<dyn StdError + Send + Sync>),
}

impl LogoError {
    #[must_use]
    pub fn store<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Store(Box::new(err))
    }
}

/// A snapshot of the slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoState {
    pub asset: Option<AssetReference>,
    pub version: i64,
}

/// Persistence for the logo slot.
#[async_trait]
pub trait LogoStore: Send + Sync {
    async fn load(&self) -> Result<LogoState, LogoError>;

    /// Stores `asset` if the slot is still at `expected_version`.
    ///
    /// Returns the new version, or `None` when the version moved on.
    async fn compare_and_set(
        &self,
        expected_version: i64,
        asset: &AssetReference,
    ) -> Result<Option<i64>, LogoError>;
}

/// Process-local [`LogoStore`], for tests and single-instance tooling.
#[derive(Debug, Default)]
pub struct MemoryLogoStore {
    state: Mutex<LogoState>,
}

impl MemoryLogoStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_asset(asset: AssetReference) -> Self {
        Self {
            state: Mutex::new(LogoState {
                asset: Some(asset),
                version: 1,
            }),
        }
    }
}

#[async_trait]
impl LogoStore for MemoryLogoStore {
    async fn load(&self) -> Result<LogoState, LogoError> {
        Ok(self.state.lock().await.clone())
    }

    async fn compare_and_set(
        &self,
        expected_version: i64,
        asset: &AssetReference,
    ) -> Result<Option<i64>, LogoError> {
        let mut state = self.state.lock().await;
        if state.version != expected_version {
            return Ok(None);
        }
        state.version += 1;
        state.asset = Some(asset.clone());
        Ok(Some(state.version))
    }
}

/// Result of a successful replacement.
#[derive(Debug, Clone)]
pub struct LogoReplacement {
    pub current: AssetReference,
    pub version: i64,
    /// The asset the compare-and-set displaced, if any.
    pub previous: Option<AssetReference>,
    pub cleanup: DeletionReport,
}

pub struct LogoSlot<'a, S: ?Sized> {
    store: &'a S,
    reconciler: &'a Reconciler,
}

impl<'a, S> LogoSlot<'a, S>
where
    S: LogoStore + ?Sized,
{
    #[must_use]
    pub fn new(store: &'a S, reconciler: &'a Reconciler) -> Self {
        Self { store, reconciler }
    }

    /// The asset currently displayed, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LogoError::Store`] if the slot cannot be read.
    pub async fn current(&self) -> Result<Option<AssetReference>, LogoError> {
        Ok(self.store.load().await?.asset)
    }

    /// Makes `asset` the current logo, then deletes the asset it displaced.
    ///
    /// The delete runs only after the slot write succeeded and its outcome
    /// does not affect the result.
    ///
    /// # Errors
    ///
    /// Returns [`LogoError::Conflict`] after [`MAX_REPLACE_ATTEMPTS`] lost
    /// compare-and-set races, or [`LogoError::Store`] if the store fails.
    /// Nothing is deleted in either case.
    pub async fn replace(&self, asset: AssetReference) -> Result<LogoReplacement, LogoError> {
        for attempt in 1..=MAX_REPLACE_ATTEMPTS {
            let state = self.store.load().await?;
            let Some(version) = self.store.compare_and_set(state.version, &asset).await? else {
                tracing::debug!(attempt, expected = state.version, "logo slot moved; retrying");
                continue;
            };

            let current = PhotoSet::new(state.asset.iter().cloned().collect());
            let desired = PhotoSet::new(vec![asset.clone()]);
            let cleanup = self.reconciler.reconcile(&current, &desired).await;

            tracing::info!(
                url = %asset.url,
                version,
                replaced = state.asset.is_some(),
                deleted = cleanup.deleted,
                failed = cleanup.failed,
                "logo replaced"
            );
            return Ok(LogoReplacement {
                current: asset,
                version,
                previous: state.asset,
                cleanup,
            });
        }

        Err(LogoError::Conflict {
            attempts: MAX_REPLACE_ATTEMPTS,
        })
    }
}
