//! Keeps the asset host in step with the photo sets the database records.
//!
//! - [`IdentifierResolver`] recovers a remote identifier from a stored URL.
//! - [`Reconciler`] deletes the hosted assets a photo set no longer claims.
//! - [`LogoSlot`] replaces the storefront logo through a versioned store.

pub mod logo;
pub mod reconcile;
pub mod report;
pub mod resolve;

pub use logo::{
    LogoError, LogoReplacement, LogoSlot, LogoState, LogoStore, MemoryLogoStore,
    MAX_REPLACE_ATTEMPTS,
};
pub use reconcile::{removals, Reconciler};
pub use report::{DeletionReport, ItemOutcome, ItemReport};
pub use resolve::{IdentifierResolver, ResolveError, DEFAULT_LIST_LIMIT};
