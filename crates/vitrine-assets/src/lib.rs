pub mod client;
pub mod error;
pub mod host;
pub mod hosted;
pub mod types;

pub use client::AssetHostClient;
pub use error::AssetError;
pub use host::AssetHost;
pub use hosted::{HostMatcher, PROVIDER_DOMAIN};
pub use types::{AssetRecord, UploadOptions, UploadedAsset};
