use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Private API key for the asset host. Required by anything that talks
    /// to the host; `None` is only acceptable for DB-only tooling.
    pub assets_private_key: Option<String>,
    /// Public URL endpoint assets are served from, e.g.
    /// `https://ik.imagekit.io/acct`. When unset, no URL is ever treated as
    /// hosted and no remote deletion is attempted.
    pub assets_url_endpoint: Option<String>,
    pub assets_api_base_url: String,
    pub assets_upload_base_url: String,
    pub assets_timeout_secs: u64,
    pub assets_list_limit: u32,
    pub products_folder: String,
    pub logo_folder: String,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "assets_private_key",
                &self.assets_private_key.as_ref().map(|_| "[redacted]"),
            )
            .field("assets_url_endpoint", &self.assets_url_endpoint)
            .field("assets_api_base_url", &self.assets_api_base_url)
            .field("assets_upload_base_url", &self.assets_upload_base_url)
            .field("assets_timeout_secs", &self.assets_timeout_secs)
            .field("assets_list_limit", &self.assets_list_limit)
            .field("products_folder", &self.products_folder)
            .field("logo_folder", &self.logo_folder)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AppConfig {
    /// Upload folder for one product: `{products_folder}/{product}`, with a
    /// root products folder yielding `/{product}`.
    #[must_use]
    pub fn product_folder(&self, product: impl std::fmt::Display) -> String {
        format!("{}/{product}", self.products_folder.trim_end_matches('/'))
    }
}
