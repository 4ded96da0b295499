pub mod client_secret;
pub mod paths;

pub use client_secret::OAuthConfig;
pub use paths::{AppConfig, resolve_cache_path};

use crate::error::AppResult;

pub fn load_client_secret(config: &AppConfig) -> AppResult<OAuthConfig> {
    client_secret::load(&config.secret_file)
}
