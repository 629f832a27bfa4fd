//! Server Configuration
//!
//! Read from the environment (after `.env` is loaded in `main`).

use anyhow::{Context, Result};

/// Address used when `BIND_ADDR` is unset
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Settings the HTTP layer needs
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,

    /// Public URL of the web app, used for checkout redirects
    pub app_url: String,

    /// HS256 secret access tokens are signed with
    pub jwt_secret: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .with_context(|| format!("{name} not set"))
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            app_url: required("APP_URL")?.trim_end_matches('/').to_string(),
            jwt_secret: required("JWT_SECRET_KEY")?,
        })
    }
}
