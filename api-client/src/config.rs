//! Client configuration loading.
//!
//! Loads from an explicit path, `MOSI_CONFIG`, or `~/.config/mosi/client.toml`,
//! falling back to built-in defaults when no file exists.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::navigator::RoutePaths;

/// Root client configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://shop.example.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Raw `Cookie` header value carrying the server session.
    #[serde(default)]
    pub session_cookie: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub routes: RouteConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

fn default_base_url() -> String {
    "http://localhost:9080".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    format!("mosi-cli/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            session_cookie: None,
            user_agent: default_user_agent(),
            routes: RouteConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Navigation targets.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RouteConfig {
    #[serde(default = "default_login_route")]
    pub login: String,
    #[serde(default = "default_order_route")]
    pub order: String,
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_order_route() -> String {
    "/order".to_string()
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login: default_login_route(),
            order: default_order_route(),
        }
    }
}

/// Session-scoped transfer store.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default = "default_session_dir")]
    pub dir: String,
}

fn default_session_dir() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("mosi").join("session").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".mosi-session".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: default_session_dir(),
        }
    }
}

impl ClientConfig {
    /// Environment variable overriding the config path.
    pub const ENV_CONFIG_PATH: &'static str = "MOSI_CONFIG";

    pub const DEFAULT_CONFIG_FILENAME: &'static str = "client.toml";

    /// Resolution order:
    /// 1. `explicit`
    /// 2. `MOSI_CONFIG`
    /// 3. `~/.config/mosi/client.toml`
    ///
    /// A missing file yields the defaults; an explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let path = Self::resolve_config_path();
        if !path.exists() {
            tracing::info!(path = %path.display(), "client config not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let cfg: ClientConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("mosi")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive".to_string()));
        }
        if let Some(cookie) = &self.session_cookie
            && cookie.contains(['\r', '\n'])
        {
            return Err(ConfigError::Invalid(
                "session_cookie must be a single header line".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed base URL; must be absolute http(s).
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {:?}: {e}", self.base_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid(format!(
                "base_url scheme must be http or https, got {other}"
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn route_paths(&self) -> RoutePaths {
        RoutePaths {
            login: self.routes.login.clone(),
            order: self.routes.order.clone(),
        }
    }

    /// Session directory with `~/` expanded.
    pub fn session_dir(&self) -> PathBuf {
        let dir = &self.session.dir;
        if let Some(stripped) = dir.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(dir)
    }
}
